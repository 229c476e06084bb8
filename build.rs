use std::path::Path;
use std::process::Command;

fn main() {
    if Path::new(".git/HEAD").exists() {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/index");
    }

    if let Some(revision) = git(&["rev-parse", "HEAD"]) {
        println!("cargo:rustc-env=GOMODUP_VCS_REVISION={revision}");
    }
    if let Some(time) = git(&["log", "-1", "--format=%cI"]) {
        println!("cargo:rustc-env=GOMODUP_VCS_TIME={time}");
    }
    if let Some(status) = git(&["status", "--porcelain", "--untracked-files=no"]) {
        let dirty = !status.is_empty();
        println!("cargo:rustc-env=GOMODUP_VCS_MODIFIED={dirty}");
    }

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    if let Some(version) = run(&rustc, &["-V"]) {
        println!("cargo:rustc-env=GOMODUP_COMPILER={version}");
    }
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
