use crate::error::{GomodError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Something that can fetch and update modules for a project directory.
pub trait ModuleUpdater {
    /// Name echoed in front of the subcommand, e.g. `go`.
    fn program(&self) -> String;

    fn update(&self, workdir: &Path, module_paths: &[String]) -> Result<()>;
}

/// GoGetAgent runs `go get <modules...>` with the terminal attached.
pub struct GoGetAgent {
    go_binary: PathBuf,
}

impl GoGetAgent {
    pub fn new<P: AsRef<Path>>(go_binary: P) -> Self {
        Self {
            go_binary: go_binary.as_ref().to_path_buf(),
        }
    }
}

impl ModuleUpdater for GoGetAgent {
    fn program(&self) -> String {
        self.go_binary.display().to_string()
    }

    fn update(&self, workdir: &Path, module_paths: &[String]) -> Result<()> {
        debug!(workdir = %workdir.display(), modules = module_paths.len(), "spawning go get");

        let status = Command::new(&self.go_binary)
            .current_dir(workdir)
            .arg("get")
            .args(module_paths)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| GomodError::Update(format!("{} get: {e}", self.program())))?;

        if !status.success() {
            return Err(GomodError::Update(format!(
                "{} get: exit status {}",
                self.program(),
                status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string())
            )));
        }

        Ok(())
    }
}

/// Echoes the update command and, unless dry-running, executes it in the
/// directory that holds the manifest.
pub struct UpdateDispatcher<'a> {
    updater: &'a dyn ModuleUpdater,
    dry_run: bool,
}

impl<'a> UpdateDispatcher<'a> {
    pub fn new(updater: &'a dyn ModuleUpdater, dry_run: bool) -> Self {
        Self { updater, dry_run }
    }

    /// The command as the operator would type it.
    pub fn command_line(&self, module_paths: &[String]) -> String {
        let mut line = format!("{} get", self.updater.program());
        for path in module_paths {
            line.push(' ');
            line.push_str(path);
        }
        line
    }

    /// Print the command, then run it unless this is a dry run. Paths are
    /// passed in selection order, duplicates included.
    pub fn dispatch(&self, manifest_path: &Path, module_paths: &[String]) -> Result<()> {
        println!("{}", self.command_line(module_paths));

        if self.dry_run {
            info!(modules = module_paths.len(), "dry run, not invoking go get");
            return Ok(());
        }

        let workdir = manifest_dir(manifest_path);
        self.updater.update(workdir, module_paths)
    }
}

/// Directory holding the manifest; a bare file name means the current directory.
fn manifest_dir(manifest_path: &Path) -> &Path {
    match manifest_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
