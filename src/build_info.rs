use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Version and VCS details captured when the binary was built.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: Option<&'static str>,
    pub commit_time: Option<&'static str>,
    pub modified: Option<bool>,
    pub compiler: Option<&'static str>,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            revision: option_env!("GOMODUP_VCS_REVISION"),
            commit_time: option_env!("GOMODUP_VCS_TIME"),
            modified: option_env!("GOMODUP_VCS_MODIFIED").map(|v| v == "true"),
            compiler: option_env!("GOMODUP_COMPILER"),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.version.is_empty() {
            out.push_str(&format!("version:\t{}\n", self.version));
        }
        out.push_str(&format!(
            "revision:\t{}\n",
            self.revision.unwrap_or("unknown")
        ));
        out.push_str(&format!("date:\t\t{}\n", self.local_commit_time(&TimeZone::system())));
        out.push_str(&format!(
            "dirty:\t\t{}\n",
            self.modified.map_or("unknown".to_string(), |m| m.to_string())
        ));
        out.push_str(&format!(
            "compiler:\t{}\n",
            self.compiler.unwrap_or("unknown")
        ));
        out
    }

    /// Commit time converted to `tz`, or `unknown` if absent or malformed.
    fn local_commit_time(&self, tz: &TimeZone) -> String {
        self.commit_time
            .and_then(|raw| raw.parse::<Timestamp>().ok())
            .map(|ts| {
                ts.to_zoned(tz.clone())
                    .strftime("%Y-%m-%d %H:%M:%S %z")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}
