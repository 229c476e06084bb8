use crate::error::{GomodError, Result};
use crate::gomod::{MANIFEST_FILE, Manifest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// ManifestLocatorAgent turns a command-line target into a parsed go.mod
pub struct ManifestLocatorAgent {
    target: PathBuf,
}

impl ManifestLocatorAgent {
    pub fn new<P: AsRef<Path>>(target: P) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
        }
    }

    /// Resolve the target to a manifest path; directories get `go.mod` appended.
    pub fn locate(&self) -> Result<PathBuf> {
        let metadata = fs::metadata(&self.target)
            .map_err(|e| GomodError::io(format!("stat {:?}", self.target.display().to_string()), e))?;

        let path = if metadata.is_dir() {
            self.target.join(MANIFEST_FILE)
        } else {
            self.target.clone()
        };

        debug!(input = %self.target.display(), manifest = %path.display(), "located manifest");
        Ok(path)
    }

    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Manifest> {
        let content = fs::read(path).map_err(|e| {
            GomodError::io(format!("parse direct deps: read {:?}", path.display().to_string()), e)
        })?;

        let manifest = Manifest::parse(path.display().to_string(), &content)?;
        debug!(
            manifest = %path.display(),
            requirements = manifest.requirements().count(),
            "parsed manifest"
        );
        Ok(manifest)
    }
}
