use crate::agents::{
    ManifestLocatorAgent, ManifestSorter, ModuleUpdater, Selector, UpdateDispatcher, extract,
};
use crate::config::{RunConfig, RunMode};
use crate::error::{GomodError, Result};
use crate::gomod::MANIFEST_FILE;
use colored::Colorize;
use tracing::debug;

/// Runs the per-manifest pipeline over every target of an invocation.
pub struct Workflow<'a> {
    config: &'a RunConfig,
    selector: &'a mut dyn Selector,
    updater: &'a dyn ModuleUpdater,
}

impl<'a> Workflow<'a> {
    pub fn new(
        config: &'a RunConfig,
        selector: &'a mut dyn Selector,
        updater: &'a dyn ModuleUpdater,
    ) -> Self {
        Self {
            config,
            selector,
            updater,
        }
    }

    /// Process targets in order. A failing target does not stop the batch;
    /// every failure is reported together at the end.
    pub fn run(&mut self, targets: &[String]) -> Result<()> {
        debug!(mode = ?self.config.mode, dry_run = self.config.dry_run, "starting run");

        let mut failures = Vec::new();
        for target in targets_or_default(targets) {
            if let Err(err) = self.update_target(&target) {
                debug!(input = %target, error = %err, "target failed");
                failures.push(GomodError::for_target(target, err));
            }
        }

        match GomodError::join(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn update_target(&mut self, target: &str) -> Result<()> {
        let path = ManifestLocatorAgent::new(target).locate()?;
        let mut manifest = ManifestLocatorAgent::load(&path)?;

        let policy = match self.config.mode {
            RunMode::Sort => {
                ManifestSorter::sort_file(&path, &mut manifest)?;
                println!("{} {}", "sorted".green(), path.display());
                return Ok(());
            }
            RunMode::List => {
                let candidates = extract(&manifest, self.config.include_indirect);
                if candidates.is_empty() {
                    return Err(GomodError::NoDirectDependencies);
                }
                println!("{}", serde_json::to_string_pretty(&candidates)?);
                return Ok(());
            }
            RunMode::Select(policy) => policy,
        };

        let candidates = extract(&manifest, self.config.include_indirect);
        if candidates.is_empty() {
            return Err(GomodError::NoDirectDependencies);
        }

        let selected = policy.apply(&candidates, &mut *self.selector)?;
        if selected.is_empty() {
            return Err(GomodError::NoModulesSelected);
        }

        let module_paths: Vec<String> = selected.into_iter().map(|req| req.path).collect();
        UpdateDispatcher::new(self.updater, self.config.dry_run).dispatch(&path, &module_paths)
    }
}

fn targets_or_default(targets: &[String]) -> Vec<String> {
    if targets.is_empty() {
        vec![MANIFEST_FILE.to_string()]
    } else {
        targets.to_vec()
    }
}
