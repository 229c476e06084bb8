use crate::agents::SelectionPolicy;
use crate::cli::Cli;
use std::path::PathBuf;

/// What a run does with each target, resolved once from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Pick candidates and hand them to the package manager.
    Select(SelectionPolicy),
    /// Regroup require statements in place.
    Sort,
    /// Print the candidate set as JSON.
    List,
}

impl RunMode {
    /// `-A` wins over `-s`, which wins over the interactive selector.
    pub fn resolve(no_confirm: bool, sort: bool, preselect_all: bool, list: bool) -> Self {
        if no_confirm {
            RunMode::Select(SelectionPolicy::SelectAllNoConfirm)
        } else if sort {
            RunMode::Sort
        } else if list {
            RunMode::List
        } else {
            RunMode::Select(SelectionPolicy::Interactive { preselect_all })
        }
    }
}

/// Immutable settings threaded through every target of a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: RunMode,
    pub include_indirect: bool,
    pub dry_run: bool,
    pub go_binary: PathBuf,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            mode: RunMode::resolve(
                cli.select_all_no_confirm,
                cli.sort,
                cli.select_all,
                cli.json,
            ),
            include_indirect: cli.show_indirect,
            dry_run: cli.dry_run,
            go_binary: PathBuf::from(&cli.go),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Select(SelectionPolicy::Interactive {
                preselect_all: false,
            }),
            include_indirect: false,
            dry_run: false,
            go_binary: PathBuf::from("go"),
        }
    }
}
