use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "gomodup",
    about = "Pick go.mod dependencies interactively and update them with go get",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// go.mod files or directories containing one (defaults to ./go.mod)
    #[arg(value_name = "PATH")]
    pub targets: Vec<String>,

    /// Select everything by default (entries can still be unchecked)
    #[arg(short = 'a')]
    pub select_all: bool,

    /// Select and update everything without confirmation
    #[arg(short = 'A')]
    pub select_all_no_confirm: bool,

    /// Dry run, just print what would be executed
    #[arg(short = 'd')]
    pub dry_run: bool,

    /// Sort require lines: direct dependencies first, then indirect ones
    #[arg(short = 's')]
    pub sort: bool,

    /// Show indirect dependencies as well
    #[arg(short = 'h')]
    pub show_indirect: bool,

    /// Show version information
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Print the candidate modules as JSON instead of updating them
    #[arg(
        long,
        conflicts_with_all = ["select_all", "select_all_no_confirm", "sort", "dry_run"]
    )]
    pub json: bool,

    /// Go toolchain executable used for `go get`
    #[arg(long, env = "GOMODUP_GO", default_value = "go", value_name = "PATH")]
    pub go: String,

    /// Enable verbose output for debugging
    #[arg(long)]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}
