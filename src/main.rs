mod agents;
mod build_info;
mod cli;
mod config;
mod error;
mod gomod;
mod workflow;

use agents::{GoGetAgent, TerminalSelector};
use build_info::BuildInfo;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::RunConfig;
use std::process;
use tracing_subscriber::EnvFilter;
use workflow::Workflow;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.version {
        print!("{}", BuildInfo::current().render());
        return;
    }

    let config = RunConfig::from_cli(&cli);
    let mut selector = TerminalSelector::stdio();
    let updater = GoGetAgent::new(&config.go_binary);

    let result = Workflow::new(&config, &mut selector, &updater).run(&cli.targets);

    if let Err(e) = result {
        for cause in e.causes() {
            eprintln!("{} {}", "ERROR:".red().bold(), cause);
        }
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("gomodup=debug")
        } else {
            EnvFilter::new("gomodup=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
