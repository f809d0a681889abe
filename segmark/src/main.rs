use std::{panic, path::PathBuf, process};

use clap::Parser;
use thiserror::Error;
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    commands::{
        annotate::annotate_handler,
        completions::completions_handler,
        init::init_handler,
        list::list_handler,
        mark::{mark_handler, unmark_handler},
        report::report_handler,
        Commands,
        SegmarkCli,
    },
    logging::init_logging,
};

mod apps;
mod commands;
mod components;
mod configuration;
mod input;
mod logging;
mod utils;

pub const DEFAULT_CONFIG_PATH: &str = "./segmark.json";
pub const DEFAULT_LOG_PATH: &str = "./logs/segmark.log";

fn main() -> anyhow::Result<()> {
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(1);
    }));
    run()
}

fn run() -> anyhow::Result<()> {
    let cli = SegmarkCli::parse();
    if let Commands::Completions {
        shell,
    } = cli.command
    {
        completions_handler(shell);
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let config_path = cli.config_file.unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_PATH));
    let logs = cli.logs.unwrap_or_else(|| cwd.join(DEFAULT_LOG_PATH));
    // The terminal belongs to the TUI while annotating
    let console_level = if matches!(cli.command, Commands::Annotate { .. }) {
        LevelFilter::OFF
    } else {
        LevelFilter::INFO
    };
    let _log_guard = init_logging(console_level, &logs, LevelFilter::DEBUG)?;
    debug!("Using config file {}", config_path.display());

    match cli.command {
        Commands::Init {
            force,
        } => init_handler(&config_path, force)?,
        Commands::Annotate {
            video,
        } => annotate_handler(&config_path, &video)?,
        Commands::Mark {
            video,
            at,
            label,
        } => mark_handler(&config_path, &video, at, label)?,
        Commands::Unmark {
            video,
            at,
        } => unmark_handler(&config_path, &video, at)?,
        Commands::List {
            video,
        } => list_handler(&config_path, &video)?,
        Commands::Report {
            video,
            at,
            every,
            json,
        } => report_handler(&config_path, &video, at, every, json)?,
        Commands::Completions {
            shell,
        } => completions_handler(shell),
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum SegmarkCliError {
    #[error("Cannot initialize over an existing config file: {0}")]
    ConfigFileAlreadyExists(PathBuf),
    #[error("Video file not found: {0}")]
    VideoNotFound(PathBuf),
}
