mod commands;
mod logging;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventbot_core::{BotConfig, Caller, FileEventStore, Router, ScheduleNote, SystemClock};

#[derive(Parser)]
#[command(name = "eventbot")]
#[command(about = "Manage a community's scheduled events and weekly schedule")]
struct Cli {
    /// Config file (defaults to ~/.config/eventbot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Name to act as
    #[arg(long = "as", global = true, default_value = "console")]
    caller: String,

    /// Role held by the caller (repeatable)
    #[arg(long = "role", global = true)]
    roles: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a commented default config file
    Init,
    /// List, add, remove or announce events
    Event {
        #[command(subcommand)]
        action: Option<commands::event::EventAction>,
    },
    /// Show or replace the weekly schedule
    Schedule {
        #[command(subcommand)]
        action: Option<commands::schedule::ScheduleAction>,
    },
    /// Set the bot status message; leave empty to reset
    Status { text: Vec<String> },
    /// Read chat command lines (e.g. "!event add 01/01/25 10:00 Launch") from stdin
    Repl,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let caller = Caller::new(cli.caller, cli.roles);

    match cli.command {
        Commands::Init => commands::init::run(config_path),
        Commands::Event { action } => {
            let router = load_router(config_path)?;
            commands::event::run(&router, &caller, action)
        }
        Commands::Schedule { action } => {
            let router = load_router(config_path)?;
            commands::schedule::run(&router, &caller, action)
        }
        Commands::Status { text } => {
            let router = load_router(config_path)?;
            commands::status::run(&router, &caller, text)
        }
        Commands::Repl => {
            let router = load_router(config_path)?;
            commands::repl::run(Arc::new(router), caller).await
        }
    }
}

/// Load config, start file logging and wire the router to its files.
fn load_router(config_path: Option<&Path>) -> Result<Router> {
    let config = BotConfig::load(config_path)?;
    logging::init(&config.log_path()?)?;
    build_router(&config)
}

fn build_router(config: &BotConfig) -> Result<Router> {
    let events_path = config.events_path().context("Failed to resolve event file")?;
    let schedule_path = config
        .schedule_path()
        .context("Failed to resolve schedule file")?;

    tracing::debug!(
        "using events at {} and schedule at {}",
        events_path.display(),
        schedule_path.display()
    );

    Ok(Router::new(
        Box::new(FileEventStore::new(events_path)),
        ScheduleNote::new(schedule_path),
        Box::new(SystemClock),
        config,
    ))
}
