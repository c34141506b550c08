use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;
use eventbot_core::{Caller, Command, Router};

#[derive(Subcommand)]
pub enum EventAction {
    /// List upcoming events (the default)
    List,
    /// Add an event, e.g. `event add 01/01/25 10:00 Launch party`
    Add {
        /// Date as dd/mm/yy
        date: String,
        /// Time as hh:mm (24h)
        time: String,
        description: Vec<String>,
    },
    /// Remove the event at a date and time
    Remove { date: String, time: String },
    /// Announce today's events
    Alert,
    /// Show the chat help text
    Help,
}

pub fn run(router: &Router, caller: &Caller, action: Option<EventAction>) -> Result<ExitCode> {
    let command = match action.unwrap_or(EventAction::List) {
        EventAction::List => Command::ListEvents,
        EventAction::Add {
            date,
            time,
            description,
        } => Command::AddEvent {
            date,
            time,
            description: description.join(" "),
        },
        EventAction::Remove { date, time } => Command::RemoveEvent { date, time },
        EventAction::Alert => Command::Alert,
        EventAction::Help => Command::Help,
    };

    Ok(super::dispatch(router, caller, command))
}
