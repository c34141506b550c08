use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;
use eventbot_core::{Caller, Command, Router};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Print the weekly schedule (the default)
    Show,
    /// Replace the weekly schedule; `\n` in the text becomes a line break
    Modify { text: Vec<String> },
}

pub fn run(router: &Router, caller: &Caller, action: Option<ScheduleAction>) -> Result<ExitCode> {
    let command = match action.unwrap_or(ScheduleAction::Show) {
        ScheduleAction::Show => Command::ShowSchedule,
        ScheduleAction::Modify { text } => Command::ModifySchedule {
            // Re-split so quoted arguments decode the same way chat tokens do.
            tokens: text
                .iter()
                .flat_map(|t| t.split_whitespace())
                .map(str::to_string)
                .collect(),
        },
    };

    Ok(super::dispatch(router, caller, command))
}
