use std::process::ExitCode;

use anyhow::Result;
use eventbot_core::{Caller, Command, Router};

pub fn run(router: &Router, caller: &Caller, text: Vec<String>) -> Result<ExitCode> {
    let text = text.join(" ");
    let command = Command::SetStatus {
        text: (!text.trim().is_empty()).then_some(text),
    };

    Ok(super::dispatch(router, caller, command))
}
