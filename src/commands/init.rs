use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use eventbot_core::BotConfig;
use owo_colors::OwoColorize;

pub fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => BotConfig::config_path()?,
    };

    if path.exists() {
        println!("{}", format!("Config already exists at {}", path.display()).dimmed());
        return Ok(ExitCode::SUCCESS);
    }

    BotConfig::create_default(&path)?;
    println!("{} {}", "Created".green(), path.display());
    Ok(ExitCode::SUCCESS)
}
