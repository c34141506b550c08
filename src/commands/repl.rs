//! Stdin chat host: every line is one inbound chat message.
//!
//! Each command runs on its own blocking task, the way a chat gateway would
//! dispatch concurrent messages, so replies may arrive out of input order.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use eventbot_core::{Caller, Router};
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::render::Render;

pub async fn run(router: Arc<Router>, caller: Caller) -> Result<ExitCode> {
    let caller = Arc::new(caller);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    eprintln!(
        "{}",
        format!(
            "Reading commands as '{}'. Try {}event help",
            caller.name,
            router.prefix()
        )
        .dimmed()
    );

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let router = Arc::clone(&router);
        let caller = Arc::clone(&caller);

        tasks.spawn_blocking(move || {
            router
                .handle_line(&caller, &line)
                .map(|reply| format!("{} {}\n{}", ">".dimmed(), line.dimmed(), reply.render()))
        });

        // Print whatever has already finished without blocking on input.
        while let Some(done) = tasks.try_join_next() {
            print_result(done)?;
        }
    }

    while let Some(done) = tasks.join_next().await {
        print_result(done)?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(ExitCode::SUCCESS)
}

fn print_result(done: Result<Option<String>, tokio::task::JoinError>) -> Result<()> {
    if let Some(out) = done.context("Command task panicked")? {
        println!("{out}");
    }
    Ok(())
}
