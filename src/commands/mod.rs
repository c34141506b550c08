pub mod event;
pub mod init;
pub mod repl;
pub mod schedule;
pub mod status;

use std::process::ExitCode;

use eventbot_core::{Caller, Command, Router};

use crate::render::Render;

/// Dispatch one command and print its reply; error replies go to stderr.
pub fn dispatch(router: &Router, caller: &Caller, command: Command) -> ExitCode {
    let reply = router.dispatch(caller, command);

    if reply.is_error {
        eprintln!("{}", reply.render());
        ExitCode::FAILURE
    } else {
        println!("{}", reply.render());
        ExitCode::SUCCESS
    }
}
