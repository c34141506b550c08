//! Chat command parsing and dispatch.
//!
//! The router turns one inbound chat line into a [`Command`], applies the
//! role guard to mutating verbs, runs the matching handler and converts any
//! error into a reply. It holds no event state of its own, so one router can
//! serve commands from many tasks at once.

use std::sync::Mutex;

use crate::auth::{Caller, RoleGuard};
use crate::clock::Clock;
use crate::config::BotConfig;
use crate::error::CommandResult;
use crate::handlers::{self, Presentation};
use crate::schedule::ScheduleNote;
use crate::store::EventStore;

const ADD_USAGE: &str = "Usage: event add <dd/mm/yy> <hh:mm> <description>";
const REMOVE_USAGE: &str = "Usage: event remove <dd/mm/yy> <hh:mm>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListEvents,
    AddEvent {
        date: String,
        time: String,
        description: String,
    },
    RemoveEvent {
        date: String,
        time: String,
    },
    Alert,
    Help,
    ShowSchedule,
    ModifySchedule {
        tokens: Vec<String>,
    },
    SetStatus {
        text: Option<String>,
    },
    /// A recognised verb with missing arguments.
    Usage(&'static str),
}

impl Command {
    /// Parse a chat line. Returns `None` for anything that is not a command.
    pub fn parse(line: &str, prefix: &str) -> Option<Command> {
        let rest = line.trim().strip_prefix(prefix)?;
        let mut tokens = rest.split_whitespace();

        let command = match tokens.next()? {
            "event" | "events" => match tokens.next() {
                None => Command::ListEvents,
                Some("add") => match (tokens.next(), tokens.next()) {
                    (Some(date), Some(time)) => Command::AddEvent {
                        date: date.to_string(),
                        time: time.to_string(),
                        description: tokens.collect::<Vec<_>>().join(" "),
                    },
                    _ => Command::Usage(ADD_USAGE),
                },
                Some("remove") => match (tokens.next(), tokens.next()) {
                    (Some(date), Some(time)) => Command::RemoveEvent {
                        date: date.to_string(),
                        time: time.to_string(),
                    },
                    _ => Command::Usage(REMOVE_USAGE),
                },
                Some("alert") => Command::Alert,
                Some(_) => Command::Help,
            },
            "schedule" => match tokens.next() {
                None => Command::ShowSchedule,
                Some("modify") => Command::ModifySchedule {
                    tokens: tokens.map(str::to_string).collect(),
                },
                Some(_) => Command::Help,
            },
            "status" => {
                let text = tokens.collect::<Vec<_>>().join(" ");
                Command::SetStatus {
                    text: (!text.is_empty()).then_some(text),
                }
            }
            "help" => Command::Help,
            _ => return None,
        };

        Some(command)
    }

    /// Verbs that change stored data or broadcast need the manager role.
    pub fn requires_role(&self) -> bool {
        matches!(
            self,
            Command::AddEvent { .. }
                | Command::RemoveEvent { .. }
                | Command::Alert
                | Command::ModifySchedule { .. }
                | Command::SetStatus { .. }
        )
    }
}

/// Text handed back to the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Whether the transport should deliver this as a channel-wide ping.
    pub broadcast: bool,
    pub is_error: bool,
}

impl Reply {
    fn ok(text: String) -> Self {
        Reply {
            text,
            broadcast: false,
            is_error: false,
        }
    }

    fn error(text: String) -> Self {
        Reply {
            text,
            broadcast: false,
            is_error: true,
        }
    }
}

pub struct Router {
    events: Box<dyn EventStore>,
    schedule: ScheduleNote,
    clock: Box<dyn Clock>,
    guard: RoleGuard,
    presentation: Presentation,
    prefix: String,
    default_status: String,
    status: Mutex<String>,
}

impl Router {
    pub fn new(
        events: Box<dyn EventStore>,
        schedule: ScheduleNote,
        clock: Box<dyn Clock>,
        config: &BotConfig,
    ) -> Self {
        Router {
            events,
            schedule,
            clock,
            guard: RoleGuard::new(config.manager_role.clone()),
            presentation: config.presentation(),
            prefix: config.command_prefix.clone(),
            default_status: config.default_status.clone(),
            status: Mutex::new(config.default_status.clone()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Current cosmetic status text.
    pub fn status(&self) -> String {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Parse and dispatch one chat line; `None` if the line is not a command.
    pub fn handle_line(&self, caller: &Caller, line: &str) -> Option<Reply> {
        let command = Command::parse(line, &self.prefix)?;
        Some(self.dispatch(caller, command))
    }

    pub fn dispatch(&self, caller: &Caller, command: Command) -> Reply {
        tracing::debug!("{} issued {:?}", caller.name, command);

        let broadcast = matches!(command, Command::Alert);
        let result = if command.requires_role() {
            self.guard.guard(caller, || self.run(command))
        } else {
            self.run(command)
        };

        match result {
            Ok(text) => {
                let broadcast = broadcast && text.starts_with("@here");
                Reply {
                    broadcast,
                    ..Reply::ok(text)
                }
            }
            Err(e) => {
                tracing::warn!("command from {} failed: {}", caller.name, e);
                Reply::error(e.reply())
            }
        }
    }

    fn run(&self, command: Command) -> CommandResult<String> {
        let events = self.events.as_ref();

        match command {
            Command::ListEvents => {
                handlers::list_upcoming(events, self.clock.now(), &self.presentation)
            }
            Command::AddEvent {
                date,
                time,
                description,
            } => handlers::add_event(events, &date, &time, &description),
            Command::RemoveEvent { date, time } => {
                handlers::remove_event(events, &date, &time)
                    .map(|_| "Event removed successfully".to_string())
            }
            Command::Alert => handlers::alert_today(events, self.clock.now(), &self.presentation),
            Command::Help => Ok(handlers::help_text(&self.prefix)),
            Command::ShowSchedule => handlers::show_schedule(&self.schedule),
            Command::ModifySchedule { tokens } => {
                handlers::modify_schedule(&self.schedule, &tokens)
            }
            Command::SetStatus { text } => {
                let text = text.unwrap_or_else(|| self.default_status.clone());
                match self.status.lock() {
                    Ok(mut status) => *status = text.clone(),
                    Err(poisoned) => *poisoned.into_inner() = text.clone(),
                }
                tracing::info!("status set to '{}'", text);
                Ok(format!("Status set to '{text}'"))
            }
            Command::Usage(usage) => Ok(usage.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::FileEventStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn router(dir: &TempDir) -> Router {
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();

        Router::new(
            Box::new(FileEventStore::new(dir.path().join("events.txt"))),
            ScheduleNote::new(dir.path().join("schedule.txt")),
            Box::new(FixedClock(now)),
            &BotConfig::default(),
        )
    }

    fn manager() -> Caller {
        Caller::new("ana", vec!["Events Manager".to_string()])
    }

    fn member() -> Caller {
        Caller::new("bo", vec![])
    }

    #[test]
    fn test_parse_event_verbs() {
        assert_eq!(Command::parse("!event", "!"), Some(Command::ListEvents));
        assert_eq!(Command::parse("  !events  ", "!"), Some(Command::ListEvents));
        assert_eq!(
            Command::parse("!event add 01/01/25 10:00 Launch   party", "!"),
            Some(Command::AddEvent {
                date: "01/01/25".into(),
                time: "10:00".into(),
                description: "Launch party".into(),
            })
        );
        assert_eq!(
            Command::parse("!event remove 01/01/25", "!"),
            Some(Command::Usage(REMOVE_USAGE))
        );
        assert_eq!(Command::parse("!event bogus", "!"), Some(Command::Help));
        assert_eq!(Command::parse("!event help", "!"), Some(Command::Help));
    }

    #[test]
    fn test_parse_ignores_non_commands() {
        assert_eq!(Command::parse("hello there", "!"), None);
        assert_eq!(Command::parse("!", "!"), None);
        assert_eq!(Command::parse("!dance", "!"), None);
    }

    #[test]
    fn test_parse_schedule_and_status() {
        assert_eq!(Command::parse("!schedule", "!"), Some(Command::ShowSchedule));
        assert_eq!(
            Command::parse(r"!schedule modify Mon:\nraid", "!"),
            Some(Command::ModifySchedule {
                tokens: vec![r"Mon:\nraid".into()],
            })
        );
        assert_eq!(
            Command::parse("!status", "!"),
            Some(Command::SetStatus { text: None })
        );
    }

    #[test]
    fn test_mutating_verbs_need_role() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir);

        let reply = router
            .handle_line(&member(), "!event add 01/01/25 10:00 Launch")
            .unwrap();
        assert!(reply.is_error);
        assert_eq!(
            reply.text,
            "You must have the **Events Manager** role to perform this command"
        );
        assert!(!dir.path().join("events.txt").exists());

        let reply = router.handle_line(&member(), "!event").unwrap();
        assert!(!reply.is_error);
    }

    #[test]
    fn test_alert_is_flagged_for_broadcast() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir);

        let quiet = router.handle_line(&manager(), "!event alert").unwrap();
        assert!(!quiet.broadcast);

        router
            .handle_line(&manager(), "!event add 01/01/25 19:00 Quiz")
            .unwrap();
        let loud = router.handle_line(&manager(), "!event alert").unwrap();
        assert!(loud.broadcast);
        assert!(loud.text.contains("Quiz"));
    }

    #[test]
    fn test_remove_errors_become_replies() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir);

        let reply = router
            .handle_line(&manager(), "!event remove 01/01/25 10:00")
            .unwrap();
        assert_eq!(reply.text, "Error: There are no events to remove");

        router
            .handle_line(&manager(), "!event add 01/01/25 10:00 Launch")
            .unwrap();
        let reply = router
            .handle_line(&manager(), "!event remove 01/01/25 11:00")
            .unwrap();
        assert_eq!(reply.text, "Error: No event at that date and time");

        let reply = router
            .handle_line(&manager(), "!event remove 01/01/25 10:00")
            .unwrap();
        assert_eq!(reply.text, "Event removed successfully");
    }

    #[test]
    fn test_corrupt_store_is_reported_not_repaired() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.txt");
        std::fs::write(&path, "01/01/25 10:00 Fine\ngarbage\n").unwrap();
        let router = router(&dir);

        let reply = router.handle_line(&member(), "!event").unwrap();
        assert!(reply.is_error);
        assert!(reply.text.contains("line 2"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "01/01/25 10:00 Fine\ngarbage\n"
        );
    }

    #[test]
    fn test_status_resets_to_default() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir);

        router.handle_line(&manager(), "!status Board games tonight");
        assert_eq!(router.status(), "Board games tonight");

        router.handle_line(&manager(), "!status");
        assert_eq!(router.status(), "Games | !event help");

        router.handle_line(&member(), "!status hijacked");
        assert_eq!(router.status(), "Games | !event help");
    }
}
