//! Core of eventbot: a community's scheduled events and weekly schedule.
//!
//! - `event`: the [`Event`] value type, its record format and display
//! - `store`: the file-backed [`EventStore`]
//! - `schedule`: the free-text [`ScheduleNote`]
//! - `handlers`: one function per chat command
//! - `router`: chat line parsing, role checks and dispatch

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod handlers;
pub mod router;
pub mod schedule;
pub mod store;

pub use auth::{Caller, RoleGuard};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::BotConfig;
pub use error::{CommandError, ConfigError, ParseError, StoreError};
pub use event::{DisplayStyle, Event};
pub use router::{Command, Reply, Router};
pub use schedule::ScheduleNote;
pub use store::{EventStore, FileEventStore};
