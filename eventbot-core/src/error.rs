//! Error types for eventbot.

use thiserror::Error;

/// A date/time composite or description that cannot become an [`Event`](crate::event::Event).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid date/time '{0}', expected dd/mm/yy hh:mm")]
    Timestamp(String),

    #[error("event description must not be empty")]
    EmptyDescription,

    #[error("event description must fit on a single line")]
    MultilineDescription,

    #[error("record '{0}' is missing its date or time field")]
    MissingField(String),
}

/// Failures reading or writing a backing text resource.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line} of the event store is corrupt ({content:?}): {source}")]
    LoadCorrupt {
        line: usize,
        content: String,
        #[source]
        source: ParseError,
    },

    #[error("writer lock poisoned")]
    Lock,
}

/// Errors surfaced by command handlers and the router.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("there are no events to remove")]
    EmptyStore,

    #[error("no event at that date and time")]
    NotFound,

    #[error("caller lacks the '{role}' role")]
    Unauthorized { role: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    /// Chat reply shown to the caller for this error.
    pub fn reply(&self) -> String {
        match self {
            CommandError::Parse(ParseError::EmptyDescription) => {
                "Error: An event needs a description".to_string()
            }
            CommandError::Parse(ParseError::MultilineDescription) => {
                "Error: Event descriptions must fit on one line".to_string()
            }
            CommandError::Parse(_) => {
                "Error: Invalid date format. Must be in the form dd/mm/yy hh:mm".to_string()
            }
            CommandError::EmptyStore => "Error: There are no events to remove".to_string(),
            CommandError::NotFound => "Error: No event at that date and time".to_string(),
            CommandError::Unauthorized { role } => {
                format!("You must have the **{role}** role to perform this command")
            }
            CommandError::Store(StoreError::LoadCorrupt { line, .. }) => format!(
                "Error: The event list is damaged at line {line}. No changes were made; please fix the file by hand"
            ),
            CommandError::Store(_) => {
                "Error: Could not access the event list, please try again".to_string()
            }
        }
    }
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine {0} directory")]
    NoPlatformDir(&'static str),

    #[error("Could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type CommandResult<T> = Result<T, CommandError>;
