//! Bot configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::event::DisplayStyle;
use crate::handlers::Presentation;

static DEFAULT_EVENTS_FILE: &str = "events.txt";
static DEFAULT_SCHEDULE_FILE: &str = "schedule.txt";
static DEFAULT_LOG_FILE: &str = "eventbot.log";
static DEFAULT_MANAGER_ROLE: &str = "Events Manager";
static DEFAULT_STATUS: &str = "Games | !event help";
static DEFAULT_FOOTER: &str =
    "For timezone conversions, please visit https://www.thetimezoneconverter.com/";

fn default_events_file() -> String {
    DEFAULT_EVENTS_FILE.to_string()
}

fn default_schedule_file() -> String {
    DEFAULT_SCHEDULE_FILE.to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

fn default_manager_role() -> String {
    DEFAULT_MANAGER_ROLE.to_string()
}

fn default_timezone_label() -> String {
    "BST".to_string()
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_footer() -> Option<String> {
    Some(DEFAULT_FOOTER.to_string())
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Configuration at ~/.config/eventbot/config.toml
///
/// Every key is optional. Relative file names resolve against `data_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Directory holding the event, schedule and log files.
    /// Defaults to the platform data dir, e.g. ~/.local/share/eventbot
    pub data_dir: Option<String>,

    #[serde(default = "default_events_file")]
    pub events_file: String,

    #[serde(default = "default_schedule_file")]
    pub schedule_file: String,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Role required for add, remove, alert, schedule changes and status.
    #[serde(default = "default_manager_role")]
    pub manager_role: String,

    /// Appended to every rendered time, e.g. "10:00BST".
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,

    /// Prefix listed events with "[In Hh Mm]".
    #[serde(default)]
    pub countdown: bool,

    #[serde(default = "default_footer")]
    pub list_footer: Option<String>,

    #[serde(default = "default_status")]
    pub default_status: String,

    #[serde(default = "default_prefix")]
    pub command_prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            data_dir: None,
            events_file: default_events_file(),
            schedule_file: default_schedule_file(),
            log_file: default_log_file(),
            manager_role: default_manager_role(),
            timezone_label: default_timezone_label(),
            countdown: false,
            list_footer: default_footer(),
            default_status: default_status(),
            command_prefix: default_prefix(),
        }
    }
}

impl BotConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoPlatformDir("config"))?
            .join("eventbot");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(BotConfig::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(expand(dir)),
            None => Ok(dirs::data_dir()
                .ok_or(ConfigError::NoPlatformDir("data"))?
                .join("eventbot")),
        }
    }

    pub fn events_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(expand(&self.events_file)))
    }

    pub fn schedule_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(expand(&self.schedule_file)))
    }

    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(expand(&self.log_file)))
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            style: if self.countdown {
                DisplayStyle::Countdown
            } else {
                DisplayStyle::Bare
            },
            tz_label: self.timezone_label.clone(),
            footer: self.list_footer.clone().filter(|f| !f.is_empty()),
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default(path: &Path) -> Result<(), ConfigError> {
        let contents = format!(
            "\
# eventbot configuration

# Where the event list, schedule and log live:
# data_dir = \"~/.local/share/eventbot\"
# events_file = \"{DEFAULT_EVENTS_FILE}\"
# schedule_file = \"{DEFAULT_SCHEDULE_FILE}\"
# log_file = \"{DEFAULT_LOG_FILE}\"

# Role allowed to change events and the schedule:
# manager_role = \"{DEFAULT_MANAGER_ROLE}\"

# Rendering:
# timezone_label = \"BST\"
# countdown = false
# list_footer = \"{DEFAULT_FOOTER}\"

# default_status = \"{DEFAULT_STATUS}\"
# command_prefix = \"!\"
"
        );

        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, contents).map_err(write_err)?;

        Ok(())
    }
}

/// Expand a leading `~` to the home directory.
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
