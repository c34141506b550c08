//! Free-text weekly schedule note.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::store::{read_or_empty, write_atomic};

/// A single opaque text blob, replaced wholesale on every save.
pub struct ScheduleNote {
    path: PathBuf,
    writer: Mutex<()>,
}

impl ScheduleNote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ScheduleNote {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    /// The stored text verbatim; empty if nothing has been saved yet.
    pub fn load(&self) -> StoreResult<String> {
        read_or_empty(&self.path)
    }

    pub fn save(&self, text: &str) -> StoreResult<()> {
        let _guard = self.writer.lock().map_err(|_| StoreError::Lock)?;
        write_atomic(&self.path, text)?;

        tracing::info!("schedule replaced ({} bytes)", text.len());
        Ok(())
    }
}

/// Turn literal escape sequences typed in chat into the characters they name.
///
/// Recognises `\n`, `\t` and `\\`; any other backslash is kept as-is.
pub fn decode_escapes(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('t') => {
                out.push('\t');
                chars.next();
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push('\\'),
        }
    }

    out
}
