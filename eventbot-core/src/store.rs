//! Durable event storage.
//!
//! The event list lives in a line-oriented text file, one
//! `DD/MM/YY HH:MM description` record per line. Every query re-reads the
//! file; there is no in-memory cache.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use fs2::FileExt;

use crate::error::{StoreError, StoreResult};
use crate::event::Event;

/// Read/write contract for the ordered event list.
pub trait EventStore: Send + Sync {
    /// All stored events, sorted ascending by timestamp.
    fn load_all(&self) -> StoreResult<Vec<Event>>;

    /// Add one event to the backing resource. On-disk order is not maintained.
    fn append(&self, event: &Event) -> StoreResult<()>;

    /// Overwrite the backing resource with exactly `events`, in the given order.
    fn replace_all(&self, events: &[Event]) -> StoreResult<()>;

    /// Remove every event at `timestamp`, returning how many were dropped.
    fn remove_at(&self, timestamp: NaiveDateTime) -> StoreResult<usize>;
}

/// [`EventStore`] backed by a text file.
///
/// Mutations are serialised by an in-process mutex and an exclusive advisory
/// lock on a sidecar `.lock` file, so a remove's load-then-rewrite cannot
/// interleave with an append from another task or process.
pub struct FileEventStore {
    path: PathBuf,
    lock_path: PathBuf,
    writer: Mutex<()>,
}

struct WriterGuard<'a> {
    _local: MutexGuard<'a, ()>,
    _file: File,
}

impl FileEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sidecar(&path, ".lock");

        FileEventStore {
            path,
            lock_path,
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_writer(&self) -> StoreResult<WriterGuard<'_>> {
        let local = self.writer.lock().map_err(|_| StoreError::Lock)?;

        ensure_parent(&self.lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;

        Ok(WriterGuard {
            _local: local,
            _file: file,
        })
    }

    fn write_all_unlocked(&self, events: &[Event]) -> StoreResult<()> {
        let mut content = String::new();
        for event in events {
            content.push_str(&event.serialize());
            content.push('\n');
        }

        write_atomic(&self.path, &content)
    }
}

impl EventStore for FileEventStore {
    fn load_all(&self) -> StoreResult<Vec<Event>> {
        let content = read_or_empty(&self.path)?;

        let mut events = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let event = Event::from_record(line).map_err(|source| {
                tracing::error!(
                    "event store {} has a corrupt record at line {}: {}",
                    self.path.display(),
                    idx + 1,
                    source
                );
                StoreError::LoadCorrupt {
                    line: idx + 1,
                    content: line.to_string(),
                    source,
                }
            })?;
            events.push(event);
        }

        events.sort();
        tracing::debug!("loaded {} events from {}", events.len(), self.path.display());
        Ok(events)
    }

    fn append(&self, event: &Event) -> StoreResult<()> {
        let _guard = self.lock_writer()?;
        ensure_parent(&self.path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // One write call, so readers never see half a record.
        file.write_all(format!("{}\n", event.serialize()).as_bytes())?;

        tracing::info!("appended event '{}'", event.serialize());
        Ok(())
    }

    fn replace_all(&self, events: &[Event]) -> StoreResult<()> {
        let _guard = self.lock_writer()?;
        self.write_all_unlocked(events)?;

        tracing::info!("rewrote event store with {} events", events.len());
        Ok(())
    }

    fn remove_at(&self, timestamp: NaiveDateTime) -> StoreResult<usize> {
        let _guard = self.lock_writer()?;

        let (removed, rest): (Vec<Event>, Vec<Event>) = self
            .load_all()?
            .into_iter()
            .partition(|e| e.timestamp() == timestamp);

        // A miss leaves the file byte-for-byte untouched.
        if !removed.is_empty() {
            self.write_all_unlocked(&rest)?;
            tracing::info!("removed {} event(s) at {}", removed.len(), timestamp);
        }

        Ok(removed.len())
    }
}

/// Read a text resource, treating a missing file as empty.
pub(crate) fn read_or_empty(path: &Path) -> StoreResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Replace `path` with `content` via a `.tmp` sibling and a rename, so
/// lock-free readers see either the old file or the new one, never a prefix.
/// Callers must hold the resource's writer lock.
pub(crate) fn write_atomic(path: &Path, content: &str) -> StoreResult<()> {
    ensure_parent(path)?;

    let temp = sidecar(path, ".tmp");
    fs::write(&temp, content)?;
    fs::rename(&temp, path)?;
    Ok(())
}

/// `events.txt` -> `events.txt<suffix>` in the same directory.
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

pub(crate) fn ensure_parent(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
