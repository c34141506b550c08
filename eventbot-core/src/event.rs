//! The scheduled event value type.
//!
//! An [`Event`] is a local wall-clock timestamp plus a one-line description.
//! Events compare and order by timestamp only: two events at the same minute
//! are the same event as far as equality and removal are concerned, whatever
//! their descriptions say.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

use crate::error::ParseError;

/// Pattern for the date and time fields, both on the wire and on disk.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M";

/// How [`Event::display_line`] renders an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStyle {
    /// `**HH:MMTZ  Weekday DD Month**:  description`
    #[default]
    Bare,
    /// The bare line prefixed with `[In Hh Mm]  `.
    Countdown,
}

#[derive(Debug, Clone)]
pub struct Event {
    timestamp: NaiveDateTime,
    description: String,
}

impl Event {
    /// Build an event from user-supplied date (`dd/mm/yy`), time (`hh:mm`) and description.
    pub fn parse(date: &str, time: &str, description: &str) -> Result<Self, ParseError> {
        let timestamp = parse_timestamp(date, time)?;
        Self::new(timestamp, description)
    }

    /// Seconds and below are dropped: records only carry minute precision.
    pub fn new(timestamp: NaiveDateTime, description: &str) -> Result<Self, ParseError> {
        let timestamp = timestamp
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| ParseError::Timestamp(timestamp.to_string()))?;

        let description = description.trim();
        if description.is_empty() {
            return Err(ParseError::EmptyDescription);
        }
        if description.contains(['\n', '\r']) {
            return Err(ParseError::MultilineDescription);
        }

        Ok(Event {
            timestamp,
            description: description.to_string(),
        })
    }

    /// Parse one stored record: first token is the date, second the time,
    /// the rest of the line (spacing intact) is the description.
    pub fn from_record(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (date, rest) = split_token(line).ok_or_else(|| ParseError::MissingField(line.into()))?;
        let (time, description) =
            split_token(rest).ok_or_else(|| ParseError::MissingField(line.into()))?;

        Self::parse(date, time, description)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Canonical single-line record, `DD/MM/YY HH:MM description`.
    pub fn serialize(&self) -> String {
        format!("{} {}", self.timestamp.format(TIMESTAMP_FORMAT), self.description)
    }

    /// True once `now` is strictly past the event's timestamp.
    pub fn has_elapsed(&self, now: NaiveDateTime) -> bool {
        now > self.timestamp
    }

    /// Time left until the event starts, clamped to zero for past events.
    pub fn time_until(&self, now: NaiveDateTime) -> Duration {
        (self.timestamp - now).max(Duration::zero())
    }

    /// `HH:MM` plus the zone label, then weekday, day and month.
    pub fn date_label(&self, tz_label: &str) -> String {
        format!(
            "{}{}  {}",
            self.timestamp.format("%H:%M"),
            tz_label,
            self.timestamp.format("%A %d %B")
        )
    }

    pub fn display_line(&self, now: NaiveDateTime, style: DisplayStyle, tz_label: &str) -> String {
        let bare = format!("**{}**:  {}", self.date_label(tz_label), self.description);

        match style {
            DisplayStyle::Bare => bare,
            DisplayStyle::Countdown => {
                let minutes = self.time_until(now).num_minutes();
                format!("[In {}h {}m]  {}", minutes / 60, minutes % 60, bare)
            }
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

/// Parse a `dd/mm/yy` date and `hh:mm` time into a naive local timestamp.
///
/// Two-digit years follow the POSIX pivot: 69-99 are 1969-1999, 00-68 are
/// 2000-2068. chrono alone would read 69 as 2069.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, ParseError> {
    let composite = format!("{} {}", date.trim(), time.trim());

    let timestamp = NaiveDateTime::parse_from_str(&composite, TIMESTAMP_FORMAT)
        .map_err(|_| ParseError::Timestamp(composite.clone()))?;

    if timestamp.year() == 2069 {
        return timestamp
            .with_year(1969)
            .ok_or(ParseError::Timestamp(composite));
    }
    Ok(timestamp)
}

/// Split off the first whitespace-delimited token, returning it and the remainder.
fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }

    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], s[idx..].trim_start())),
        None => Some((s, "")),
    }
}
