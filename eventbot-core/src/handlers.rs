//! Command handlers.
//!
//! Each handler is a plain function over an [`EventStore`] or [`ScheduleNote`]
//! and, where time matters, the current instant. Handlers never call each
//! other; the [`Router`](crate::router::Router) picks one per command.

use chrono::NaiveDateTime;

use crate::error::{CommandError, CommandResult};
use crate::event::{DisplayStyle, Event, TIMESTAMP_FORMAT, parse_timestamp};
use crate::schedule::{ScheduleNote, decode_escapes};
use crate::store::EventStore;

/// Rendering knobs shared by the listing and alert handlers.
#[derive(Debug, Clone)]
pub struct Presentation {
    pub style: DisplayStyle,
    pub tz_label: String,
    pub footer: Option<String>,
}

impl Default for Presentation {
    fn default() -> Self {
        Presentation {
            style: DisplayStyle::Bare,
            tz_label: "BST".to_string(),
            footer: None,
        }
    }
}

pub fn list_upcoming(
    store: &dyn EventStore,
    now: NaiveDateTime,
    presentation: &Presentation,
) -> CommandResult<String> {
    let lines: Vec<String> = store
        .load_all()?
        .iter()
        .filter(|e| !e.has_elapsed(now))
        .map(|e| e.display_line(now, presentation.style, &presentation.tz_label))
        .collect();

    let mut out = if lines.is_empty() {
        "There are no upcoming events scheduled".to_string()
    } else {
        format!("The following events are scheduled:\n\n{}", lines.join("\n"))
    };

    if let Some(footer) = &presentation.footer {
        out.push_str("\n\n");
        out.push_str(footer);
    }

    Ok(out)
}

/// Validate and store a new event. Nothing is written if parsing fails.
pub fn add_event(
    store: &dyn EventStore,
    date: &str,
    time: &str,
    description: &str,
) -> CommandResult<String> {
    let event = Event::parse(date, time, description)?;
    store.append(&event)?;

    Ok(format!(
        "Event '{}' at {} created successfully",
        event.description(),
        event.timestamp().format(TIMESTAMP_FORMAT)
    ))
}

/// Remove whatever is stored at the given date and time, returning the count removed.
pub fn remove_event(store: &dyn EventStore, date: &str, time: &str) -> CommandResult<usize> {
    if store.load_all()?.is_empty() {
        return Err(CommandError::EmptyStore);
    }

    let timestamp = parse_timestamp(date, time)?;

    match store.remove_at(timestamp)? {
        0 => Err(CommandError::NotFound),
        removed => Ok(removed),
    }
}

/// Broadcast text for the events falling on `now`'s calendar day.
pub fn alert_today(
    store: &dyn EventStore,
    now: NaiveDateTime,
    presentation: &Presentation,
) -> CommandResult<String> {
    let today: Vec<Event> = store
        .load_all()?
        .into_iter()
        .filter(|e| e.timestamp().date() == now.date())
        .collect();

    let message = match today.as_slice() {
        [] => "There are no events scheduled for today".to_string(),
        [event] => format!(
            "@here Join us at {} for {}!",
            event.date_label(&presentation.tz_label),
            event.description()
        ),
        events => {
            let digest: Vec<String> = events
                .iter()
                .map(|e| format!("**{}**: {}", e.timestamp().format("%H:%M"), e.description()))
                .collect();
            format!("@here We have {} events today:\n{}", events.len(), digest.join("\n"))
        }
    };

    Ok(message)
}

pub fn show_schedule(note: &ScheduleNote) -> CommandResult<String> {
    let text = note.load()?;

    if text.trim().is_empty() {
        return Ok("No schedule has been set yet".to_string());
    }
    Ok(text)
}

/// Replace the schedule with the caller's tokens, escape sequences decoded.
pub fn modify_schedule<I, S>(note: &ScheduleNote, tokens: I) -> CommandResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = tokens
        .into_iter()
        .map(|t| decode_escapes(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");

    note.save(&text)?;
    Ok("Schedule updated successfully".to_string())
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "This bot manages the server events\n\n\
        Commands:\n\
        **{p}event** - List all the events that are currently scheduled\n\
        **{p}event add <date> <time> <description>** - Add an event. Note: dates must be in the format dd/mm/yy and time in the format hh:mm\n\
        **{p}event remove <date> <time>** - Remove the event scheduled for the given date and time\n\
        **{p}event alert** - Message [at]here with any events happening today\n\
        **{p}event help** - Display this help message\n\
        **{p}schedule** - Show the weekly schedule\n\
        **{p}schedule modify <text>** - Replace the weekly schedule. Use \\n for line breaks\n\
        **{p}status <text>** - Set the bot status message. Leave text blank to reset.",
        p = prefix
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileEventStore;
    use chrono::NaiveDate;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn setup() -> (TempDir, FileEventStore) {
        let dir = TempDir::new().unwrap();
        let store = FileEventStore::new(dir.path().join("events.txt"));
        (dir, store)
    }

    #[test]
    fn test_list_skips_elapsed_events() {
        let (_dir, store) = setup();
        let now = at(2025, 3, 10, 12, 0);
        add_event(&store, "10/03/25", "11:59", "Gone").unwrap();
        add_event(&store, "10/03/25", "12:01", "Coming").unwrap();

        let out = list_upcoming(&store, now, &Presentation::default()).unwrap();
        assert!(out.contains("Coming"));
        assert!(!out.contains("Gone"));
    }

    #[test]
    fn test_list_empty_store_is_not_an_error() {
        let (_dir, store) = setup();
        let presentation = Presentation {
            footer: Some("Convert times at example.com".to_string()),
            ..Presentation::default()
        };

        let out = list_upcoming(&store, at(2025, 1, 1, 0, 0), &presentation).unwrap();
        assert_eq!(
            out,
            "There are no upcoming events scheduled\n\nConvert times at example.com"
        );
    }

    #[test]
    fn test_add_invalid_date_writes_nothing() {
        let (_dir, store) = setup();

        let err = add_event(&store, "31/02/25", "10:00", "Nope").unwrap_err();
        assert!(matches!(err, CommandError::Parse(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_add_confirms_canonical_timestamp() {
        let (_dir, store) = setup();
        let msg = add_event(&store, "1/1/25", "9:00", "Breakfast").unwrap();
        assert_eq!(msg, "Event 'Breakfast' at 01/01/25 09:00 created successfully");
    }

    #[test]
    fn test_remove_from_empty_store_before_parsing() {
        let (_dir, store) = setup();
        assert!(matches!(
            remove_event(&store, "garbage", "input"),
            Err(CommandError::EmptyStore)
        ));
    }

    #[test]
    fn test_remove_bad_timestamp() {
        let (_dir, store) = setup();
        add_event(&store, "01/01/25", "10:00", "Launch").unwrap();
        assert!(matches!(
            remove_event(&store, "01/01/25", "25:00"),
            Err(CommandError::Parse(_))
        ));
    }

    #[test]
    fn test_remove_miss_reports_not_found() {
        let (_dir, store) = setup();
        add_event(&store, "01/01/25", "10:00", "Launch").unwrap();
        let before = fs::read(store.path()).unwrap();

        assert!(matches!(
            remove_event(&store, "01/01/25", "11:00"),
            Err(CommandError::NotFound)
        ));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_remove_same_timestamp_collides() {
        let (_dir, store) = setup();
        add_event(&store, "01/01/25", "10:00", "Launch").unwrap();
        add_event(&store, "01/01/25", "10:00", "Other").unwrap();

        assert_eq!(remove_event(&store, "01/01/25", "10:00").unwrap(), 2);
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_alert_no_events_today() {
        let (_dir, store) = setup();
        add_event(&store, "02/01/25", "10:00", "Tomorrow").unwrap();

        let out = alert_today(&store, at(2025, 1, 1, 8, 0), &Presentation::default()).unwrap();
        assert_eq!(out, "There are no events scheduled for today");
    }

    #[test]
    fn test_alert_single_event_names_that_event() {
        let (_dir, store) = setup();
        add_event(&store, "01/01/25", "19:00", "Quiz night").unwrap();
        add_event(&store, "02/01/25", "10:00", "Not today").unwrap();

        let out = alert_today(&store, at(2025, 1, 1, 8, 0), &Presentation::default()).unwrap();
        assert_eq!(
            out,
            "@here Join us at 19:00BST  Wednesday 01 January for Quiz night!"
        );
    }

    #[test]
    fn test_alert_digest_is_sorted() {
        let (_dir, store) = setup();
        add_event(&store, "01/01/25", "18:30", "Movie").unwrap();
        add_event(&store, "01/01/25", "09:00", "Breakfast").unwrap();

        let out = alert_today(&store, at(2025, 1, 1, 8, 0), &Presentation::default()).unwrap();
        assert_eq!(
            out,
            "@here We have 2 events today:\n**09:00**: Breakfast\n**18:30**: Movie"
        );
    }

    #[test]
    fn test_modify_and_show_schedule() {
        let dir = TempDir::new().unwrap();
        let note = ScheduleNote::new(dir.path().join("schedule.txt"));

        assert_eq!(show_schedule(&note).unwrap(), "No schedule has been set yet");

        modify_schedule(&note, ["Mon:", r"raid\nWed:", "quiz"]).unwrap();
        assert_eq!(show_schedule(&note).unwrap(), "Mon: raid\nWed: quiz");
    }

    #[test]
    fn test_show_schedule_during_modify_sees_whole_text() {
        let dir = TempDir::new().unwrap();
        let note = Arc::new(ScheduleNote::new(dir.path().join("schedule.txt")));
        modify_schedule(&note, ["Mon:", r"raid\nWed:", "quiz"]).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let note = Arc::clone(&note);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                let mut flip = false;
                while !done.load(Ordering::Relaxed) {
                    let tokens = if flip {
                        ["Mon:", r"raid\nWed:", "quiz"]
                    } else {
                        ["Fri:", r"movie\nSun:", "rest"]
                    };
                    modify_schedule(&note, tokens).unwrap();
                    flip = !flip;
                }
            })
        };

        for _ in 0..2000 {
            let shown = show_schedule(&note).unwrap();
            assert!(
                shown == "Mon: raid\nWed: quiz" || shown == "Fri: movie\nSun: rest",
                "saw partial schedule {shown:?}"
            );
        }

        done.store(true, Ordering::Relaxed);
        writer.join().unwrap();
    }

    #[test]
    fn test_remove_during_list_never_reports_empty() {
        let (_dir, store) = setup();
        let store = Arc::new(store);
        for day in 10..=28 {
            add_event(store.as_ref(), &format!("{day}/02/25"), "20:00", "Club night").unwrap();
        }
        add_event(store.as_ref(), "01/03/25", "20:00", "Churn").unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    remove_event(store.as_ref(), "01/03/25", "20:00").unwrap();
                    add_event(store.as_ref(), "01/03/25", "20:00", "Churn").unwrap();
                }
            })
        };

        let now = at(2025, 2, 1, 0, 0);
        for _ in 0..1000 {
            let listing = list_upcoming(store.as_ref(), now, &Presentation::default()).unwrap();
            assert_eq!(listing.matches("Club night").count(), 19);
        }

        done.store(true, Ordering::Relaxed);
        writer.join().unwrap();
    }

    #[test]
    fn test_help_uses_prefix() {
        let help = help_text("?");
        assert!(help.contains("**?event add <date> <time> <description>**"));
        assert!(!help.contains("!event"));
    }
}
