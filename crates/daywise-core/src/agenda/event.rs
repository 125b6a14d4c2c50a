//! A single scheduled agenda item.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::error::ValidationError;

/// Shortest accepted event duration.
pub const MIN_DURATION_MINUTES: u32 = 5;
/// Longest accepted event duration (ten hours).
pub const MAX_DURATION_MINUTES: u32 = 600;

/// ISO-8601 calendar date, as used in exports and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// 24-hour `HH:MM`.
pub const TIME_FORMAT: &str = "%H:%M";

/// One scheduled agenda item.
///
/// Events carry no identifier. Callers address them by their position in
/// a sorted view of the [`EventStore`](super::EventStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    title: String,
    date: NaiveDate,
    #[serde(serialize_with = "serialize_hhmm")]
    time: NaiveTime,
    duration_minutes: u32,
    notes: String,
}

impl Event {
    /// Build a validated event.
    ///
    /// Title and notes are trimmed. The time is truncated to the minute.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] when the trimmed title is
    /// empty and [`ValidationError::DurationOutOfRange`] when the duration
    /// is outside `5..=600`.
    pub fn new(
        title: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: u32,
        notes: &str,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(ValidationError::DurationOutOfRange {
                minutes: duration_minutes,
                min: MIN_DURATION_MINUTES,
                max: MAX_DURATION_MINUTES,
            });
        }

        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);

        Ok(Self {
            title: title.to_string(),
            date,
            time,
            duration_minutes,
            notes: notes.trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Ordering key: date first, then time of day.
    pub fn sort_key(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Date as `YYYY-MM-DD`.
    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Time as `HH:MM`.
    pub fn time_label(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

fn serialize_hhmm<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&time.format(TIME_FORMAT))
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| ValidationError::invalid("date", format!("'{value}' is not YYYY-MM-DD ({e})")))
}

/// Parse a 24-hour `HH:MM` time of day.
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|e| ValidationError::invalid("time", format!("'{value}' is not HH:MM ({e})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn ten() -> NaiveTime {
        NaiveTime::from_hms_opt(10, 0, 0).unwrap()
    }

    #[test]
    fn new_trims_title_and_notes() {
        let event = Event::new("  ML Lab ", day(), ten(), 60, "  bring notebook\n").unwrap();
        assert_eq!(event.title(), "ML Lab");
        assert_eq!(event.notes(), "bring notebook");
    }

    #[test]
    fn new_rejects_blank_title() {
        assert_eq!(
            Event::new(" \t ", day(), ten(), 60, ""),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn new_enforces_duration_bounds() {
        assert!(Event::new("Gym", day(), ten(), MIN_DURATION_MINUTES, "").is_ok());
        assert!(Event::new("Gym", day(), ten(), MAX_DURATION_MINUTES, "").is_ok());

        let err = Event::new("Gym", day(), ten(), 4, "").unwrap_err();
        assert!(matches!(err, ValidationError::DurationOutOfRange { minutes: 4, .. }));
        assert!(Event::new("Gym", day(), ten(), 601, "").is_err());
    }

    #[test]
    fn time_is_truncated_to_minutes() {
        let odd = NaiveTime::from_hms_milli_opt(9, 15, 42, 250).unwrap();
        let event = Event::new("Standup", day(), odd, 15, "").unwrap();
        assert_eq!(event.time(), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(event.time_label(), "09:15");
    }

    #[test]
    fn serializes_time_as_hhmm() {
        let event = Event::new("Meeting", day(), ten(), 30, "").unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["time"], "10:00");
        assert_eq!(json["date"], "2025-03-14");
        assert_eq!(json["duration_minutes"], 30);
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(parse_date("2025-03-14").unwrap(), day());
        assert_eq!(parse_time("10:00").unwrap(), ten());
        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_time("25:00").is_err());
    }
}
