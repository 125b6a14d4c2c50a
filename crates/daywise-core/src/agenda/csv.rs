//! Tabular agenda exchange.
//!
//! Columns are `Title, Date, Time, Duration(min), Notes`, one row per event
//! in display order. Dates are `YYYY-MM-DD` and times `HH:MM`. Reading and
//! writing go through the `csv` crate; the reader additionally rejects text
//! after a closing quote, which `csv` would otherwise splice into the field.

use std::path::Path;

use csv::{Position, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, info};

use super::event::{parse_date, parse_time, Event};
use super::store::EventStore;
use crate::error::{CoreError, Result};

/// Header row of the export.
pub const HEADER: [&str; 5] = ["Title", "Date", "Time", "Duration(min)", "Notes"];

const BOM: char = '\u{feff}';

/// Render the store as CSV text with `\n` line endings.
///
/// # Errors
///
/// Returns [`CoreError::Csv`] if a row cannot be encoded.
pub fn to_csv(store: &EventStore) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER).map_err(|e| from_csv(e, 1))?;

    for (row, event) in store.list_all().into_iter().enumerate() {
        let duration = event.duration_minutes().to_string();
        writer
            .write_record([
                event.title(),
                event.date_label().as_str(),
                event.time_label().as_str(),
                duration.as_str(),
                event.notes(),
            ])
            .map_err(|e| from_csv(e, row + 2))?;
    }

    let bytes = writer.into_inner().map_err(|e| CoreError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| csv_error(0, e.to_string()))
}

/// Write the CSV export to `path`.
///
/// # Errors
///
/// Returns an IO error if the file cannot be written.
pub fn write_csv(store: &EventStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_csv(store)?)?;
    info!(path = %path.display(), events = store.count(), "agenda exported");
    Ok(())
}

/// Parse CSV text in the export shape and add every row to `store`.
///
/// All rows are validated before the first one is added, so a bad row
/// leaves the store untouched. A leading byte order mark, CRLF line endings
/// and blank lines are accepted.
///
/// # Errors
///
/// Returns [`CoreError::Csv`] naming the offending line for a wrong header,
/// a wrong field count, a malformed quoted field, an unparsable field or an
/// event that fails validation.
pub fn read_csv(text: &str, store: &mut EventStore) -> Result<usize> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let start = reader.position().clone();
        let more = reader
            .read_record(&mut record)
            .map_err(|e| from_csv(e, line_of(&start)))?;
        if !more {
            break;
        }

        let line = record.position().map_or_else(|| line_of(&start), line_of);
        let raw = text
            .get(byte_of(&start)..byte_of(reader.position()))
            .unwrap_or_default();
        check_quotes(raw).map_err(|message| csv_error(line, message))?;
        rows.push((line, record.clone()));
    }

    let mut rows = rows.into_iter();
    let (line, header) = rows.next().ok_or_else(|| csv_error(1, "missing header row"))?;
    if !header.iter().eq(HEADER) {
        return Err(csv_error(
            line,
            format!(
                "expected header {}, found {}",
                HEADER.join(","),
                header.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let events = rows
        .map(|(line, record)| record_to_event(line, &record))
        .collect::<Result<Vec<_>>>()?;

    let added = events.len();
    for event in events {
        store.insert(event);
    }
    debug!(added, "agenda rows imported");
    Ok(added)
}

/// Read a CSV file and add its rows to `store`.
///
/// # Errors
///
/// Returns an IO error if the file cannot be read, otherwise the errors of
/// [`read_csv`].
pub fn read_csv_file(path: impl AsRef<Path>, store: &mut EventStore) -> Result<usize> {
    let text = std::fs::read_to_string(path.as_ref())?;
    read_csv(&text, store)
}

fn record_to_event(line: usize, record: &StringRecord) -> Result<Event> {
    if record.len() != HEADER.len() {
        return Err(csv_error(
            line,
            format!("expected {} fields, found {}", HEADER.len(), record.len()),
        ));
    }
    let (title, date, time, duration, notes) =
        (&record[0], &record[1], &record[2], &record[3], &record[4]);

    let date = parse_date(date).map_err(|e| csv_error(line, e.to_string()))?;
    let time = parse_time(time).map_err(|e| csv_error(line, e.to_string()))?;
    let duration = duration
        .trim()
        .parse::<u32>()
        .map_err(|e| csv_error(line, format!("invalid duration '{duration}': {e}")))?;

    Event::new(title, date, time, duration, notes).map_err(|e| csv_error(line, e.to_string()))
}

/// A quoted field must end at a delimiter or a line break.
fn check_quotes(raw: &str) -> std::result::Result<(), &'static str> {
    let mut bytes = raw.bytes().peekable();
    let mut field_start = true;
    let mut quoted = false;

    while let Some(b) = bytes.next() {
        if quoted {
            if b == b'"' {
                if bytes.peek() == Some(&b'"') {
                    bytes.next();
                } else if matches!(bytes.peek(), None | Some(b',' | b'\r' | b'\n')) {
                    quoted = false;
                } else {
                    return Err("unexpected text after closing quote");
                }
            }
            continue;
        }
        quoted = b == b'"' && field_start;
        field_start = matches!(b, b',' | b'\r' | b'\n');
    }

    if quoted {
        return Err("unterminated quoted field");
    }
    Ok(())
}

fn line_of(position: &Position) -> usize {
    usize::try_from(position.line()).unwrap_or(usize::MAX)
}

fn byte_of(position: &Position) -> usize {
    usize::try_from(position.byte()).unwrap_or(usize::MAX)
}

fn from_csv(err: csv::Error, fallback_line: usize) -> CoreError {
    let line = err.position().map_or(fallback_line, line_of);
    csv_error(line, err.to_string())
}

fn csv_error(line: usize, message: impl Into<String>) -> CoreError {
    CoreError::Csv {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn store() -> EventStore {
        let mut store = EventStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        store
            .add("Gym", day, NaiveTime::from_hms_opt(18, 0, 0).unwrap(), 60, "")
            .unwrap();
        store
            .add(
                "Meeting, weekly",
                day,
                NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
                30,
                "say \"hi\"\nthen leave",
            )
            .unwrap();
        store
    }

    #[test]
    fn empty_store_exports_header_only() {
        assert_eq!(
            to_csv(&EventStore::new()).unwrap(),
            "Title,Date,Time,Duration(min),Notes\n"
        );
    }

    #[test]
    fn export_is_sorted_and_quoted() {
        let csv = to_csv(&store()).unwrap();
        assert_eq!(
            csv,
            "Title,Date,Time,Duration(min),Notes\n\
             \"Meeting, weekly\",2025-01-20,09:05,30,\"say \"\"hi\"\"\nthen leave\"\n\
             Gym,2025-01-20,18:00,60,\n"
        );
    }

    #[test]
    fn import_reads_export_back() {
        let original = store();
        let mut imported = EventStore::new();
        let added = read_csv(&to_csv(&original).unwrap(), &mut imported).unwrap();

        assert_eq!(added, 2);
        assert_eq!(imported.list_all(), original.list_all());
    }

    #[test]
    fn import_accepts_crlf_and_blank_lines() {
        let text = "Title,Date,Time,Duration(min),Notes\r\nGym,2025-01-20,18:00,60,\r\n\r\n";
        let mut store = EventStore::new();
        assert_eq!(read_csv(text, &mut store).unwrap(), 1);
        assert_eq!(store.list_all()[0].title(), "Gym");
    }

    #[test]
    fn import_rejects_bad_header() {
        let mut store = EventStore::new();
        let err = read_csv("Name,When\n", &mut store).unwrap_err();
        assert!(matches!(err, CoreError::Csv { line: 1, .. }));
        assert!(matches!(
            read_csv("", &mut store),
            Err(CoreError::Csv { line: 1, .. })
        ));
    }

    #[test]
    fn import_is_all_or_nothing() {
        let text = "Title,Date,Time,Duration(min),Notes\n\
                    Gym,2025-01-20,18:00,60,\n\
                    ,2025-01-21,10:00,60,\n";
        let mut store = EventStore::new();
        let err = read_csv(text, &mut store).unwrap_err();
        assert!(matches!(err, CoreError::Csv { line: 3, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn import_reports_field_errors_with_line() {
        let mut store = EventStore::new();
        for (row, needle) in [
            ("Gym,2025-01-20,18:00,60", "expected 5 fields"),
            ("Gym,20/01/2025,18:00,60,", "date"),
            ("Gym,2025-01-20,6pm,60,", "time"),
            ("Gym,2025-01-20,18:00,an hour,", "invalid duration"),
            ("Gym,2025-01-20,18:00,900,", "outside"),
        ] {
            let text = format!("Title,Date,Time,Duration(min),Notes\n{row}\n");
            let err = read_csv(&text, &mut store).unwrap_err();
            match err {
                CoreError::Csv { line, message } => {
                    assert_eq!(line, 2);
                    assert!(message.contains(needle), "{message} should mention {needle}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(store.is_empty());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let mut store = EventStore::new();
        let text = "Title,Date,Time,Duration(min),Notes\n\"Gym,2025-01-20,18:00,60,\n";
        assert!(matches!(
            read_csv(text, &mut store),
            Err(CoreError::Csv { line: 2, .. })
        ));
    }

    #[test]
    fn import_skips_byte_order_mark() {
        let text = format!("{BOM}{}", to_csv(&store()).unwrap());
        let mut imported = EventStore::new();
        assert_eq!(read_csv(&text, &mut imported).unwrap(), 2);
        assert_eq!(imported.list_all(), store().list_all());
    }

    #[test]
    fn text_after_closing_quote_is_rejected() {
        let mut store = EventStore::new();
        let text = "Title,Date,Time,Duration(min),Notes\n\"Gym\"junk,2025-01-20,18:00,60,\n";
        match read_csv(text, &mut store).unwrap_err() {
            CoreError::Csv { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("closing quote"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn quote_after_leading_space_is_literal() {
        let mut store = EventStore::new();
        let text = "Title,Date,Time,Duration(min),Notes\nGym,2025-01-20,18:00,60, \"a, b\"\n";
        match read_csv(text, &mut store).unwrap_err() {
            CoreError::Csv { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 5 fields, found 6"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let quoted = "Title,Date,Time,Duration(min),Notes\nGym,2025-01-20,18:00,60,\"a, b\"\n";
        assert_eq!(read_csv(quoted, &mut store).unwrap(), 1);
        assert_eq!(store.list_all()[0].notes(), "a, b");
    }

    #[test]
    fn write_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        write_csv(&store(), &path).unwrap();

        let mut imported = EventStore::new();
        assert_eq!(read_csv_file(&path, &mut imported).unwrap(), 2);
    }
}
