//! Interactive agenda session.
//!
//! One session owns one [`EventStore`]. Commands are read from stdin one per
//! line, split with shell-style quoting and parsed with clap. A failing
//! command is reported and the session continues; the events are gone when
//! the session ends.

use std::error::Error;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use daywise_core::agenda::{self, csv};
use daywise_core::{Config, Event, EventStore};
use serde::Serialize;
use tracing::debug;

use super::predict::{self, PredictArgs};

#[derive(Parser)]
#[command(no_binary_name = true, name = "session")]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Add an event
    Add {
        /// Event title (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Time as HH:MM (default: agenda.default_time)
        #[arg(long)]
        time: Option<String>,
        /// Duration in minutes, 5-600 (default: agenda.default_duration_minutes)
        #[arg(long)]
        duration: Option<u32>,
        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List all events with their index
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the agenda of one day
    Day {
        /// Date as YYYY-MM-DD (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an event by index from `list`, or from `day` with --date
    Delete {
        index: usize,
        /// Index into the agenda of this day instead of the full list
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove every event
    Clear,
    /// Print the number of events
    Count,
    /// Export events as CSV to PATH, or to stdout
    Export {
        path: Option<PathBuf>,
        /// Write to export.file_name from the config
        #[arg(long, conflicts_with = "path")]
        default_file: bool,
    },
    /// Add the events of a CSV export
    Import { path: PathBuf },
    /// Predict productivity
    Predict(PredictArgs),
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Whether the session loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// State of one interactive session.
pub struct Session {
    store: EventStore,
    config: Config,
    today: NaiveDate,
}

#[derive(Serialize)]
struct IndexedEvent<'a> {
    index: usize,
    #[serde(flatten)]
    event: &'a Event,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_today(config, Local::now().date_naive())
    }

    /// Session whose "today" is fixed, for deterministic defaults.
    pub fn with_today(config: Config, today: NaiveDate) -> Self {
        Self {
            store: EventStore::new(),
            config,
            today,
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Parse and run one input line.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow, Box<dyn Error>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let words = shlex::split(line).ok_or("unbalanced quotes")?;
        let parsed = match SessionLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) if !e.use_stderr() => {
                // --help and friends
                write!(out, "{e}")?;
                return Ok(Flow::Continue);
            }
            Err(e) => return Err(e.into()),
        };

        self.dispatch(parsed.command, out)
    }

    fn dispatch(&mut self, command: SessionCommand, out: &mut impl Write) -> Result<Flow, Box<dyn Error>> {
        let json_default = self.config.output.json;

        match command {
            SessionCommand::Add {
                title,
                date,
                time,
                duration,
                notes,
            } => {
                let date = self.date_or_today(date.as_deref())?;
                let time = match time {
                    Some(t) => agenda::parse_time(&t)?,
                    None => self.config.default_time(),
                };
                let duration = duration.unwrap_or(self.config.agenda.default_duration_minutes);
                self.store.add(&title.join(" "), date, time, duration, &notes)?;
                writeln!(out, "Event added!")?;
            }
            SessionCommand::List { json } => {
                let events = self.store.list_all();
                if json || json_default {
                    write_json(&events, out)?;
                } else if events.is_empty() {
                    writeln!(out, "No events yet.")?;
                } else {
                    for (index, event) in events.iter().enumerate() {
                        writeln!(
                            out,
                            "[{index}] {} {}  {:>3} min  {}",
                            event.date_label(),
                            event.time_label(),
                            event.duration_minutes(),
                            event.title()
                        )?;
                        if !event.notes().is_empty() {
                            writeln!(out, "      {}", event.notes())?;
                        }
                    }
                }
            }
            SessionCommand::Day { date, json } => {
                let date = self.date_or_today(date.as_deref())?;
                let events = self.store.list_for_date(date);
                if json || json_default {
                    write_json(&events, out)?;
                } else {
                    writeln!(out, "Agenda for {}", date.format(agenda::DATE_FORMAT))?;
                    if events.is_empty() {
                        writeln!(out, "No events for this date. Add one with `add`.")?;
                    }
                    for (index, event) in events.iter().enumerate() {
                        writeln!(out, "[{index}] {} — {}", event.time_label(), event.title())?;
                        writeln!(out, "    {} min", event.duration_minutes())?;
                        if !event.notes().is_empty() {
                            writeln!(out, "    {}", event.notes())?;
                        }
                    }
                }
            }
            SessionCommand::Delete { index, date } => {
                let removed = match date {
                    Some(date) => self.store.delete_on_date(agenda::parse_date(&date)?, index)?,
                    None => self.store.delete_at(index)?,
                };
                writeln!(out, "Deleted: {}", removed.title())?;
            }
            SessionCommand::Clear => {
                self.store.clear();
                writeln!(out, "All events cleared.")?;
            }
            SessionCommand::Count => {
                writeln!(out, "{}", self.store.count())?;
            }
            SessionCommand::Export { path, default_file } => {
                let path = if default_file {
                    Some(PathBuf::from(&self.config.export.file_name))
                } else {
                    path
                };
                match path {
                    Some(path) => {
                        csv::write_csv(&self.store, &path)?;
                        writeln!(
                            out,
                            "Exported {} events to {}",
                            self.store.count(),
                            path.display()
                        )?;
                    }
                    None => write!(out, "{}", csv::to_csv(&self.store)?)?,
                }
            }
            SessionCommand::Import { path } => {
                let added = csv::read_csv_file(&path, &mut self.store)?;
                writeln!(out, "Imported {added} events")?;
            }
            SessionCommand::Predict(mut args) => {
                args.json |= json_default;
                predict::render(&args.predict()?, args.json, out)?;
            }
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn date_or_today(&self, date: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
        match date {
            Some(date) => Ok(agenda::parse_date(date)?),
            None => Ok(self.today),
        }
    }
}

fn write_json(events: &[&Event], out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let rows: Vec<IndexedEvent<'_>> = events
        .iter()
        .enumerate()
        .map(|(index, event)| IndexedEvent { index, event })
        .collect();
    writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
    Ok(())
}

pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut session = Session::new(config);
    let mut out = std::io::stdout().lock();

    if interactive {
        eprintln!("daywise session: type `help` for commands, `quit` to leave");
    }

    let mut input = stdin.lock();
    let mut buf = Vec::new();
    loop {
        if interactive {
            eprint!("> ");
        }
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: input line is not valid UTF-8: {e}");
                continue;
            }
        };

        match session.execute(line, &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => match e.downcast_ref::<clap::Error>() {
                Some(clap_err) => eprint!("{clap_err}"),
                None => eprintln!("error: {e}"),
            },
        }
        out.flush()?;
    }

    debug!(events = session.store().count(), "session ended");
    Ok(())
}
