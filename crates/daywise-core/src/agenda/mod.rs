//! Session agenda: events, the in-memory store and CSV exchange.

pub mod csv;
mod event;
mod store;

pub use event::{
    parse_date, parse_time, Event, DATE_FORMAT, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
    TIME_FORMAT,
};
pub use store::EventStore;
