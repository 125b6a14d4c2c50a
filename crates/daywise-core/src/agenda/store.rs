//! In-memory event store for one session.
//!
//! Events are kept in insertion order and sorted on every read, so display
//! order never depends on the order of `add` calls except among events that
//! share the same date and time.
//!
//! Deletion is positional. The index refers to the sorted view at call time,
//! and after a successful delete the remaining events are stored in that
//! sorted order. Relative insertion order among same-timestamp events that
//! survive a delete is therefore the sorted order from that point on.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use super::event::Event;
use crate::error::{RangeError, ValidationError};

/// Ordered collection of the events of one session.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an event.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty title or a duration
    /// outside `5..=600`. The store is not modified in that case.
    pub fn add(
        &mut self,
        title: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: u32,
        notes: &str,
    ) -> Result<(), ValidationError> {
        let event = Event::new(title, date, time, duration_minutes, notes).inspect_err(|e| {
            debug!(error = %e, "rejected event");
        })?;
        self.insert(event);
        Ok(())
    }

    /// Append an already validated event.
    pub fn insert(&mut self, event: Event) {
        debug!(
            title = event.title(),
            date = %event.date(),
            time = %event.time_label(),
            "event added"
        );
        self.events.push(event);
    }

    /// All events sorted by date then time. Ties keep insertion order.
    pub fn list_all(&self) -> Vec<&Event> {
        let mut sorted: Vec<&Event> = self.events.iter().collect();
        sorted.sort_by_key(|e| e.sort_key());
        sorted
    }

    /// The events of a single day, in the same order as [`list_all`](Self::list_all).
    pub fn list_for_date(&self, date: NaiveDate) -> Vec<&Event> {
        self.list_all()
            .into_iter()
            .filter(|e| e.date() == date)
            .collect()
    }

    /// Remove the event at `index` of [`list_all`](Self::list_all).
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::OutOfBounds`] if `index >= count()`; the store
    /// is left unchanged.
    pub fn delete_at(&mut self, index: usize) -> Result<Event, RangeError> {
        let len = self.events.len();
        if index >= len {
            return Err(out_of_bounds("events", index, len));
        }

        self.rederive_order();
        let removed = self.events.remove(index);
        debug!(index, title = removed.title(), remaining = self.events.len(), "event deleted");
        Ok(removed)
    }

    /// Remove the event at `index` of [`list_for_date`](Self::list_for_date).
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::OutOfBounds`] if the day has fewer than
    /// `index + 1` events; the store is left unchanged.
    pub fn delete_on_date(&mut self, date: NaiveDate, index: usize) -> Result<Event, RangeError> {
        let len = self.events.iter().filter(|e| e.date() == date).count();
        if index >= len {
            return Err(out_of_bounds(&format!("events on {date}"), index, len));
        }

        self.rederive_order();
        let position = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.date() == date)
            .nth(index)
            .map(|(i, _)| i)
            .ok_or_else(|| out_of_bounds(&format!("events on {date}"), index, len))?;
        let removed = self.events.remove(position);
        debug!(%date, index, title = removed.title(), "event deleted from day view");
        Ok(removed)
    }

    /// Remove every event.
    pub fn clear(&mut self) {
        debug!(removed = self.events.len(), "store cleared");
        self.events.clear();
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate in storage order (insertion order until the first delete).
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Replace storage order with display order.
    fn rederive_order(&mut self) {
        self.events.sort_by_key(Event::sort_key);
    }
}

fn out_of_bounds(collection: &str, index: usize, len: usize) -> RangeError {
    debug!(collection, index, len, "index out of range");
    RangeError::OutOfBounds {
        collection: collection.to_string(),
        index,
        len,
    }
}
