//! Persisted event collection.
//!
//! The store keeps the single in-memory copy of the user's events and writes
//! the whole collection through to storage on every mutation. Queries never
//! touch storage; only `load` and `reload` read it.
//!
//! If a read or write fails the store logs it and keeps working in memory
//! only for the rest of the session. Nothing written after that point
//! survives a restart.

use chrono::{Local, NaiveDate};
use tracing::{debug, error, warn};

use super::event::Event;
use crate::error::StorageError;
use crate::storage::{KeyValueStore, EVENTS_KEY};

pub struct EventStore<S> {
    storage: S,
    events: Vec<Event>,
    persistent: bool,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Read the persisted collection. Missing or unreadable data yields an
    /// empty store.
    ///
    /// If storage itself cannot be read the store starts empty and
    /// memory-only, so the saved collection is never overwritten.
    pub fn load(storage: S) -> Self {
        let (events, persistent) = match read_events(&storage) {
            Ok(events) => (events, true),
            Err(e) => {
                warn!("could not read {EVENTS_KEY}, continuing in memory only: {e}");
                (Vec::new(), false)
            }
        };
        debug!(count = events.len(), persistent, "event store loaded");
        Self {
            storage,
            events,
            persistent,
        }
    }

    /// Replace the in-memory collection with what storage holds now.
    ///
    /// Other processes may write the same storage. Call this before a
    /// mutation so their additions are kept. A failed read leaves the
    /// current collection in place and stops further writes.
    pub fn reload(&mut self) {
        if !self.persistent {
            return;
        }
        match read_events(&self.storage) {
            Ok(events) => {
                debug!(count = events.len(), "event store reloaded");
                self.events = events;
            }
            Err(e) => {
                error!("could not re-read {EVENTS_KEY}, continuing in memory only: {e}");
                self.persistent = false;
            }
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// False once a write has failed and the store went memory-only.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Append a new event. A blank title is ignored and yields `None`.
    pub fn add(&mut self, title: &str, date: NaiveDate) -> Option<&Event> {
        let event = Event::new(title, date)?;
        debug!(id = %event.id, %date, "adding event");
        self.events.push(event);
        self.persist();
        self.events.last()
    }

    /// Flip `done` on the event with `id`. Returns false if no event matched.
    pub fn toggle_done(&mut self, id: &str) -> bool {
        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            debug!(id, "toggle_done on unknown id ignored");
            return false;
        };
        event.done = !event.done;
        debug!(id, done = event.done, "toggled event");
        self.persist();
        true
    }

    /// Events on `date`, in insertion order.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|e| e.date == date).collect()
    }

    /// Events on the local device's current date.
    pub fn today(&self) -> Vec<&Event> {
        self.events_on(Local::now().date_naive())
    }

    fn persist(&mut self) {
        if !self.persistent {
            return;
        }
        let result = serde_json::to_string(&self.events)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .set(EVENTS_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            error!("failed to persist events, continuing in memory only: {e}");
            self.persistent = false;
        }
    }
}

/// Undecodable data counts as empty; only a failed read is an error.
fn read_events<S: KeyValueStore>(storage: &S) -> Result<Vec<Event>, StorageError> {
    let Some(raw) = storage.get(EVENTS_KEY)? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("discarding unreadable {EVENTS_KEY}: {e}");
        Vec::new()
    }))
}
