pub mod calendar;
pub mod config;
pub mod event;
pub mod lang;
pub mod timer;

use pomocal_core::{Database, EventStore};

/// Open the shared event store backed by the on-disk database.
pub fn open_store() -> Result<EventStore<Database>, Box<dyn std::error::Error>> {
    Ok(EventStore::load(Database::open()?))
}

/// Warn the user when a write failed and the change only lives in memory.
pub fn warn_if_volatile(store: &EventStore<Database>) {
    if !store.is_persistent() {
        eprintln!("warning: changes could not be saved and will be lost on exit");
    }
}
