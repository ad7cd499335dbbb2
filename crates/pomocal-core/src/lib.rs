//! # Pomocal Core Library
//!
//! This library provides the core business logic for Pomocal, a small
//! personal focus timer paired with a dated event list. The CLI binary is a
//! thin rendering layer over the same core library.
//!
//! ## Architecture
//!
//! - **Timer**: A phase-cycling countdown state machine plus an async driver
//!   that ticks it once per wall-clock second and cancels stale callbacks
//! - **Calendar**: The persisted event store and the month grid view model
//! - **Storage**: SQLite-backed key-value store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerSession`]: Core timer state machine
//! - [`TimerDriver`]: Scheduled tick / auto-resume driver
//! - [`EventStore`]: Ordered, write-through event collection
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod error;
pub mod events;
pub mod language;
pub mod storage;
pub mod timer;

pub use calendar::{Event, EventStore, GridDay, Month, MonthGrid};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::TimerEvent;
pub use language::Language;
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{Phase, PhaseDurations, TimerDriver, TimerSession, TimerSettings, TimerSnapshot};
