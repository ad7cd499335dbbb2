use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerSnapshot};

/// Every state change of the timer produces a TimerEvent.
/// The rendering layer consumes them to redraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The next phase was started without user action after a completion.
    AutoResumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseSelected {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        completed: Phase,
        next: Phase,
        completed_focus_count: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot(TimerSnapshot),
}

impl TimerEvent {
    pub fn is_completion(&self) -> bool {
        matches!(self, TimerEvent::PhaseCompleted { .. })
    }
}
