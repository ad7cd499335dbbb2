use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Focus, Phase::ShortBreak, Phase::LongBreak];

    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Focus)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    /// Accepts the short CLI names as well as the serialized names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "work" => Ok(Phase::Focus),
            "short" | "short_break" | "short-break" => Ok(Phase::ShortBreak),
            "long" | "long_break" | "long-break" => Ok(Phase::LongBreak),
            _ => Err(ValidationError::UnknownPhase(s.to_string())),
        }
    }
}

/// Configured length of each phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub focus_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl PhaseDurations {
    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_secs,
            Phase::ShortBreak => self.short_break_secs,
            Phase::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
        }
    }
}

/// Everything the timer needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub durations: PhaseDurations,
    /// Every n-th completed focus phase is followed by a long break.
    pub long_break_interval: u32,
    /// Start the next phase automatically after a completion.
    pub auto_resume: bool,
    pub auto_resume_delay: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            long_break_interval: 4,
            auto_resume: true,
            auto_resume_delay: Duration::from_secs(1),
        }
    }
}

/// Formats seconds as `MM:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
