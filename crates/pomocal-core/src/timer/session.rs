//! Timer session state machine.
//!
//! The session does not own a clock or threads. Every call to `tick()`
//! represents one elapsed second; the driver decides when that happens.
//!
//! ## State Transitions
//!
//! ```text
//! {Focus, ShortBreak, LongBreak} x {Running, Paused}
//!
//! Focus      --complete--> LongBreak   (every n-th focus)
//! Focus      --complete--> ShortBreak  (otherwise)
//! *Break     --complete--> Focus
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = TimerSession::new(TimerSettings::default());
//! session.toggle_run();
//! // Once per second:
//! session.tick(); // Returns Some(TimerEvent::PhaseCompleted) at zero
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::phase::{format_clock, Phase, TimerSettings};
use crate::events::TimerEvent;

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub is_running: bool,
    pub completed_focus_count: u32,
    /// Fraction of the phase still remaining, 0.0 ..= 1.0.
    pub progress: f64,
    pub clock: String,
}

/// Core timer state machine.
#[derive(Debug, Clone)]
pub struct TimerSession {
    settings: TimerSettings,
    phase: Phase,
    remaining_secs: u64,
    running: bool,
    completed_focus_count: u32,
}

impl TimerSession {
    /// Create a paused session at the start of a focus phase.
    pub fn new(settings: TimerSettings) -> Self {
        let remaining_secs = settings.durations.duration_of(Phase::Focus);
        Self {
            settings,
            phase: Phase::Focus,
            remaining_secs,
            running: false,
            completed_focus_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn total_secs(&self) -> u64 {
        self.settings.durations.duration_of(self.phase)
    }

    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (self.remaining_secs as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            is_running: self.running,
            completed_focus_count: self.completed_focus_count,
            progress: self.progress(),
            clock: format_clock(self.remaining_secs),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch to `phase`, refill its time and stop.
    pub fn select_phase(&mut self, phase: Phase) -> TimerEvent {
        self.phase = phase;
        self.remaining_secs = self.total_secs();
        self.running = false;
        TimerEvent::PhaseSelected {
            phase,
            duration_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Start or pause. A session sitting at zero is never resumed.
    pub fn toggle_run(&mut self) -> Option<TimerEvent> {
        if self.running {
            self.running = false;
            return Some(TimerEvent::TimerPaused {
                phase: self.phase,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            });
        }
        if self.remaining_secs == 0 {
            return None;
        }
        self.running = true;
        Some(TimerEvent::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Stop and refill the current phase. Cycle count is kept.
    pub fn reset(&mut self) -> TimerEvent {
        self.running = false;
        self.remaining_secs = self.total_secs();
        TimerEvent::TimerReset {
            phase: self.phase,
            duration_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Begin the phase that a completion transition just set up.
    pub fn resume_after_completion(&mut self) -> Option<TimerEvent> {
        if self.running || self.remaining_secs == 0 {
            return None;
        }
        self.running = true;
        Some(TimerEvent::AutoResumed {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// One elapsed second. Returns `Some(TimerEvent::PhaseCompleted)` when
    /// this tick brought the phase to zero.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running || self.remaining_secs == 0 {
            return None;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            return Some(self.complete_phase());
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> TimerEvent {
        let completed = self.phase;
        self.running = false;
        let next = match completed {
            Phase::Focus => {
                self.completed_focus_count = self.completed_focus_count.saturating_add(1);
                let interval = self.settings.long_break_interval.max(1);
                if self.completed_focus_count % interval == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.phase = next;
        self.remaining_secs = self.total_secs();
        debug!(
            %completed,
            %next,
            cycles = self.completed_focus_count,
            "phase completed"
        );
        TimerEvent::PhaseCompleted {
            completed,
            next,
            completed_focus_count: self.completed_focus_count,
            at: Utc::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(
        settings: TimerSettings,
        phase: Phase,
        remaining_secs: u64,
        completed_focus_count: u32,
    ) -> Self {
        Self {
            settings,
            phase,
            remaining_secs,
            running: true,
            completed_focus_count,
        }
    }
}

impl Default for TimerSession {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::PhaseDurations;
    use proptest::prelude::*;

    fn completion_of(event: Option<TimerEvent>) -> (Phase, Phase, u32) {
        match event {
            Some(TimerEvent::PhaseCompleted {
                completed,
                next,
                completed_focus_count,
                ..
            }) => (completed, next, completed_focus_count),
            other => panic!("Expected PhaseCompleted, got {other:?}"),
        }
    }

    #[test]
    fn initial_state_is_paused_focus() {
        let session = TimerSession::default();
        assert_eq!(session.phase(), Phase::Focus);
        assert_eq!(session.remaining_secs(), 1500);
        assert!(!session.is_running());
        assert_eq!(session.completed_focus_count(), 0);
    }

    #[test]
    fn toggle_run_flips_running() {
        let mut session = TimerSession::default();
        assert!(matches!(session.toggle_run(), Some(TimerEvent::TimerStarted { .. })));
        assert!(session.is_running());
        assert!(matches!(session.toggle_run(), Some(TimerEvent::TimerPaused { .. })));
        assert!(!session.is_running());
    }

    #[test]
    fn tick_only_counts_while_running() {
        let mut session = TimerSession::default();
        session.tick();
        assert_eq!(session.remaining_secs(), 1500);
        session.toggle_run();
        session.tick();
        session.tick();
        assert_eq!(session.remaining_secs(), 1498);
    }

    #[test]
    fn select_phase_resets_and_stops() {
        let mut session = TimerSession::default();
        session.toggle_run();
        session.tick();
        session.select_phase(Phase::LongBreak);
        assert_eq!(session.phase(), Phase::LongBreak);
        assert_eq!(session.remaining_secs(), 900);
        assert!(!session.is_running());
    }

    #[test]
    fn reset_refills_current_phase_only() {
        let mut session = TimerSession::with_state(TimerSettings::default(), Phase::ShortBreak, 42, 2);
        session.reset();
        assert_eq!(session.phase(), Phase::ShortBreak);
        assert_eq!(session.remaining_secs(), 300);
        assert_eq!(session.completed_focus_count(), 2);
        assert!(!session.is_running());
    }

    #[test]
    fn fourth_focus_goes_to_long_break() {
        let mut session = TimerSession::with_state(TimerSettings::default(), Phase::Focus, 1, 3);
        let (completed, next, count) = completion_of(session.tick());
        assert_eq!(completed, Phase::Focus);
        assert_eq!(next, Phase::LongBreak);
        assert_eq!(count, 4);
        assert_eq!(session.remaining_secs(), 900);
        assert!(!session.is_running());
    }

    #[test]
    fn second_focus_goes_to_short_break() {
        let mut session = TimerSession::with_state(TimerSettings::default(), Phase::Focus, 1, 1);
        let (_, next, count) = completion_of(session.tick());
        assert_eq!(next, Phase::ShortBreak);
        assert_eq!(count, 2);
        assert_eq!(session.remaining_secs(), 300);
    }

    #[test]
    fn any_break_returns_to_focus() {
        for phase in [Phase::ShortBreak, Phase::LongBreak] {
            let mut session = TimerSession::with_state(TimerSettings::default(), phase, 1, 4);
            let (completed, next, count) = completion_of(session.tick());
            assert_eq!(completed, phase);
            assert_eq!(next, Phase::Focus);
            assert_eq!(count, 4, "breaks do not count as cycles");
            assert_eq!(session.remaining_secs(), 1500);
        }
    }

    #[test]
    fn completion_fires_once() {
        let mut session = TimerSession::with_state(TimerSettings::default(), Phase::Focus, 1, 0);
        assert!(session.tick().is_some());
        assert!(session.tick().is_none());
        assert_eq!(session.completed_focus_count(), 1);
    }

    #[test]
    fn cannot_resume_at_zero() {
        let mut settings = TimerSettings::default();
        settings.durations.short_break_secs = 0;
        let mut session = TimerSession::new(settings);
        session.select_phase(Phase::ShortBreak);
        assert_eq!(session.remaining_secs(), 0);
        assert!(session.toggle_run().is_none());
        assert!(!session.is_running());
        assert!(session.resume_after_completion().is_none());
    }

    #[test]
    fn resume_after_completion_starts_next_phase() {
        let mut session = TimerSession::with_state(TimerSettings::default(), Phase::Focus, 1, 0);
        session.tick();
        assert!(matches!(
            session.resume_after_completion(),
            Some(TimerEvent::AutoResumed { phase: Phase::ShortBreak, remaining_secs: 300, .. })
        ));
        assert!(session.is_running());
        assert!(session.resume_after_completion().is_none());
    }

    #[test]
    fn custom_long_break_interval() {
        let settings = TimerSettings {
            long_break_interval: 2,
            ..TimerSettings::default()
        };
        let mut session = TimerSession::with_state(settings, Phase::Focus, 1, 1);
        let (_, next, _) = completion_of(session.tick());
        assert_eq!(next, Phase::LongBreak);
    }

    #[test]
    fn snapshot_reports_progress_and_clock() {
        let mut session = TimerSession::default();
        session.select_phase(Phase::ShortBreak);
        session.toggle_run();
        for _ in 0..150 {
            session.tick();
        }
        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::ShortBreak);
        assert_eq!(snap.remaining_secs, 150);
        assert_eq!(snap.total_secs, 300);
        assert!((snap.progress - 0.5).abs() < f64::EPSILON);
        assert_eq!(snap.clock, "02:30");
        assert!(snap.is_running);
    }

    proptest! {
        #[test]
        fn remaining_never_increases_while_ticking(ticks in 0usize..400, start in 1u64..300) {
            let settings = TimerSettings {
                durations: PhaseDurations {
                    focus_secs: 300,
                    short_break_secs: 300,
                    long_break_secs: 300,
                },
                ..TimerSettings::default()
            };
            let mut session = TimerSession::with_state(settings, Phase::Focus, start, 0);
            let mut previous = session.remaining_secs();
            for _ in 0..ticks {
                if session.tick().is_some() {
                    // Completion refills the next phase and stops.
                    prop_assert!(!session.is_running());
                    break;
                }
                prop_assert!(session.remaining_secs() <= previous);
                previous = session.remaining_secs();
            }
            prop_assert!(session.remaining_secs() <= session.total_secs());
        }
    }
}
