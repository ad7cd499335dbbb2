//! Wall-clock driver for a [`TimerSession`].
//!
//! Ticks the session once per real second while it runs, and after a phase
//! completes, starts the next phase once the configured delay has passed.
//! Every run owns a child [`CancellationToken`]. Pausing, selecting a
//! phase, resetting or shutting down cancels it, so a stale tick or
//! auto-resume can never touch a superseded session.
//!
//! All commands must be issued from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::phase::Phase;
use super::session::{TimerSession, TimerSnapshot};
use crate::events::TimerEvent;

const TICK: Duration = Duration::from_secs(1);

struct DriverState {
    session: TimerSession,
    run: Option<CancellationToken>,
}

struct Shared {
    state: Mutex<DriverState>,
    events: mpsc::UnboundedSender<TimerEvent>,
    root: CancellationToken,
    auto_resume: bool,
    auto_resume_delay: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TimerEvent) {
        // The receiver going away just means nobody renders anymore.
        let _ = self.events.send(event);
    }

    /// Cancels the current run (if any) and, when the session is running,
    /// spawns a fresh tick loop. Caller holds the state lock.
    fn restart_run(self: &Arc<Self>, state: &mut DriverState) {
        if let Some(token) = state.run.take() {
            token.cancel();
        }
        if !state.session.is_running() {
            return;
        }
        let token = self.root.child_token();
        state.run = Some(token.clone());
        let shared = Arc::clone(self);
        tokio::spawn(async move { shared.tick_loop(token).await });
    }

    async fn tick_loop(self: Arc<Self>, token: CancellationToken) {
        let mut interval = time::interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = interval.tick() => {}
            }

            let completion = {
                let mut state = self.lock();
                if token.is_cancelled() {
                    return;
                }
                let completion = state.session.tick();
                self.emit(TimerEvent::StateSnapshot(state.session.snapshot()));
                trace!(remaining = state.session.remaining_secs(), "tick");
                completion
            };

            let Some(completion) = completion else {
                continue;
            };
            self.emit(completion);

            if !self.auto_resume {
                debug!("auto-resume disabled, run finished");
                return;
            }

            tokio::select! {
                _ = token.cancelled() => return,
                _ = time::sleep(self.auto_resume_delay) => {}
            }

            let mut state = self.lock();
            if token.is_cancelled() {
                return;
            }
            match state.session.resume_after_completion() {
                Some(event) => {
                    debug!(phase = %state.session.phase(), "auto-resumed next phase");
                    self.emit(event);
                    self.emit(TimerEvent::StateSnapshot(state.session.snapshot()));
                    interval.reset();
                }
                None => return,
            }
        }
    }
}

/// Drives a [`TimerSession`] in real time.
///
/// Dropping the driver cancels every pending callback.
pub struct TimerDriver {
    shared: Arc<Shared>,
}

impl TimerDriver {
    /// Wrap `session` and return the driver plus the stream of events it
    /// produces. Auto-resume behavior comes from the session's settings.
    pub fn new(session: TimerSession) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = session.settings().clone();
        let shared = Arc::new(Shared {
            state: Mutex::new(DriverState { session, run: None }),
            events: tx,
            root: CancellationToken::new(),
            auto_resume: settings.auto_resume,
            auto_resume_delay: settings.auto_resume_delay,
        });
        (Self { shared }, rx)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.lock().session.snapshot()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.root.is_cancelled()
    }

    /// Start or pause the session.
    pub fn toggle_run(&self) -> Option<TimerEvent> {
        if self.is_shut_down() {
            return None;
        }
        let mut state = self.shared.lock();
        let event = state.session.toggle_run();
        self.shared.restart_run(&mut state);
        if let Some(ref event) = event {
            self.shared.emit(event.clone());
        }
        event
    }

    /// Switch phase. Cancels any pending tick or auto-resume.
    pub fn select_phase(&self, phase: Phase) -> Option<TimerEvent> {
        if self.is_shut_down() {
            return None;
        }
        let mut state = self.shared.lock();
        let event = state.session.select_phase(phase);
        self.shared.restart_run(&mut state);
        self.shared.emit(event.clone());
        Some(event)
    }

    /// Refill the current phase and stop.
    pub fn reset(&self) -> Option<TimerEvent> {
        if self.is_shut_down() {
            return None;
        }
        let mut state = self.shared.lock();
        let event = state.session.reset();
        self.shared.restart_run(&mut state);
        self.shared.emit(event.clone());
        Some(event)
    }

    /// Cancel all pending callbacks. The session keeps its last state but
    /// will not change again.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        self.shared.root.cancel();
        state.run = None;
        debug!("timer driver shut down");
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.shared.root.cancel();
    }
}
