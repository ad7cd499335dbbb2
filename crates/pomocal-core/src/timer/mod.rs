mod driver;
mod phase;
mod session;

pub use driver::TimerDriver;
pub use phase::{format_clock, Phase, PhaseDurations, TimerSettings};
pub use session::{TimerSession, TimerSnapshot};
