mod event;
mod month;
mod store;

pub use event::{parse_date, Event};
pub use month::{GridDay, Month, MonthGrid};
pub use store::EventStore;
