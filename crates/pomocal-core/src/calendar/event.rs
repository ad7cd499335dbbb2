use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A dated task or reminder created by the user.
///
/// Only `done` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default)]
    pub done: bool,
}

impl Event {
    /// Create a new event with a fresh id. Returns `None` when the title is
    /// blank after trimming.
    pub fn new(title: &str, date: NaiveDate) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            date,
            done: false,
        })
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}
