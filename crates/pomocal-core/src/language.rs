//! Persisted UI language preference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{StorageError, ValidationError};
use crate::storage::{KeyValueStore, LANGUAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    /// First-run default.
    #[default]
    Zh,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }

    /// Stored preference, or the default when absent or unrecognized.
    pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> Self {
        match storage.get(LANGUAGE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                warn!("ignoring stored language: {e}");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("could not read {LANGUAGE_KEY}: {e}");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(self, storage: &mut S) -> Result<(), StorageError> {
        storage.set(LANGUAGE_KEY, self.code())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            other => Err(ValidationError::UnknownLanguage(other.to_string())),
        }
    }
}
