use tracing::error;

use crate::{
    error::{FailureScope, WeatherError},
    model::{Lang, WeatherRecord},
};

/// What a view can show while a lookup is pending or after it settles.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    /// Lookup failed; holds the user-facing message.
    Failed(String),
    /// Lookup succeeded with nothing to show.
    Empty,
    Loaded(T),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

impl LoadState<Vec<WeatherRecord>> {
    pub fn from_aggregate(result: Result<Vec<WeatherRecord>, WeatherError>, lang: Lang) -> Self {
        match result {
            Ok(records) if records.is_empty() => LoadState::Empty,
            Ok(records) => LoadState::Loaded(records),
            Err(err) => {
                error!(error = %err, "popular cities could not be loaded");
                LoadState::Failed(err.user_message(lang, FailureScope::Aggregate).to_string())
            }
        }
    }
}

impl LoadState<WeatherRecord> {
    pub fn from_single(result: Result<WeatherRecord, WeatherError>, lang: Lang) -> Self {
        match result {
            Ok(record) => LoadState::Loaded(record),
            Err(err) => {
                error!(error = %err, "weather lookup failed");
                LoadState::Failed(err.user_message(lang, FailureScope::Single).to_string())
            }
        }
    }
}
