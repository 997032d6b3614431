//! Error types for weather lookups.

use serde::Serialize;
use thiserror::Error;

/// Failure category carried by every failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    SourceError,
}

/// Errors raised by a [`WeatherSource`](crate::weather::WeatherSource).
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Weather data not available for \"{city}\". Available cities: {}", .available.join(", "))]
    NotFound { city: String, available: Vec<String> },

    #[error("Weather source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone)]
pub enum WeatherError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to get weather for {city}: {source}")]
    Lookup { city: String, source: SourceError },
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Lookup {
                source: SourceError::NotFound { .. },
                ..
            } => ErrorKind::NotFound,
            Self::Lookup { .. } => ErrorKind::SourceError,
        }
    }
}
