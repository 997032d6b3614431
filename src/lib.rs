//! Cache-backed weather lookups with batch and comparison helpers.
//!
//! The data source is a mocked remote API with simulated latency; lookups
//! go through a short-lived per-city cache and every public operation
//! returns a tagged success/failure envelope.

pub mod batch;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod service;
pub mod templates;
pub mod weather;

pub use batch::{BatchResponse, BatchSummary};
pub use cache::{CacheStatus, WeatherCache};
pub use compare::{compare_records, ComparisonReport, ComparisonResponse, WeatherComparison};
pub use config::Config;
pub use error::{ErrorKind, SourceError, WeatherError};
pub use service::{Envelope, Failure, WeatherReport, WeatherResponse, WeatherService};
pub use weather::{CityKey, MockWeatherSource, WeatherRecord, WeatherSource};
