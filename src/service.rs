//! Cache-backed weather lookups.
//!
//! [`WeatherService`] is the single entry point: it validates the city,
//! answers from the cache when it can, falls back to the
//! [`WeatherSource`] otherwise, and always hands back an [`Envelope`]
//! instead of an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheStatus, WeatherCache};
use crate::config::Config;
use crate::error::{ErrorKind, WeatherError};
use crate::weather::{CityKey, MockWeatherSource, WeatherRecord, WeatherSource};

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl From<WeatherError> for Failure {
    fn from(err: WeatherError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Tagged success/failure wrapper returned by every public operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum Envelope<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub weather: WeatherRecord,
    pub from_cache: bool,
    pub summary: String,
}

impl WeatherReport {
    fn new(weather: WeatherRecord, from_cache: bool) -> Self {
        let summary = format!(
            "{}, {}: {:.1}°C, {} {}",
            weather.city.display_name(),
            weather.country,
            weather.temperature,
            weather.description,
            weather.icon
        );
        Self {
            weather,
            from_cache,
            summary,
        }
    }
}

pub type WeatherResponse = Envelope<WeatherReport>;

/// Cheap-to-clone handle; clones share one source and one cache.
#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    cache: Arc<WeatherCache>,
}

impl WeatherService {
    pub fn new(source: Arc<dyn WeatherSource>, cache: WeatherCache) -> Self {
        Self {
            source,
            cache: Arc::new(cache),
        }
    }

    /// Service backed by the mock source, sized and timed from `config`.
    pub fn from_config(config: &Config) -> Self {
        let source = Arc::new(MockWeatherSource::new(config.mock_latency()));
        let cache = WeatherCache::new(config.cache_max_entries, config.cache_ttl());
        Self::new(source, cache)
    }

    pub async fn get_weather(&self, city: &str) -> WeatherResponse {
        let key = match CityKey::parse(city) {
            Ok(key) => key,
            Err(err) => {
                warn!("❌ Rejected weather lookup: {}", err);
                return Envelope::Failure(err.into());
            }
        };

        if let Some(entry) = self.cache.get(&key) {
            info!("📦 Returning cached data for {}", key);
            return Envelope::Success(WeatherReport::new(entry.record, true));
        }

        match self.source.fetch(&key).await {
            Ok(record) => {
                self.cache.put(key.clone(), record.clone());
                info!("💾 Cached weather data for {}", key);
                Envelope::Success(WeatherReport::new(record, false))
            }
            Err(source) => {
                let err = WeatherError::Lookup {
                    city: city.to_string(),
                    source,
                };
                warn!("❌ Weather lookup failed: {}", err);
                Envelope::Failure(err.into())
            }
        }
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }

    pub fn clear_cache(&self) {
        self.cache.clear_all();
        info!("🗑️  Cleared weather cache");
    }

    pub fn clear_expired_cache(&self) -> usize {
        let removed = self.cache.clear_expired();
        info!("🧹 Removed {} expired cache entries", removed);
        removed
    }

    pub fn supported_cities(&self) -> Vec<String> {
        self.source.known_cities()
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}
