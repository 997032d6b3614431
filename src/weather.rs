use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{SourceError, WeatherError};

/// Normalized city identifier: trimmed, lower-cased, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CityKey(String);

impl CityKey {
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(WeatherError::InvalidInput(
                "City name must be a non-empty string".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased form for display, e.g. "new york" -> "New York".
    pub fn display_name(&self) -> String {
        self.0
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherRecord {
    pub city: CityKey,
    pub country: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u32,
    pub visibility: f64,
    pub feels_like: f64,
    pub icon: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Raw conditions for one city, before they are stamped into a [`WeatherRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub temperature: f64,
    pub description: &'static str,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u32,
    pub visibility: f64,
    pub feels_like: f64,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub name: String,
    pub description: String,
    pub known_cities: Vec<String>,
}

#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn known_cities(&self) -> Vec<String>;
    async fn fetch(&self, city: &CityKey) -> Result<WeatherRecord, SourceError>;

    fn source_info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            known_cities: self.known_cities(),
        }
    }
}

lazy_static::lazy_static! {
    static ref MOCK_CONDITIONS: HashMap<&'static str, Conditions> = {
        let mut map = HashMap::new();
        map.insert("london", Conditions { temperature: 15.0, description: "Partly cloudy", humidity: 72, wind_speed: 12.0, pressure: 1013, visibility: 10.0, feels_like: 14.0, icon: "⛅" });
        map.insert("paris", Conditions { temperature: 18.0, description: "Clear sky", humidity: 60, wind_speed: 8.0, pressure: 1016, visibility: 10.0, feels_like: 18.0, icon: "☀️" });
        map.insert("tokyo", Conditions { temperature: 22.0, description: "Light rain", humidity: 80, wind_speed: 10.0, pressure: 1008, visibility: 7.0, feels_like: 23.0, icon: "🌦️" });
        map.insert("new york", Conditions { temperature: 20.0, description: "Sunny", humidity: 55, wind_speed: 15.0, pressure: 1018, visibility: 16.0, feels_like: 19.0, icon: "☀️" });
        map.insert("sydney", Conditions { temperature: 25.0, description: "Clear sky", humidity: 65, wind_speed: 18.0, pressure: 1015, visibility: 10.0, feels_like: 26.0, icon: "☀️" });
        map.insert("berlin", Conditions { temperature: 12.0, description: "Overcast", humidity: 78, wind_speed: 14.0, pressure: 1011, visibility: 8.0, feels_like: 10.0, icon: "☁️" });
        map.insert("moscow", Conditions { temperature: 5.0, description: "Light snow", humidity: 85, wind_speed: 20.0, pressure: 1020, visibility: 4.0, feels_like: 1.0, icon: "🌨️" });
        map.insert("dubai", Conditions { temperature: 35.0, description: "Hot and sunny", humidity: 40, wind_speed: 9.0, pressure: 1006, visibility: 12.0, feels_like: 38.0, icon: "🌞" });
        map.insert("mumbai", Conditions { temperature: 30.0, description: "Humid and hazy", humidity: 88, wind_speed: 11.0, pressure: 1007, visibility: 5.0, feels_like: 36.0, icon: "🌫️" });
        map.insert("toronto", Conditions { temperature: 8.0, description: "Windy", humidity: 68, wind_speed: 25.0, pressure: 1012, visibility: 14.0, feels_like: 4.0, icon: "💨" });
        map
    };

    static ref COUNTRIES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("london", "United Kingdom");
        map.insert("paris", "France");
        map.insert("tokyo", "Japan");
        map.insert("new york", "United States");
        map.insert("sydney", "Australia");
        map.insert("berlin", "Germany");
        map.insert("moscow", "Russia");
        map.insert("dubai", "United Arab Emirates");
        map.insert("mumbai", "India");
        map.insert("toronto", "Canada");
        map
    };
}

pub const UNKNOWN_COUNTRY: &str = "unknown";

pub fn country_for(city: &CityKey) -> &'static str {
    COUNTRIES.get(city.as_str()).copied().unwrap_or(UNKNOWN_COUNTRY)
}

/// Static-table source standing in for a remote weather API.
pub struct MockWeatherSource {
    table: Arc<HashMap<String, Conditions>>,
    latency: Duration,
}

impl MockWeatherSource {
    pub fn new(latency: Duration) -> Self {
        let table = MOCK_CONDITIONS
            .iter()
            .map(|(city, conditions)| (city.to_string(), conditions.clone()))
            .collect();
        Self::with_records(table, latency)
    }

    pub fn with_records(table: HashMap<String, Conditions>, latency: Duration) -> Self {
        let table = table
            .into_iter()
            .map(|(city, conditions)| (city.trim().to_lowercase(), conditions))
            .collect();
        Self {
            table: Arc::new(table),
            latency,
        }
    }

    fn build_record(&self, city: &CityKey, conditions: &Conditions) -> WeatherRecord {
        WeatherRecord {
            city: city.clone(),
            country: country_for(city).to_string(),
            temperature: conditions.temperature,
            description: conditions.description.to_string(),
            humidity: conditions.humidity,
            wind_speed: conditions.wind_speed,
            pressure: conditions.pressure,
            visibility: conditions.visibility,
            feels_like: conditions.feels_like,
            icon: conditions.icon.to_string(),
            timestamp: Utc::now(),
            source: self.name().to_string(),
        }
    }
}

#[async_trait::async_trait]
impl WeatherSource for MockWeatherSource {
    fn name(&self) -> &str {
        "mock-api"
    }

    fn description(&self) -> &str {
        "Mock weather provider - static city table with simulated network delay"
    }

    fn known_cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.table.keys().cloned().collect();
        cities.sort();
        cities
    }

    async fn fetch(&self, city: &CityKey) -> Result<WeatherRecord, SourceError> {
        info!("🌤️  Fetching from mock API for {}", city);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.table.get(city.as_str()) {
            Some(conditions) => Ok(self.build_record(city, conditions)),
            None => Err(SourceError::NotFound {
                city: city.to_string(),
                available: self.known_cities(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_key_normalizes_case_and_whitespace() {
        let a = CityKey::parse(" London ").unwrap();
        let b = CityKey::parse("LONDON").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "london");
    }

    #[test]
    fn city_key_rejects_blank_input() {
        assert!(CityKey::parse("").is_err());
        assert!(CityKey::parse("   \t").is_err());
    }

    #[test]
    fn display_name_title_cases_words() {
        let key = CityKey::parse("new   YORK").unwrap();
        assert_eq!(key.display_name(), "New York");
    }

    #[test]
    fn unmapped_city_has_unknown_country() {
        let key = CityKey::parse("reykjavik").unwrap();
        assert_eq!(country_for(&key), UNKNOWN_COUNTRY);
        assert_eq!(country_for(&CityKey::parse("Paris").unwrap()), "France");
    }

    #[tokio::test]
    async fn fetch_known_city_builds_record() {
        let source = MockWeatherSource::new(Duration::ZERO);
        let record = source.fetch(&CityKey::parse("tokyo").unwrap()).await.unwrap();
        assert_eq!(record.city.as_str(), "tokyo");
        assert_eq!(record.country, "Japan");
        assert_eq!(record.source, "mock-api");
        assert_eq!(record.temperature, 22.0);
    }

    #[tokio::test]
    async fn fetch_unknown_city_lists_alternatives() {
        let source = MockWeatherSource::new(Duration::ZERO);
        let err = source
            .fetch(&CityKey::parse("atlantis").unwrap())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("atlantis"));
        assert!(message.contains("london"));
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_for_simulated_latency() {
        let source = MockWeatherSource::new(Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        source.fetch(&CityKey::parse("paris").unwrap()).await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(600));
    }

    #[test]
    fn custom_table_keys_are_normalized() {
        let mut table = HashMap::new();
        table.insert(
            " Springfield ".to_string(),
            Conditions {
                temperature: 10.0,
                description: "Drizzle",
                humidity: 90,
                wind_speed: 5.0,
                pressure: 1000,
                visibility: 3.0,
                feels_like: 9.0,
                icon: "🌧️",
            },
        );
        let source = MockWeatherSource::with_records(table, Duration::ZERO);
        assert_eq!(source.known_cities(), vec!["springfield".to_string()]);
        assert_eq!(source.source_info().name, "mock-api");
    }
}
