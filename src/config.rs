use anyhow::Result;
use serde::Serialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 100;
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub cache_ttl_ms: u64,
    pub cache_max_entries: u64,
    pub mock_latency_ms: u64,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
            debug: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let cache_ttl_ms = parse_var("WEATHER_CACHE_TTL_MS", DEFAULT_CACHE_TTL_MS);
        let cache_max_entries = parse_var("WEATHER_CACHE_MAX_ENTRIES", 0u64);
        let cache_max_entries = if cache_max_entries == 0 {
            DEFAULT_CACHE_MAX_ENTRIES
        } else {
            cache_max_entries
        };
        let mock_latency_ms = parse_var("WEATHER_MOCK_LATENCY_MS", DEFAULT_MOCK_LATENCY_MS);
        let debug = parse_var("DEBUG", false);

        Ok(Self {
            cache_ttl_ms,
            cache_max_entries,
            mock_latency_ms,
            debug,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
