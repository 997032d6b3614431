use serde::Serialize;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info};

use crate::error::ErrorKind;
use crate::service::{Failure, WeatherResponse, WeatherService};

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub average_time_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchResponse {
    /// Every lookup settled. Individual failures live in `results`.
    Completed {
        results: Vec<WeatherResponse>,
        summary: BatchSummary,
    },
    /// The city list was unusable; nothing was dispatched.
    Rejected { error: Failure },
    /// A lookup task died before settling.
    Faulted { error: Failure, summary: BatchSummary },
}

impl BatchResponse {
    pub fn summary(&self) -> Option<&BatchSummary> {
        match self {
            Self::Completed { summary, .. } | Self::Faulted { summary, .. } => Some(summary),
            Self::Rejected { .. } => None,
        }
    }

    pub fn results(&self) -> &[WeatherResponse] {
        match self {
            Self::Completed { results, .. } => results,
            Self::Rejected { .. } | Self::Faulted { .. } => &[],
        }
    }
}

fn summarize(total: usize, successful: usize, started: Instant) -> BatchSummary {
    let elapsed = started.elapsed();
    BatchSummary {
        total,
        successful,
        failed: total - successful,
        duration_ms: elapsed.as_millis() as u64,
        average_time_ms: elapsed.as_secs_f64() * 1000.0 / total as f64,
    }
}

impl WeatherService {
    /// Looks up every city concurrently and keeps all results in input order.
    pub async fn get_multiple_cities_weather<S: AsRef<str>>(&self, cities: &[S]) -> BatchResponse {
        if cities.is_empty() {
            return BatchResponse::Rejected {
                error: Failure::new(
                    ErrorKind::InvalidInput,
                    "Cities list must contain at least one city",
                ),
            };
        }

        let total = cities.len();
        info!("📋 Fetching weather for {} cities", total);
        let started = Instant::now();

        let mut join_set = JoinSet::new();
        for (index, city) in cities.iter().enumerate() {
            let service = self.clone();
            let city = city.as_ref().to_string();
            join_set.spawn(async move { (index, service.get_weather(&city).await) });
        }

        let mut slots: Vec<Option<WeatherResponse>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, response)) => slots[index] = Some(response),
                Err(join_error) => {
                    error!("❌ Batch lookup task failed: {}", join_error);
                    return BatchResponse::Faulted {
                        error: Failure::new(
                            ErrorKind::SourceError,
                            format!("Batch lookup aborted: {}", join_error),
                        ),
                        summary: summarize(total, 0, started),
                    };
                }
            }
        }

        let results: Vec<WeatherResponse> = slots.into_iter().flatten().collect();
        let successful = results.iter().filter(|r| r.is_success()).count();
        let summary = summarize(total, successful, started);

        info!(
            "✅ Batch complete: {}/{} succeeded in {}ms",
            summary.successful, summary.total, summary.duration_ms
        );

        BatchResponse::Completed { results, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::counting_service;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn keeps_every_result_in_input_order() {
        let (service, _) = counting_service(Duration::ZERO);

        let response = service
            .get_multiple_cities_weather(&["London", "Atlantis", "Tokyo"])
            .await;

        let results = response.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].success().unwrap().weather.city.as_str(), "london");
        assert_eq!(results[1].failure().unwrap().kind, ErrorKind::NotFound);
        assert_eq!(results[2].success().unwrap().weather.city.as_str(), "tokyo");

        let summary = response.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_overlap() {
        let latency = Duration::from_millis(500);
        let (service, source) = counting_service(latency);

        let response = service
            .get_multiple_cities_weather(&["paris", "berlin", "sydney", "dubai"])
            .await;

        let summary = response.summary().unwrap();
        assert_eq!(source.calls(), 4);
        assert!(summary.duration_ms >= 500);
        assert!(summary.duration_ms < 1000, "lookups ran sequentially");
        assert!((summary.average_time_ms - summary.duration_ms as f64 / 4.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn all_failures_still_complete() {
        let (service, _) = counting_service(Duration::ZERO);

        let response = service
            .get_multiple_cities_weather(&["Atlantis", "", "El Dorado"])
            .await;

        assert!(matches!(response, BatchResponse::Completed { .. }));
        let summary = response.summary().unwrap();
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 3);
        assert_eq!(
            response.results()[1].failure().unwrap().kind,
            ErrorKind::InvalidInput
        );
    }

    struct PanickingSource;

    #[async_trait::async_trait]
    impl crate::weather::WeatherSource for PanickingSource {
        fn name(&self) -> &str {
            "panicking"
        }

        fn description(&self) -> &str {
            "panics on every fetch"
        }

        fn known_cities(&self) -> Vec<String> {
            Vec::new()
        }

        async fn fetch(
            &self,
            _city: &crate::weather::CityKey,
        ) -> Result<crate::weather::WeatherRecord, crate::error::SourceError> {
            panic!("source blew up");
        }
    }

    #[tokio::test]
    async fn task_fault_fails_whole_batch() {
        let service = WeatherService::new(
            std::sync::Arc::new(PanickingSource),
            crate::cache::WeatherCache::new(10, Duration::from_secs(300)),
        );

        let response = service.get_multiple_cities_weather(&["london", "paris"]).await;

        match &response {
            BatchResponse::Faulted { summary, .. } => {
                assert_eq!(summary.successful, 0);
                assert_eq!(summary.failed, 2);
            }
            other => panic!("expected fault, got {:?}", other),
        }
        assert!(response.results().is_empty());
    }

    #[tokio::test]
    async fn empty_list_is_rejected() {
        let (service, source) = counting_service(Duration::ZERO);
        let cities: Vec<String> = Vec::new();

        let response = service.get_multiple_cities_weather(&cities).await;

        match response {
            BatchResponse::Rejected { error } => assert_eq!(error.kind, ErrorKind::InvalidInput),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(source.calls(), 0);
    }
}
