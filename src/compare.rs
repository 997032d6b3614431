use serde::Serialize;
use tracing::{info, warn};

use crate::error::ErrorKind;
use crate::service::{Envelope, Failure, WeatherReport, WeatherService};
use crate::weather::WeatherRecord;

/// Differences below this are reported as "similar".
const SIMILARITY_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    /// First city minus second city.
    pub difference: f64,
    pub winner: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherComparison {
    pub temperature: MetricComparison,
    pub humidity: MetricComparison,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub first: WeatherReport,
    pub second: WeatherReport,
    pub comparison: WeatherComparison,
    pub summary: String,
}

pub type ComparisonResponse = Envelope<ComparisonReport>;

fn compare_metric(
    difference: f64,
    first: &str,
    second: &str,
    similar: &str,
    describe: impl Fn(f64) -> String,
    more: &str,
    less: &str,
) -> MetricComparison {
    let winner = if difference > 0.0 { first } else { second };
    let description = if difference.abs() < SIMILARITY_THRESHOLD {
        similar.to_string()
    } else {
        let direction = if difference > 0.0 { more } else { less };
        format!(
            "{} {} in {} than {}",
            describe(difference.abs()),
            direction,
            first,
            second
        )
    };

    MetricComparison {
        difference,
        winner: winner.to_string(),
        description,
    }
}

/// Signed temperature and humidity differences of `a` relative to `b`.
pub fn compare_records(a: &WeatherRecord, b: &WeatherRecord) -> WeatherComparison {
    let name_a = a.city.display_name();
    let name_b = b.city.display_name();

    let temperature = compare_metric(
        a.temperature - b.temperature,
        &name_a,
        &name_b,
        "Similar temperatures",
        |diff| format!("{:.1}°C", diff),
        "warmer",
        "cooler",
    );

    let humidity = compare_metric(
        f64::from(a.humidity) - f64::from(b.humidity),
        &name_a,
        &name_b,
        "Similar humidity",
        |diff| format!("{:.0}%", diff),
        "more humid",
        "less humid",
    );

    WeatherComparison {
        temperature,
        humidity,
    }
}

impl WeatherService {
    pub async fn compare_weather(&self, first: &str, second: &str) -> ComparisonResponse {
        info!("⚖️  Comparing weather: {} vs {}", first, second);

        let (response_a, response_b) =
            tokio::join!(self.get_weather(first), self.get_weather(second));

        let (report_a, report_b) = match (response_a, response_b) {
            (Envelope::Success(a), Envelope::Success(b)) => (a, b),
            (a, b) => {
                let reasons: Vec<String> = [(first, a.failure()), (second, b.failure())]
                    .into_iter()
                    .filter_map(|(city, failure)| {
                        failure.map(|f| format!("could not get weather for {}: {}", city, f.message))
                    })
                    .collect();
                let message = format!("Comparison failed: {}", reasons.join("; "));
                warn!("❌ {}", message);

                let kind = [a.failure(), b.failure()]
                    .into_iter()
                    .flatten()
                    .map(|f| f.kind)
                    .next()
                    .unwrap_or(ErrorKind::SourceError);
                return Envelope::Failure(Failure::new(kind, message));
            }
        };

        let comparison = compare_records(&report_a.weather, &report_b.weather);
        let summary = format!(
            "{}: {}\n{}: {}",
            report_a.weather.city.display_name(),
            report_a.weather.description,
            report_b.weather.city.display_name(),
            report_b.weather.description
        );

        Envelope::Success(ComparisonReport {
            first: report_a,
            second: report_b,
            comparison,
            summary,
        })
    }
}
