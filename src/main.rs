use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn, Level};

use weather_lookup::templates::{ComparisonTemplate, WeatherTemplate};
use weather_lookup::{BatchResponse, Config, Envelope, WeatherService};

fn print_json<T: Serialize>(label: &str, value: &T) -> Result<()> {
    println!("--- {} ---", label);
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if config.debug { Level::DEBUG } else { Level::INFO })
        .init();

    debug!("⚙️  Loaded config: {}", serde_json::to_string(&config)?);

    let service = WeatherService::from_config(&config);
    info!(
        "🦀 Weather lookup demo using {} (cache TTL {}ms, latency {}ms)",
        service.source_name(),
        config.cache_ttl_ms,
        config.mock_latency_ms
    );
    info!("🏙️  Supported cities: {}", service.supported_cities().join(", "));

    // Same city twice: the second answer comes from the cache
    for _ in 0..2 {
        match service.get_weather("London").await {
            Envelope::Success(report) => println!("{}", WeatherTemplate::render_report(&report)),
            Envelope::Failure(failure) => warn!("❌ {}", failure.message),
        }
    }

    // Batch with one unknown city
    let batch = service
        .get_multiple_cities_weather(&["Paris", "Atlantis", "Tokyo"])
        .await;
    if let BatchResponse::Completed { results, summary } = &batch {
        for result in results {
            match result {
                Envelope::Success(report) => println!("{}", report.summary),
                Envelope::Failure(failure) => println!("{:?}: {}", failure.kind, failure.message),
            }
        }
        info!(
            "📊 {} of {} succeeded, {:.1}ms average",
            summary.successful, summary.total, summary.average_time_ms
        );
    }
    print_json("batch", &batch)?;

    match service.compare_weather("London", "Dubai").await {
        Envelope::Success(report) => println!("{}", ComparisonTemplate::render_report(&report)),
        Envelope::Failure(failure) => warn!("❌ {}", failure.message),
    }

    print_json("cache status", &service.cache_status())?;
    service.clear_expired_cache();

    Ok(())
}
