use askama::Template;
use tracing::warn;

use crate::compare::ComparisonReport;
use crate::service::WeatherReport;

#[derive(Template)]
#[template(path = "weather.txt")]
pub struct WeatherTemplate {
    pub icon: String,
    pub city: String,
    pub country: String,
    pub from_cache: bool,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u32,
    pub visibility: f64,
    pub timestamp: String,
}

impl WeatherTemplate {
    pub fn render_report(report: &WeatherReport) -> String {
        let weather = &report.weather;
        let template = WeatherTemplate {
            icon: weather.icon.clone(),
            city: weather.city.display_name(),
            country: weather.country.clone(),
            from_cache: report.from_cache,
            temperature: weather.temperature,
            feels_like: weather.feels_like,
            description: weather.description.clone(),
            humidity: weather.humidity,
            wind_speed: weather.wind_speed,
            pressure: weather.pressure,
            visibility: weather.visibility,
            timestamp: weather.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        };

        template.render().unwrap_or_else(|e| {
            warn!("Template rendering error: {}", e);
            report.summary.clone()
        })
    }
}

#[derive(Template)]
#[template(path = "comparison.txt")]
pub struct ComparisonTemplate {
    pub first: String,
    pub second: String,
    pub temperature: String,
    pub humidity: String,
    pub summary: String,
}

impl ComparisonTemplate {
    pub fn render_report(report: &ComparisonReport) -> String {
        let template = ComparisonTemplate {
            first: report.first.weather.city.display_name(),
            second: report.second.weather.city.display_name(),
            temperature: report.comparison.temperature.description.clone(),
            humidity: report.comparison.humidity.description.clone(),
            summary: report.summary.clone(),
        };

        template.render().unwrap_or_else(|e| {
            warn!("Template rendering error: {}", e);
            report.summary.clone()
        })
    }
}
