//! Per-request weather enrichment for a list of tasks.

use super::{
    forecast::WeatherClient,
    geocode::Geocoder,
    types::{WeatherInfo, WeatherSnapshot},
    WeatherConfig,
};
use crate::models::task::Task;
use reqwest::Client;
use std::time::Duration;

/// Builds the location → weather mapping for a page of tasks
///
/// Each distinct location string is geocoded once and, if that succeeds,
/// looked up once at the forecast service. Nothing is cached between calls
/// to [`WeatherEnricher::enrich`].
#[derive(Debug, Clone)]
pub struct WeatherEnricher {
    geocoder: Geocoder,
    forecast: WeatherClient,
}

impl WeatherEnricher {
    /// Builds both clients over one shared HTTP connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: &WeatherConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self::from_clients(
            Geocoder::new(client.clone(), &config.geocoding_url, &config.user_agent),
            WeatherClient::new(client, &config.forecast_url, &config.language),
        ))
    }

    pub fn from_clients(geocoder: Geocoder, forecast: WeatherClient) -> Self {
        Self { geocoder, forecast }
    }

    /// Geocodes `location`, then fetches current weather at the result
    pub async fn lookup(&self, location: &str) -> Option<WeatherSnapshot> {
        let coords = self.geocoder.resolve(location).await?;
        self.forecast.current_weather(coords).await
    }

    /// Looks up weather for every distinct non-empty task location
    ///
    /// Locations are compared by exact string equality. Tasks without a
    /// location contribute nothing to the mapping.
    pub async fn enrich(&self, tasks: &[Task]) -> WeatherInfo {
        let mut weather = WeatherInfo::new();

        for location in tasks.iter().filter_map(Task::weather_location) {
            if weather.contains_key(location) {
                continue;
            }
            let snapshot = self.lookup(location).await;
            weather.insert(location.to_string(), snapshot);
        }

        tracing::debug!(
            tasks = tasks.len(),
            locations = weather.len(),
            resolved = weather.values().filter(|w| w.is_some()).count(),
            "Weather enrichment finished"
        );
        weather
    }
}
