//! Current weather lookup against an Open-Meteo-compatible forecast API.

use super::types::{Coordinates, WeatherSnapshot};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<WeatherSnapshot>,
}

/// Client for the forecast API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    language: String,
}

impl WeatherClient {
    /// `base_url` is the service root, e.g. `https://api.open-meteo.com`.
    pub fn new(client: Client, base_url: &str, language: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        }
    }

    /// Fetches current conditions at `coords` in °C, km/h and mm.
    ///
    /// Returns `None` if the payload has no `current_weather` object or the
    /// request fails; failures are logged, never returned. No retry.
    pub async fn current_weather(&self, coords: Coordinates) -> Option<WeatherSnapshot> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
                ("temperature_unit", "celsius"),
                ("windspeed_unit", "kmh"),
                ("precipitation_unit", "mm"),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "Forecast request failed: {}",
                    e
                );
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Forecast returned error status");
            return None;
        }

        match response.json::<ForecastResponse>().await {
            Ok(body) => {
                if body.current_weather.is_none() {
                    tracing::debug!("Forecast payload has no current_weather");
                }
                body.current_weather
            }
            Err(e) => {
                tracing::warn!("Forecast response parse error: {}", e);
                None
            }
        }
    }
}
