//! Weather annotations for tasks
//!
//! A task's free-text location is turned into current conditions in two
//! chained steps:
//!
//! 1. [`geocode::Geocoder`] resolves the place name to coordinates
//! 2. [`forecast::WeatherClient`] fetches current weather at those coordinates
//!
//! [`enrich::WeatherEnricher`] runs that chain once per distinct location for
//! a page of tasks. Every external failure degrades to "no weather" and is
//! logged; none of it is ever surfaced as an error.

pub mod enrich;
pub mod forecast;
pub mod geocode;
pub mod types;

pub use enrich::WeatherEnricher;
pub use types::{Coordinates, WeatherCondition, WeatherInfo, WeatherSnapshot};

/// Default geocoding service root
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";

/// Default forecast service root
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

/// Settings for the external weather services
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    /// Geocoding service root (the client appends `/search`)
    pub geocoding_url: String,

    /// Forecast service root (the client appends `/v1/forecast`)
    pub forecast_url: String,

    /// Identifying `User-Agent` sent to the geocoder
    pub user_agent: String,

    /// Response language requested from the forecast service
    pub language: String,

    /// Per-request timeout for both services
    pub timeout_seconds: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            user_agent: format!("Taskcast/{}", crate::VERSION),
            language: "ru".to_string(),
            timeout_seconds: 5,
        }
    }
}
