//! Weather data types shared by the geocoder, the forecast client, and views.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Request-scoped weather lookup results keyed by exact location string
///
/// `None` means the location was looked up but no weather is available.
/// Locations that were never looked up have no entry.
pub type WeatherInfo = HashMap<String, Option<WeatherSnapshot>>;

/// A resolved latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The forecast service's `current_weather` object
///
/// The payload is kept as the service sent it. Display fields are read
/// leniently: a field with an unexpected type reads as absent instead of
/// failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherSnapshot(Map<String, Value>);

impl WeatherSnapshot {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The full payload
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn number(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    /// Air temperature in °C
    pub fn temperature(&self) -> Option<f64> {
        self.number("temperature")
    }

    /// Wind speed in km/h
    pub fn windspeed(&self) -> Option<f64> {
        self.number("windspeed")
    }

    /// Wind direction in degrees
    pub fn winddirection(&self) -> Option<f64> {
        self.number("winddirection")
    }

    /// WMO weather interpretation code, accepted as integer or whole float
    pub fn weathercode(&self) -> Option<i32> {
        let value = self.0.get("weathercode")?;
        if let Some(code) = value.as_i64() {
            return i32::try_from(code).ok();
        }
        value
            .as_f64()
            .filter(|code| code.fract() == 0.0 && code.abs() <= f64::from(i32::MAX))
            .map(|code| code as i32)
    }

    /// Whether the reading was taken in daylight
    pub fn is_day(&self) -> Option<bool> {
        self.number("is_day").map(|flag| flag != 0.0)
    }

    /// Condition derived from the WMO code, if one was reported
    pub fn condition(&self) -> Option<WeatherCondition> {
        self.weathercode().map(WeatherCondition::from_wmo_code)
    }
}

/// Coarse weather condition derived from a WMO code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// Maps a WMO weather interpretation code to a condition
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 | 66 | 67 => Self::Sleet,
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_keeps_unknown_fields() {
        let snapshot: WeatherSnapshot = serde_json::from_value(json!({
            "temperature": 12.5,
            "windspeed": 9.0,
            "winddirection": 240.0,
            "weathercode": 3,
            "is_day": 1,
            "time": "2026-10-19T12:00",
            "interval": 900
        }))
        .unwrap();

        assert_eq!(snapshot.temperature(), Some(12.5));
        assert_eq!(snapshot.is_day(), Some(true));
        assert_eq!(snapshot.condition(), Some(WeatherCondition::Cloudy));
        assert_eq!(snapshot.get("interval"), Some(&json!(900)));
        assert_eq!(snapshot.get("time"), Some(&json!("2026-10-19T12:00")));
    }

    #[test]
    fn test_snapshot_with_missing_fields() {
        let snapshot: WeatherSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot.temperature(), None);
        assert_eq!(snapshot.condition(), None);
    }

    #[test]
    fn test_snapshot_reads_unexpected_types_leniently() {
        let snapshot: WeatherSnapshot = serde_json::from_value(json!({
            "temperature": 14.2,
            "windspeed": "calm",
            "weathercode": 3.0,
            "time": 1697712000
        }))
        .unwrap();

        assert_eq!(snapshot.temperature(), Some(14.2));
        assert_eq!(snapshot.windspeed(), None);
        assert_eq!(snapshot.weathercode(), Some(3));
        assert_eq!(snapshot.get("time"), Some(&json!(1697712000)));
    }

    #[test]
    fn test_fractional_weathercode_is_ignored() {
        let snapshot = WeatherSnapshot::new(
            json!({ "weathercode": 3.5 }).as_object().cloned().unwrap(),
        );
        assert_eq!(snapshot.condition(), None);
    }

    #[test]
    fn test_wmo_codes() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_wmo_code(57), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_wmo_code(82), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_wmo_code(86), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_wmo_code(1234), WeatherCondition::Unknown);
    }

    #[test]
    fn test_condition_description() {
        assert_eq!(WeatherCondition::HeavyRain.description(), "Heavy rain");
        assert_eq!(WeatherCondition::Unknown.description(), "Unknown");
    }
}
