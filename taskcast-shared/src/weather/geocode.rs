//! Forward geocoding: convert a free-text place name to coordinates.
//! Uses a Nominatim-compatible `/search` endpoint.

use super::types::Coordinates;
use reqwest::{header::USER_AGENT, Client};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Client for the geocoding search API
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl Geocoder {
    /// `base_url` is the service root, e.g. `https://nominatim.openstreetmap.org`.
    /// Nominatim's usage policy requires an identifying `user_agent`.
    pub fn new(client: Client, base_url: &str, user_agent: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Resolves `location` to the coordinates of the best match.
    ///
    /// Returns `None` when there is no match or the lookup fails for any
    /// reason; failures are logged, never returned. No retry.
    pub async fn resolve(&self, location: &str) -> Option<Coordinates> {
        let url = format!("{}/search", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(location, "Geocoding request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(location, status = %response.status(), "Geocoding returned error status");
            return None;
        }

        let results: Vec<SearchResult> = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(location, "Geocoding response parse error: {}", e);
                return None;
            }
        };

        let Some(first) = results.into_iter().next() else {
            tracing::info!(location, "No coordinates found for location");
            return None;
        };

        match (first.lat.trim().parse::<f64>(), first.lon.trim().parse::<f64>()) {
            (Ok(latitude), Ok(longitude)) => {
                tracing::debug!(location, latitude, longitude, "Geocoded location");
                Some(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => {
                tracing::warn!(location, lat = %first.lat, lon = %first.lon, "Geocoding returned unparseable coordinates");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AGENT: &str = "Taskcast-test/0.1";

    fn geocoder(server: &MockServer) -> Geocoder {
        let client = Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        Geocoder::new(client, &server.uri(), AGENT)
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Paris"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .and(header("user-agent", AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris, France" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let coords = geocoder(&server).resolve("Paris").await.unwrap();
        assert!((coords.latitude - 48.8588897).abs() < 1e-9);
        assert!((coords.longitude - 2.3200410).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_resolve_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve("Atlantis").await, None);
    }

    #[tokio::test]
    async fn test_resolve_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve("Paris").await, None);
    }

    #[tokio::test]
    async fn test_resolve_malformed_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve("Paris").await, None);
    }

    #[tokio::test]
    async fn test_resolve_unparseable_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "north", "lon": "2.32" }
            ])))
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve("Paris").await, None);
    }

    #[tokio::test]
    async fn test_resolve_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "lat": "1", "lon": "2" }]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve("Paris").await, None);
    }

    #[tokio::test]
    async fn test_resolve_unreachable_host() {
        let client = Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let geocoder = Geocoder::new(client, "http://127.0.0.1:1", AGENT);

        assert_eq!(geocoder.resolve("Paris").await, None);
    }
}
