//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app wired to the in-memory store
//! - A mock server standing in for the geocoding and forecast services
//! - A cookie-carrying client so requests share one browser session
//! - Automatic CSRF tokens on form posts, as a browser submitting the
//!   rendered forms would send them
//! - Weather mock helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use taskcast_api::app::{build_router, AppState};
use taskcast_api::config::Config;
use taskcast_shared::store::memory::MemoryStore;
use taskcast_shared::weather::WeatherEnricher;
use tower::Service as _;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "integration-test-secret-key-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub weather: MockServer,
    cookie: Option<String>,
    csrf_token: Option<String>,
}

/// Status, headers and body of a finished request
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestContext {
    /// Creates a new test context with an empty store and a fresh mock server
    pub async fn new() -> Self {
        let weather = MockServer::start().await;

        let vars: HashMap<&str, String> = HashMap::from([
            ("STORAGE_BACKEND", "memory".to_string()),
            ("SECRET_KEY", SECRET.to_string()),
            ("GEOCODING_URL", weather.uri()),
            ("FORECAST_URL", weather.uri()),
            ("WEATHER_TIMEOUT_SECS", "1".to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let store = Arc::new(MemoryStore::new());
        let enricher = WeatherEnricher::new(&config.weather).unwrap();
        let state = AppState::new(store.clone(), store.clone(), enricher, config);

        Self {
            app: build_router(state),
            store,
            weather,
            cookie: None,
            csrf_token: None,
        }
    }

    /// Sends a request, carrying the session cookie across calls
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().call(request).await.unwrap();
        self.remember_cookie(&response);

        let status = response.status();
        let headers = response.headers().clone();
        let location = headers
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if let Some(token) = page_csrf_token(&body) {
            self.csrf_token = Some(token);
        }

        TestResponse {
            status,
            location,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Posts a form with the session's CSRF token added
    ///
    /// A browser without a session first loads the login page to get one.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        if self.csrf_token.is_none() {
            self.get("/login").await;
        }
        let token = self.csrf_token.clone().unwrap();

        let mut fields = fields.to_vec();
        fields.push(("csrf_token", &token));
        self.post_form_without_csrf(uri, &fields).await
    }

    /// Posts exactly `fields`, with no token added
    pub async fn post_form_without_csrf(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.send(request).await
    }

    /// Registers and logs in, leaving the session authenticated
    pub async fn sign_in(&mut self, username: &str, password: &str) {
        let registered = self
            .post_form("/register", &[("username", username), ("password", password)])
            .await;
        assert_eq!(registered.status, StatusCode::SEE_OTHER);

        let logged_in = self
            .post_form("/login", &[("username", username), ("password", password)])
            .await;
        assert_eq!(logged_in.status, StatusCode::SEE_OTHER);
    }

    /// Token from the most recently rendered page of this session
    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token.clone()
    }

    /// Drops the session cookie, as a fresh browser would
    pub fn forget_cookie(&mut self) {
        self.cookie = None;
        self.csrf_token = None;
    }

    fn remember_cookie(&mut self, response: &Response<Body>) {
        let Some(set_cookie) = response.headers().get(header::SET_COOKIE) else {
            return;
        };
        let set_cookie = set_cookie.to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let expired = set_cookie.contains("Max-Age=0") || pair.ends_with('=');

        if expired {
            self.cookie = None;
            self.csrf_token = None;
        } else {
            self.cookie = Some(pair.to_string());
        }
    }
}

/// Encodes fields as `application/x-www-form-urlencoded`
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).unwrap()
}

/// Token from the page's `csrf-token` meta tag, if it has one
pub fn page_csrf_token(body: &str) -> Option<String> {
    const MARKER: &str = "<meta name=\"csrf-token\" content=\"";
    let start = body.find(MARKER)? + MARKER.len();
    let len = body[start..].find('"')?;
    Some(body[start..start + len].to_string()).filter(|token| !token.is_empty())
}

/// Mounts a geocoder answer for `location`, expected `times` times
pub async fn mock_geocode(server: &MockServer, location: &str, lat: &str, lon: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", location))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "lat": lat, "lon": lon }])),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Mounts a forecast answer for `lat`, expected `times` times
pub async fn mock_forecast(server: &MockServer, lat: &str, temperature: f64, times: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", lat))
        .and(query_param("current_weather", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_weather": {
                "temperature": temperature,
                "windspeed": 9.0,
                "winddirection": 180,
                "weathercode": 3,
                "is_day": 1,
                "time": "2026-10-19T12:00"
            }
        })))
        .expect(times)
        .mount(server)
        .await;
}
