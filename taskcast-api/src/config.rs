/// Configuration management for the web server
///
/// Configuration is read once at startup from environment variables (and a
/// `.env` file when present) and injected into [`crate::app::AppState`].
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SECRET_KEY`: Session cookie signing secret, at least 32 characters (required)
/// - `SESSION_INACTIVITY_DAYS`: Session lifetime without activity, 1 to 365 (default: 7)
/// - `GEOCODING_URL`: Geocoding service root (default: Nominatim)
/// - `FORECAST_URL`: Forecast service root (default: Open-Meteo)
/// - `WEATHER_USER_AGENT`: Client identifier sent to the geocoder
/// - `WEATHER_LANGUAGE`: Forecast response language (default: ru)
/// - `WEATHER_TIMEOUT_SECS`: Per-call timeout for weather lookups (default: 5)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskcast_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use sha2::{Digest, Sha512};
use std::{env, str::FromStr};
use taskcast_shared::weather::WeatherConfig;
use tower_sessions::cookie::Key;

/// Minimum accepted length of `SECRET_KEY`
pub const MIN_SECRET_LEN: usize = 32;

/// Accepted range for `SESSION_INACTIVITY_DAYS`
pub const INACTIVITY_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=365;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub api: ApiConfig,

    /// Storage configuration
    pub database: DatabaseConfig,

    /// Session cookie configuration
    pub session: SessionConfig,

    /// External weather services
    pub weather: WeatherConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (HTTPS deployment)
    pub production: bool,
}

/// Where tasks and users are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via sqlx
    Postgres,

    /// Process memory; contents are lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Selected backend
    pub backend: StorageBackend,

    /// PostgreSQL connection URL (always set when backend is Postgres)
    pub url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret used to sign session cookies
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Days of inactivity before a session expires
    pub inactivity_days: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("inactivity_days", &self.inactivity_days)
            .finish()
    }
}

impl SessionConfig {
    /// Cookie signing key derived from the secret
    ///
    /// SHA-512 stretches any secret to the 64 bytes the cookie key needs.
    pub fn signing_key(&self) -> Key {
        let digest = Sha512::digest(self.secret.as_bytes());
        Key::from(digest.as_slice())
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var_or("API_HOST", "0.0.0.0");
        let port = parse_var::<u16>("API_PORT", &var_or("API_PORT", "8080"))?;
        let production = parse_bool("PRODUCTION", &var_or("PRODUCTION", "false"))?;

        let backend: StorageBackend = var_or("STORAGE_BACKEND", "postgres").parse()?;
        let url = lookup("DATABASE_URL");
        if backend == StorageBackend::Postgres && url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required");
        }
        let max_connections =
            parse_var::<u32>("DATABASE_MAX_CONNECTIONS", &var_or("DATABASE_MAX_CONNECTIONS", "10"))?;

        let secret = lookup("SECRET_KEY")
            .ok_or_else(|| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("SECRET_KEY must be at least {} characters long", MIN_SECRET_LEN);
        }
        let inactivity_days =
            parse_var::<i64>("SESSION_INACTIVITY_DAYS", &var_or("SESSION_INACTIVITY_DAYS", "7"))?;
        if !INACTIVITY_DAYS_RANGE.contains(&inactivity_days) {
            anyhow::bail!(
                "SESSION_INACTIVITY_DAYS must be between {} and {}",
                INACTIVITY_DAYS_RANGE.start(),
                INACTIVITY_DAYS_RANGE.end()
            );
        }

        let defaults = WeatherConfig::default();
        let weather = WeatherConfig {
            geocoding_url: var_or("GEOCODING_URL", &defaults.geocoding_url),
            forecast_url: var_or("FORECAST_URL", &defaults.forecast_url),
            user_agent: var_or("WEATHER_USER_AGENT", &defaults.user_agent),
            language: var_or("WEATHER_LANGUAGE", &defaults.language),
            timeout_seconds: parse_var::<u64>(
                "WEATHER_TIMEOUT_SECS",
                &var_or("WEATHER_TIMEOUT_SECS", &defaults.timeout_seconds.to_string()),
            )?,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
            },
            database: DatabaseConfig {
                backend,
                url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                inactivity_days,
            },
            weather,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Invalid value for {}: {}", key, other),
    }
}
