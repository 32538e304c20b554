/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskcast_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::from_config(config).await?;
/// let app = build_router(state.clone());
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// state.close().await;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, StorageBackend},
    middleware::security::SecurityHeadersLayer,
    routes,
};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use taskcast_shared::{
    db::{migrations::run_migrations, pool},
    store::{memory::MemoryStore, postgres::PgStore, TaskStore, UserStore},
    weather::WeatherEnricher,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_sessions::{
    cookie::SameSite, Expiry, ExpiredDeletion, MemoryStore as SessionMemoryStore,
    SessionManagerLayer, SessionStore,
};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Level;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "taskcast_session";

/// How often expired sessions are purged from PostgreSQL
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Where session records live
///
/// Follows the storage backend: PostgreSQL deployments keep sessions
/// across restarts, the memory backend keeps them in process.
#[derive(Debug, Clone)]
pub enum SessionBackend {
    Memory(SessionMemoryStore),
    Postgres(PostgresStore),
}

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Task persistence
    pub tasks: Arc<dyn TaskStore>,

    /// User persistence
    pub users: Arc<dyn UserStore>,

    /// Weather lookups for the task list
    pub weather: Arc<WeatherEnricher>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session record storage
    pub sessions: SessionBackend,

    /// Connection pool, closed on shutdown (PostgreSQL only)
    pub pool: Option<PgPool>,
}

impl AppState {
    /// State with in-process sessions and no database pool
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        weather: WeatherEnricher,
        config: Config,
    ) -> Self {
        Self {
            tasks,
            users,
            weather: Arc::new(weather),
            config: Arc::new(config),
            sessions: SessionBackend::Memory(SessionMemoryStore::default()),
            pool: None,
        }
    }

    /// Connects the configured storage backend and builds the weather clients
    ///
    /// For PostgreSQL this opens the pool, applies pending migrations for
    /// both the application and the session table, and starts a background
    /// task that purges expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable, a migration fails,
    /// or the HTTP client cannot be built
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let weather = WeatherEnricher::new(&config.weather).context("Failed to build HTTP client")?;

        let state = match config.database.backend {
            StorageBackend::Postgres => {
                let url = config
                    .database
                    .url
                    .clone()
                    .context("DATABASE_URL environment variable is required")?;
                let pool = pool::create_pool(pool::DatabaseConfig {
                    url,
                    max_connections: config.database.max_connections,
                    ..Default::default()
                })
                .await
                .context("Failed to connect to database")?;
                run_migrations(&pool).await.context("Failed to run migrations")?;

                let session_store = PostgresStore::new(pool.clone());
                session_store
                    .migrate()
                    .await
                    .context("Failed to run session store migrations")?;
                spawn_session_cleanup(session_store.clone());

                let store = Arc::new(PgStore::new(pool.clone()));
                Self {
                    sessions: SessionBackend::Postgres(session_store),
                    pool: Some(pool),
                    ..Self::new(store.clone(), store, weather, config)
                }
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                Self::new(store.clone(), store, weather, config)
            }
        };

        Ok(state)
    }

    /// Releases the database pool, if any
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool::close_pool(pool.clone()).await;
        }
    }
}

fn spawn_session_cleanup(store: PostgresStore) {
    tokio::spawn(async move {
        if let Err(e) = store
            .continuously_delete_expired(SESSION_CLEANUP_INTERVAL)
            .await
        {
            tracing::error!("Expired session cleanup stopped: {}", e);
        }
    });
}

/// Cookie-signed session layer over `store`
fn with_sessions<S>(router: Router<AppState>, store: S, config: &Config) -> Router<AppState>
where
    S: SessionStore + Clone,
{
    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.api.production)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            config.session.inactivity_days,
        )))
        .with_signed(config.session.signing_key());

    router.layer(layer)
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// GET       /                   task list with weather
/// GET,POST  /new_task           create task
/// GET,POST  /edit_task/:id      edit task
/// POST      /delete_task/:id    delete task
/// GET,POST  /register           register
/// GET,POST  /login              log in
/// GET       /logout             log out
/// GET       /health             health check (JSON)
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Signed cookie sessions (tower-sessions), stored per [`SessionBackend`]
pub fn build_router(state: AppState) -> Router {
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route(
            "/new_task",
            get(routes::tasks::new_task_form).post(routes::tasks::create_task),
        )
        .route(
            "/edit_task/:id",
            get(routes::tasks::edit_task_form).post(routes::tasks::update_task),
        )
        .route("/delete_task/:id", post(routes::tasks::delete_task));

    let auth_routes = Router::new()
        .route(
            "/register",
            get(routes::auth::register_form).post(routes::auth::register),
        )
        .route("/login", get(routes::auth::login_form).post(routes::auth::login))
        .route("/logout", get(routes::auth::logout));

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let production = state.config.api.production;

    let routes = Router::new()
        .merge(task_routes)
        .merge(auth_routes)
        .merge(health_routes);

    let routes = match &state.sessions {
        SessionBackend::Memory(store) => with_sessions(routes, store.clone(), &state.config),
        SessionBackend::Postgres(store) => with_sessions(routes, store.clone(), &state.config),
    };

    routes
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> Config {
        Config::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "SECRET_KEY" => Some("app-test-secret-key-0123456789abcdef".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_memory_backend_keeps_sessions_in_process() {
        let state = AppState::from_config(memory_config()).await.unwrap();

        assert!(matches!(state.sessions, SessionBackend::Memory(_)));
        assert!(state.pool.is_none());

        // Nothing to release
        state.close().await;
    }
}
