/// Error handling for the web server
///
/// Handlers return `Result<T, ApiError>`. Each error becomes an HTML error
/// page with the matching status code. Form validation failures are not
/// errors here: handlers re-render the form with field messages instead.
///
/// # Example
///
/// ```
/// use axum::http::StatusCode;
/// use taskcast_api::error::ApiError;
///
/// let err = ApiError::NotFound("Task 7 not found".to_string());
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// ```

use crate::views;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskcast_shared::{
    auth::{credentials::CredentialsError, password::PasswordError},
    store::StoreError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified error type for route handlers
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), such as a form without a valid CSRF token
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        (status, views::error_page(status, &message)).into_response()
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::NotFound(format!("{} {} not found", entity, id)),
            // Handlers pre-check uniqueness, so a conflict that gets here lost a race
            StoreError::Conflict(msg) => ApiError::InternalError(format!("Unexpected conflict: {}", msg)),
            StoreError::Database(db_err) => ApiError::InternalError(format!("Database error: {}", db_err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<CredentialsError> for ApiError {
    fn from(err: CredentialsError) -> Self {
        match err {
            CredentialsError::Store(e) => e.into(),
            CredentialsError::Password(e) => e.into(),
        }
    }
}

/// Convert session store errors to API errors
impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::InternalError(format!("Session error: {}", err))
    }
}
