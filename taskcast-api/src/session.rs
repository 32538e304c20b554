/// Per-request session context
///
/// [`SessionContext`] is an extractor that wraps the `tower-sessions`
/// session for the current browser. Handlers receive it as an argument and
/// use it to log users in and out and to queue one-shot notices for the next
/// rendered page.
///
/// # Session keys
///
/// - `user_id`: ID of the logged-in user, absent when anonymous
/// - `notices`: queued [`Notice`]s, drained on the next page render
/// - `csrf_token`: form token, created on first page render and kept until
///   the session expires

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use serde::{Deserialize, Serialize};
use taskcast_shared::{auth::csrf, store::UserStore};
use tower_sessions::Session;

/// Session key holding the authenticated user's ID
pub const USER_ID_KEY: &str = "user_id";

/// Session key holding pending notices
pub const NOTICES_KEY: &str = "notices";

/// Session key holding the form token
pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Form field carrying the echoed token
pub const CSRF_FIELD: &str = "csrf_token";

const CSRF_REJECTED: &str = "The CSRF token is missing or invalid.";

/// Severity of a notice, used as its CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Danger => "danger",
        }
    }
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What every page needs from the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContext {
    /// Username of the logged-in user
    pub username: Option<String>,

    /// Notices to display, oldest first
    pub notices: Vec<Notice>,

    /// Token to embed in every form on the page
    pub csrf_token: String,
}

/// Session handle for the current request
#[derive(Debug, Clone)]
pub struct SessionContext {
    session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self { session })
    }
}

impl SessionContext {
    /// ID of the logged-in user, if any
    pub async fn user_id(&self) -> ApiResult<Option<i64>> {
        Ok(self.session.get::<i64>(USER_ID_KEY).await?)
    }

    /// Marks `user_id` as logged in
    ///
    /// The session ID is cycled first so a pre-login session ID cannot be
    /// reused after authentication.
    pub async fn log_in(&self, user_id: i64) -> ApiResult<()> {
        self.session.cycle_id().await?;
        self.session.insert(USER_ID_KEY, user_id).await?;
        tracing::info!(user_id, "User logged in");
        Ok(())
    }

    /// Forgets the logged-in user; a no-op for anonymous sessions
    pub async fn log_out(&self) -> ApiResult<()> {
        if let Some(user_id) = self.session.remove::<i64>(USER_ID_KEY).await? {
            tracing::info!(user_id, "User logged out");
        }
        Ok(())
    }

    /// Queues a notice for the next rendered page
    pub async fn notify(&self, level: NoticeLevel, message: impl Into<String>) -> ApiResult<()> {
        let mut notices = self.pending_notices().await?;
        notices.push(Notice {
            level,
            message: message.into(),
        });
        self.session.insert(NOTICES_KEY, notices).await?;
        Ok(())
    }

    /// Removes and returns all queued notices
    pub async fn take_notices(&self) -> ApiResult<Vec<Notice>> {
        Ok(self
            .session
            .remove::<Vec<Notice>>(NOTICES_KEY)
            .await?
            .unwrap_or_default())
    }

    /// The session's form token, created on first use
    pub async fn csrf_token(&self) -> ApiResult<String> {
        if let Some(token) = self.session.get::<String>(CSRF_TOKEN_KEY).await? {
            return Ok(token);
        }

        let token = csrf::generate_token();
        self.session.insert(CSRF_TOKEN_KEY, &token).await?;
        Ok(token)
    }

    /// Checks a submitted form token against the session's
    ///
    /// # Errors
    ///
    /// `BadRequest` if the session has no token or the submitted one differs
    pub async fn verify_csrf(&self, submitted: &str) -> ApiResult<()> {
        let expected = self.session.get::<String>(CSRF_TOKEN_KEY).await?;

        match expected {
            Some(expected) if csrf::tokens_match(&expected, submitted) => Ok(()),
            _ => {
                tracing::warn!(submitted = !submitted.is_empty(), "Rejected form with bad CSRF token");
                Err(ApiError::BadRequest(CSRF_REJECTED.to_string()))
            }
        }
    }

    /// Builds the page context, consuming queued notices
    pub async fn page(&self, users: &dyn UserStore) -> ApiResult<PageContext> {
        let username = match self.user_id().await? {
            Some(id) => users.find_by_id(id).await?.map(|user| user.username),
            None => None,
        };

        Ok(PageContext {
            username,
            notices: self.take_notices().await?,
            csrf_token: self.csrf_token().await?,
        })
    }

    async fn pending_notices(&self) -> ApiResult<Vec<Notice>> {
        Ok(self
            .session
            .get::<Vec<Notice>>(NOTICES_KEY)
            .await?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskcast_shared::{
        models::user::CreateUser,
        store::memory::MemoryStore,
    };
    use tower_sessions::MemoryStore as SessionMemoryStore;

    fn context() -> SessionContext {
        let store = Arc::new(SessionMemoryStore::default());
        SessionContext {
            session: Session::new(None, store, None),
        }
    }

    #[test]
    fn test_notice_level_serializes_lowercase() {
        let json = serde_json::to_string(&NoticeLevel::Danger).unwrap();
        assert_eq!(json, "\"danger\"");
        assert_eq!(NoticeLevel::Warning.as_str(), "warning");
    }

    #[tokio::test]
    async fn test_notices_are_consumed_once() {
        let ctx = context();
        ctx.notify(NoticeLevel::Success, "first").await.unwrap();
        ctx.notify(NoticeLevel::Info, "second").await.unwrap();

        let notices = ctx.take_notices().await.unwrap();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "first");
        assert_eq!(notices[1].level, NoticeLevel::Info);

        assert!(ctx.take_notices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_log_in_and_out() {
        let ctx = context();
        assert_eq!(ctx.user_id().await.unwrap(), None);

        ctx.log_in(7).await.unwrap();
        assert_eq!(ctx.user_id().await.unwrap(), Some(7));

        ctx.log_out().await.unwrap();
        assert_eq!(ctx.user_id().await.unwrap(), None);

        // Logging out twice is harmless
        ctx.log_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_page_resolves_username() {
        let users = MemoryStore::new();
        let user = UserStore::create(
            &users,
            CreateUser {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();

        let ctx = context();
        let anonymous = ctx.page(&users).await.unwrap();
        assert_eq!(anonymous.username, None);
        assert!(anonymous.notices.is_empty());

        ctx.log_in(user.id).await.unwrap();
        ctx.notify(NoticeLevel::Success, "welcome").await.unwrap();

        let page = ctx.page(&users).await.unwrap();
        assert_eq!(page.username.as_deref(), Some("alice"));
        assert_eq!(page.notices.len(), 1);
    }

    #[tokio::test]
    async fn test_csrf_token_is_stable_per_session() {
        let ctx = context();
        let token = ctx.csrf_token().await.unwrap();
        assert_eq!(ctx.csrf_token().await.unwrap(), token);

        // Logging in and out keeps the token
        ctx.log_in(7).await.unwrap();
        ctx.log_out().await.unwrap();
        assert_eq!(ctx.csrf_token().await.unwrap(), token);

        let other = context();
        assert_ne!(other.csrf_token().await.unwrap(), token);
    }

    #[tokio::test]
    async fn test_verify_csrf() {
        let ctx = context();

        // No token issued yet
        let err = ctx.verify_csrf("anything").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let token = ctx.csrf_token().await.unwrap();
        assert!(ctx.verify_csrf(&token).await.is_ok());
        assert!(ctx.verify_csrf("").await.is_err());
        assert!(ctx.verify_csrf(&token[1..]).await.is_err());
        assert!(ctx.verify_csrf(&context().csrf_token().await.unwrap()).await.is_err());
    }
}
