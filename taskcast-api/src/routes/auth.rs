/// Authentication endpoints
///
/// - `GET,POST /register` - Register a new user
/// - `GET,POST /login` - Log in
/// - `GET /logout` - Log out
///
/// Login state lives in the signed session cookie (see
/// [`crate::session::SessionContext`]). Both POSTs require the session's
/// CSRF token.

use crate::{
    app::AppState,
    error::ApiResult,
    forms::{LoginForm, RegisterForm},
    session::{NoticeLevel, SessionContext},
    views,
};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use taskcast_shared::{
    auth::{credentials, password},
    models::user::CreateUser,
    store::StoreError,
};

const USERNAME_TAKEN: &str = "Username is already taken.";

/// Registration form
pub async fn register_form(
    State(state): State<AppState>,
    session: SessionContext,
) -> ApiResult<Html<String>> {
    let page = session.page(state.users.as_ref()).await?;
    Ok(views::register_page(&page, "", &[]))
}

/// Registers a new user
///
/// # Flow
///
/// 1. Validate the form (username 4-80 characters, password present)
/// 2. Reject taken usernames with a warning notice
/// 3. Hash the password and store the user
/// 4. Redirect to the login page
pub async fn register(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    session.verify_csrf(&form.csrf_token).await?;

    let creds = match form.validate() {
        Ok(creds) => creds,
        Err(errors) => {
            let page = session.page(state.users.as_ref()).await?;
            return Ok(views::register_page(&page, &form.username, &errors).into_response());
        }
    };

    if state.users.find_by_username(&creds.username).await?.is_some() {
        return username_taken(&state, &session, &creds.username).await;
    }

    let password_hash = password::hash_password_async(creds.password).await?;

    let user = match state
        .users
        .create(CreateUser {
            username: creds.username.clone(),
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent registration
        Err(StoreError::Conflict(_)) => return username_taken(&state, &session, &creds.username).await,
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = user.id, "User registered");

    session
        .notify(NoticeLevel::Success, "You have registered successfully! You can now log in.")
        .await?;
    Ok(Redirect::to("/login").into_response())
}

async fn username_taken(state: &AppState, session: &SessionContext, username: &str) -> ApiResult<Response> {
    tracing::debug!("Registration rejected, username taken");
    session.notify(NoticeLevel::Warning, USERNAME_TAKEN).await?;
    let page = session.page(state.users.as_ref()).await?;
    Ok(views::register_page(&page, username, &[]).into_response())
}

/// Login form
pub async fn login_form(
    State(state): State<AppState>,
    session: SessionContext,
) -> ApiResult<Html<String>> {
    let page = session.page(state.users.as_ref()).await?;
    Ok(views::login_page(&page, "", &[]))
}

/// Logs a user in
///
/// Unknown usernames and wrong passwords get the same notice, and neither
/// touches the session's user.
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    session.verify_csrf(&form.csrf_token).await?;

    let creds = match form.validate() {
        Ok(creds) => creds,
        Err(errors) => {
            let page = session.page(state.users.as_ref()).await?;
            return Ok(views::login_page(&page, &form.username, &errors).into_response());
        }
    };

    match credentials::authenticate(state.users.as_ref(), &creds.username, &creds.password).await? {
        Some(user) => {
            session.log_in(user.id).await?;
            session
                .notify(NoticeLevel::Success, "You have logged in successfully!")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        None => {
            session
                .notify(NoticeLevel::Danger, "Invalid username or password.")
                .await?;
            let page = session.page(state.users.as_ref()).await?;
            Ok(views::login_page(&page, &creds.username, &[]).into_response())
        }
    }
}

/// Logs the current user out; safe to call when not logged in
pub async fn logout(session: SessionContext) -> ApiResult<Redirect> {
    session.log_out().await?;
    session.notify(NoticeLevel::Info, "You have logged out.").await?;
    Ok(Redirect::to("/"))
}
