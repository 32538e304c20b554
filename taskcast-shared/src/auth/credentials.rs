/// Credential verification against the user store
///
/// [`authenticate`] answers a single question: do this username and password
/// identify a registered user? Unknown usernames and wrong passwords both
/// yield `Ok(None)` so callers cannot tell them apart.

use super::password::{verify_password_async, PasswordError};
use crate::{
    models::user::User,
    store::{StoreError, UserStore},
};

/// Errors that prevent a credential check from completing
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Looks up `username` and verifies `password` against its stored hash
///
/// # Returns
///
/// The user on success, `None` for an unknown username or wrong password
///
/// # Errors
///
/// Store failures, or a stored hash that cannot be parsed
pub async fn authenticate(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<Option<User>, CredentialsError> {
    let Some(user) = users.find_by_username(username).await? else {
        tracing::debug!("Login attempt for unknown username");
        return Ok(None);
    };

    let valid = verify_password_async(password.to_string(), user.password_hash.clone()).await?;
    if valid {
        Ok(Some(user))
    } else {
        tracing::debug!(user_id = user.id, "Login attempt with wrong password");
        Ok(None)
    }
}
