/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`credentials`]: Username/password checks against a [`crate::store::UserStore`]
/// - [`csrf`]: Per-session form tokens
///
/// Plaintext passwords are never stored or logged, and never compared as
/// raw strings.

pub mod credentials;
pub mod csrf;
pub mod password;
