/// Cross-site request forgery tokens
///
/// Each browser session holds one random token. Every state-changing form
/// echoes it back in a hidden field, and the server accepts the submission
/// only if the echoed value matches the session's copy.
///
/// # Example
///
/// ```
/// use taskcast_shared::auth::csrf::{generate_token, tokens_match};
///
/// let token = generate_token();
/// assert_eq!(token.len(), 64);
/// assert!(tokens_match(&token, &token.clone()));
/// assert!(!tokens_match(&token, ""));
/// ```

use rand::RngCore;

/// Random bytes per token (hex-encoded to twice this length)
pub const TOKEN_BYTES: usize = 32;

/// Generates a fresh hex-encoded token from the thread-local CSPRNG
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compares a stored token with a submitted one in constant time
///
/// Every byte is visited regardless of where the first difference is.
/// Empty tokens never match.
pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    if expected.is_empty() || expected.len() != submitted.len() {
        return false;
    }

    let diff = expected
        .bytes()
        .zip(submitted.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    diff == 0
}
