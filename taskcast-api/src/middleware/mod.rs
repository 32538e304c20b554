/// Middleware for the web server
///
/// - `security`: security response headers

pub mod security;
