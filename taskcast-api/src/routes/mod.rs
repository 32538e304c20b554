/// Route handlers
///
/// Handlers are organized by resource:
///
/// - `tasks`: task list, create, edit, delete
/// - `auth`: register, login, logout
/// - `health`: health check endpoint

pub mod auth;
pub mod health;
pub mod tasks;
