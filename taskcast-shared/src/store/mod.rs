/// Persistence boundary for tasks and users
///
/// Handlers talk to storage only through the [`TaskStore`] and [`UserStore`]
/// traits. Two implementations are provided:
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx, delegating to the model CRUD functions
/// - [`memory::MemoryStore`]: in-process maps, for tests and local demos
///
/// Missing rows on `get_by_id`, `update`, and `delete` are reported as
/// [`StoreError::NotFound`] so callers can answer with a 404.
///
/// # Example
///
/// ```
/// use taskcast_shared::models::task::CreateTask;
/// use taskcast_shared::store::{memory::MemoryStore, TaskStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let task = store
///     .create(CreateTask {
///         title: "Buy milk".to_string(),
///         description: None,
///         due_date: None,
///         location: Some("Paris".to_string()),
///     })
///     .await?;
///
/// assert_eq!(store.get_by_id(task.id).await?, task);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::models::{
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};
use async_trait::async_trait;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row with the requested ID
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Uniqueness constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Shorthand for a missing task
    pub fn task_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "Task", id }
    }
}

/// Persistence operations for tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists all tasks ordered by ID
    async fn list_all(&self) -> StoreResult<Vec<Task>>;

    /// Fetches one task, or `NotFound`
    async fn get_by_id(&self, id: i64) -> StoreResult<Task>;

    /// Inserts a task and returns it with its assigned ID
    async fn create(&self, data: CreateTask) -> StoreResult<Task>;

    /// Replaces a task's fields, or `NotFound`
    async fn update(&self, id: i64, data: UpdateTask) -> StoreResult<Task>;

    /// Removes a task, or `NotFound`
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Verifies the backing storage is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

/// Persistence operations for users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by exact username
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Looks up a user by ID
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Inserts a user
    ///
    /// Fails with `Conflict` if the username already exists. Callers should
    /// check with `find_by_username` first to give a friendly message.
    async fn create(&self, data: CreateUser) -> StoreResult<User>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::task_not_found(42);
        assert_eq!(err.to_string(), "Task 42 not found");
    }

    #[test]
    fn test_conflict_display() {
        let err = StoreError::Conflict("username alice already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: username alice already exists");
    }
}
