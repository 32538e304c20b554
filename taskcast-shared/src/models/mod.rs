/// Database models for Taskcast
///
/// This module contains the persisted entities and their CRUD operations
/// against PostgreSQL.
///
/// # Models
///
/// - `task`: To-do items with optional due date and location
/// - `user`: Registered accounts
///
/// # Example
///
/// ```no_run
/// use taskcast_shared::models::task::{CreateTask, Task};
/// use taskcast_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(
///     &pool,
///     CreateTask {
///         title: "Buy milk".to_string(),
///         description: None,
///         due_date: None,
///         location: Some("Paris".to_string()),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
