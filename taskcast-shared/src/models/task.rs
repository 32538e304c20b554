/// Task model and database operations
///
/// Tasks are global to-do items. A task may carry a free-text location, which
/// the weather module resolves to current conditions when the list is viewed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(80) NOT NULL,
///     description TEXT,
///     due_date DATE,
///     location VARCHAR(100),
///     completed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```
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
/// let task = Task::create(&pool, CreateTask {
///     title: "Pick up tickets".to_string(),
///     description: Some("Box office closes at 6pm".to_string()),
///     due_date: None,
///     location: Some("London".to_string()),
/// }).await?;
///
/// assert!(!task.completed);
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Maximum title length in characters
pub const TITLE_MAX_LEN: u64 = 80;

/// Maximum location length in characters
pub const LOCATION_MAX_LEN: u64 = 100;

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-assigned identifier
    pub id: i64,

    /// Short title (at most 80 characters)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Optional place name used for weather lookups (at most 100 characters)
    pub location: Option<String>,

    /// Whether the task has been marked done
    pub completed: bool,
}

impl Task {
    /// Returns the location if it is set and non-empty
    ///
    /// Only these locations take part in weather lookups.
    pub fn weather_location(&self) -> Option<&str> {
        self.location.as_deref().filter(|loc| !loc.is_empty())
    }
}

/// Input for creating a new task
///
/// New tasks always start with `completed = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub location: Option<String>,
}

/// Input for updating an existing task
///
/// Every field is replaced; this mirrors a full form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub completed: bool,
}

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including column length violations)
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO task (title, description, due_date, location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, due_date, location, completed
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.location)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, location, completed
            FROM task
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task in insertion order
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, location, completed
            FROM task
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Replaces the fields of an existing task
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task has this ID
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE task
            SET title = $2, description = $3, due_date = $4, location = $5, completed = $6
            WHERE id = $1
            RETURNING id, title, description, due_date, location, completed
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.location)
        .bind(data.completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_location(location: Option<&str>) -> Task {
        Task {
            id: 1,
            title: "Walk".to_string(),
            description: None,
            due_date: None,
            location: location.map(str::to_string),
            completed: false,
        }
    }

    #[test]
    fn test_weather_location_present() {
        let task = task_with_location(Some("Paris"));
        assert_eq!(task.weather_location(), Some("Paris"));
    }

    #[test]
    fn test_weather_location_empty_or_missing() {
        assert_eq!(task_with_location(Some("")).weather_location(), None);
        assert_eq!(task_with_location(None).weather_location(), None);
    }

    #[test]
    fn test_weather_location_is_not_normalized() {
        // Lookups are keyed by the exact stored string
        let task = task_with_location(Some(" paris "));
        assert_eq!(task.weather_location(), Some(" paris "));
    }
}
