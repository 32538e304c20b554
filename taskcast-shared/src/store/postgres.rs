/// PostgreSQL-backed store
///
/// Thin adapter from the store traits to the model CRUD functions in
/// [`crate::models`]. Unique violations on user insert become
/// [`StoreError::Conflict`].

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::{
    db::pool,
    models::{
        task::{CreateTask, Task, UpdateTask},
        user::{CreateUser, User},
    },
};
use async_trait::async_trait;
use sqlx::PgPool;

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        Ok(Task::list_all(&self.pool).await?)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Task> {
        Task::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::task_not_found(id))
    }

    async fn create(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn update(&self, id: i64, data: UpdateTask) -> StoreResult<Task> {
        Task::update(&self.pool, id, data)
            .await?
            .ok_or_else(|| StoreError::task_not_found(id))
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        if Task::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::task_not_found(id))
        }
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let username = data.username.clone();

        User::create(&self.pool, data).await.map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(format!("username {} already exists", username))
            }
            other => StoreError::Database(other),
        })
    }
}
