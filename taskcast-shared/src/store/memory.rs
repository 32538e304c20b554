/// In-memory store
///
/// Keeps tasks and users in ordered maps behind a single `RwLock`. IDs are
/// assigned sequentially from 1, like a `BIGSERIAL` column. Data lives only as
/// long as the process.

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    tasks: BTreeMap<i64, Task>,
    users: BTreeMap<i64, User>,
    last_task_id: i64,
    last_user_id: i64,
}

/// Process-local store implementing both [`TaskStore`] and [`UserStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Task> {
        let tables = self.tables.read().await;
        tables
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::task_not_found(id))
    }

    async fn create(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.last_task_id += 1;

        let task = Task {
            id: tables.last_task_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            location: data.location,
            completed: false,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update(&self, id: i64, data: UpdateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::task_not_found(id))?;

        task.title = data.title;
        task.description = data.description;
        task.due_date = data.due_date;
        task.location = data.location;
        task.completed = data.completed;

        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::task_not_found(id))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|user| user.username == data.username) {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                data.username
            )));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: data.username,
            password_hash: data.password_hash,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_task(title: &str, location: Option<&str>) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            due_date: None,
            location: location.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_roundtrip() {
        let store = MemoryStore::new();
        let created = TaskStore::create(
            &store,
            CreateTask {
                title: "Buy milk".to_string(),
                description: Some("2 litres".to_string()),
                due_date: NaiveDate::from_ymd_opt(2026, 11, 1),
                location: Some("Paris".to_string()),
            },
        )
        .await
        .unwrap();

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.location.as_deref(), Some("Paris"));
        assert!(!fetched.completed);
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_listed_in_order() {
        let store = MemoryStore::new();
        let first = TaskStore::create(&store, new_task("first", None)).await.unwrap();
        let second = TaskStore::create(&store, new_task("second", None)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let titles: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = TaskStore::create(&store, new_task("first", None)).await.unwrap();
        TaskStore::delete(&store, first.id).await.unwrap();

        let second = TaskStore::create(&store, new_task("second", None)).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let store = MemoryStore::new();
        let task = TaskStore::create(&store, new_task("old", Some("Paris"))).await.unwrap();

        let updated = store
            .update(
                task.id,
                UpdateTask {
                    title: "new".to_string(),
                    description: Some("details".to_string()),
                    due_date: None,
                    location: None,
                    completed: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "new");
        assert_eq!(updated.location, None);
        assert!(updated.completed);
        assert_eq!(store.get_by_id(task.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.get_by_id(99).await,
            Err(StoreError::NotFound { id: 99, .. })
        ));
        assert!(matches!(
            store
                .update(
                    99,
                    UpdateTask {
                        title: "x".to_string(),
                        description: None,
                        due_date: None,
                        location: None,
                        completed: false,
                    }
                )
                .await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found_every_time() {
        let store = MemoryStore::new();

        for _ in 0..3 {
            let result = TaskStore::delete(&store, 5).await;
            assert!(matches!(result, Err(StoreError::NotFound { id: 5, .. })));
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let data = CreateUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
        };

        UserStore::create(&store, data.clone()).await.unwrap();
        let second = UserStore::create(&store, data).await;

        assert!(matches!(second, Err(StoreError::Conflict(_))));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_user_by_username_and_id() {
        let store = MemoryStore::new();
        let user = UserStore::create(
            &store,
            CreateUser {
                username: "bob".to_string(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(store.find_by_username("bob").await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_username("Bob").await.unwrap(), None);
        assert_eq!(UserStore::find_by_id(&store, user.id).await.unwrap(), Some(user));
    }
}
