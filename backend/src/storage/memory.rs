use async_trait::async_trait;
use shared::{Task, UpdateTaskRequest};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{StorageError, TaskRepository};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tasks: RwLock<HashMap<String, Task>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let tasks = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            tasks: RwLock::new(tasks),
        }
    }
}

#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StorageError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn insert(&self, task: Task) -> Result<Task, StorageError> {
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn update(
        &self,
        id: &str,
        update: UpdateTaskRequest,
    ) -> Result<Option<Task>, StorageError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(id).map(|task| {
            task.apply(update);
            task.clone()
        }))
    }

    async fn toggle(&self, id: &str) -> Result<Option<Task>, StorageError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(id).map(|task| {
            task.toggle();
            task.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }
}
