use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use shared::{Task, UpdateTaskRequest};
use tracing::warn;

use super::{StorageError, TaskRepository};

const KEY_PREFIX: &str = "task:";

/// One JSON document per task under `task:{id}`.
///
/// Updates are read-modify-write without a transaction; concurrent writers
/// to the same task resolve last-write-wins.
pub struct RedisRepository {
    client: Client,
}

impl RedisRepository {
    pub fn open(redis_url: &str) -> Result<Self, StorageError> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    async fn connection(&self) -> Result<::redis::aio::Connection, StorageError> {
        Ok(self.client.get_async_connection().await?)
    }

    async fn modify(
        &self,
        id: &str,
        change: impl FnOnce(&mut Task) + Send,
    ) -> Result<Option<Task>, StorageError> {
        let mut conn = self.connection().await?;
        let key = Self::key(id);

        let task_json: Option<String> = conn.get(&key).await?;
        let Some(json) = task_json else {
            return Ok(None);
        };

        let mut task: Task = serde_json::from_str(&json)?;
        change(&mut task);

        let updated_json = serde_json::to_string(&task)?;
        conn.set::<_, _, ()>(&key, updated_json).await?;
        Ok(Some(task))
    }
}

#[async_trait]
impl TaskRepository for RedisRepository {
    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = conn.keys(format!("{KEY_PREFIX}*")).await?;

        let mut tasks = Vec::with_capacity(keys.len());
        for key in keys {
            // the key may vanish between KEYS and GET
            let task_json: Option<String> = conn.get(&key).await?;
            let Some(json) = task_json else { continue };
            match serde_json::from_str::<Task>(&json) {
                Ok(task) => tasks.push(task),
                Err(e) => warn!(%key, error = %e, "skipping unreadable task"),
            }
        }

        Ok(tasks)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StorageError> {
        let mut conn = self.connection().await?;
        let task_json: Option<String> = conn.get(Self::key(id)).await?;

        match task_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, task: Task) -> Result<Task, StorageError> {
        let task_json = serde_json::to_string(&task)?;
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(Self::key(&task.id), task_json).await?;
        Ok(task)
    }

    async fn update(
        &self,
        id: &str,
        update: UpdateTaskRequest,
    ) -> Result<Option<Task>, StorageError> {
        self.modify(id, move |task| task.apply(update)).await
    }

    async fn toggle(&self, id: &str) -> Result<Option<Task>, StorageError> {
        self.modify(id, Task::toggle).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut conn = self.connection().await?;
        let deleted: usize = conn.del(Self::key(id)).await?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(RedisRepository::key("abc"), "task:abc");
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(RedisRepository::open("not a url").is_err());
    }
}
