//! Task persistence.
//!
//! Handlers only talk to [`TaskRepository`]; the process picks the
//! implementation at start-up.

use async_trait::async_trait;
use shared::{Task, UpdateTaskRequest};

mod memory;
mod redis;

pub use memory::MemoryRepository;
pub use self::redis::RedisRepository;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("stored task is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for tasks keyed by id.
///
/// `update` and `toggle` return `Ok(None)` when the id is unknown, and
/// `delete` reports whether anything was removed.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, StorageError>;

    async fn get(&self, id: &str) -> Result<Option<Task>, StorageError>;

    async fn insert(&self, task: Task) -> Result<Task, StorageError>;

    async fn update(
        &self,
        id: &str,
        update: UpdateTaskRequest,
    ) -> Result<Option<Task>, StorageError>;

    async fn toggle(&self, id: &str) -> Result<Option<Task>, StorageError>;

    async fn delete(&self, id: &str) -> Result<bool, StorageError>;
}
