//! Client-side data layer for the task board.
//!
//! [`TaskClient`] speaks the REST API; [`TaskStore`] sits on top of any
//! [`TaskApi`] and keeps one coherent, subscribable view of the task list
//! for the active filter.

pub mod api;
pub mod config;
pub mod error;
pub mod store;
pub mod views;

pub use api::{TaskApi, TaskClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use store::{StoreSnapshot, TaskStore};
pub use views::ViewMode;

pub use shared::{Category, CreateTaskRequest, Tag, Task, TaskFilter, UpdateTaskRequest};
