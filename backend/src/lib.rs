//! REST service for tasks.
//!
//! | Method | Path                    |
//! |--------|-------------------------|
//! | GET    | /api/tasks              |
//! | POST   | /api/tasks              |
//! | GET    | /api/tasks/:id          |
//! | PUT    | /api/tasks/:id          |
//! | DELETE | /api/tasks/:id          |
//! | PATCH  | /api/tasks/:id/toggle   |

use axum::{
    routing::{get, patch},
    Router,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod storage;

pub use config::BackendConfig;
pub use error::ApiError;
pub use storage::{MemoryRepository, RedisRepository, StorageError, TaskRepository};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TaskRepository>,
    /// Reference date for the `today` and `upcoming` categories.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self {
            repo,
            today: local_today,
        }
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", get(routes::list_tasks).post(routes::create_task))
        .route(
            "/api/tasks/:id",
            get(routes::get_task)
                .put(routes::update_task)
                .delete(routes::delete_task),
        )
        .route("/api/tasks/:id/toggle", patch(routes::toggle_task))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
