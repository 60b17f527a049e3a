// --------------------------------------------------
// Task CRUD handlers for /api/tasks
// --------------------------------------------------

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use shared::{Category, CreateTaskRequest, Task, TaskFilter, UpdateTaskRequest};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<TaskFilter, ApiError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => Category::All,
            Some(raw) => raw
                .parse()
                .map_err(|e: shared::ParseCategoryError| ApiError::BadRequest(e.to_string()))?,
        };
        Ok(TaskFilter::new(category, self.search.unwrap_or_default()))
    }
}

// GET /api/tasks?category=&search=
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let today = (state.today)();
    let tasks = filter.apply(state.repo.list().await?, today);
    debug!(category = %filter.category, search = ?filter.search_term(), count = tasks.len(), "listed tasks");
    Ok(Json(tasks))
}

// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    match state.repo.get(&id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound(id)),
    }
}

// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let task = state.repo.insert(Task::new(payload)).await?;
    debug!(id = %task.id, "created task");
    Ok((StatusCode::CREATED, Json(task)))
}

// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;
    match state.repo.update(&id, payload).await? {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound(id)),
    }
}

// PATCH /api/tasks/:id/toggle
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    match state.repo.toggle(&id).await? {
        Some(task) => {
            debug!(id = %task.id, completed = task.completed, "toggled task");
            Ok(Json(task))
        }
        None => Err(ApiError::NotFound(id)),
    }
}

// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete(&id).await? {
        debug!(%id, "deleted task");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(id))
    }
}
