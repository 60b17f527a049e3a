use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use backend::{AppState, MemoryRepository};
use chrono::NaiveDate;
use serde_json::{json, Value};
use shared::Task;
use std::sync::Arc;
use tower::ServiceExt;

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryRepository::new())).with_today(fixed_today);
    backend::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create(app: &Router, title: &str, date: &str, time: &str) -> Task {
    let (status, body) = send(
        app,
        "POST",
        "/api/tasks",
        Some(json!({
            "title": title,
            "description": "",
            "tag": "Work",
            "date": date,
            "time": time
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(body).unwrap()
}

async fn list(app: &Router, uri: &str) -> Vec<Task> {
    let (status, body) = send(app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn create_assigns_id_and_starts_incomplete() {
    let app = app();
    let task = create(&app, "Write report", "2024-06-01", "09:00").await;

    assert!(!task.id.is_empty());
    assert!(!task.completed);
    assert_eq!(task.title, "Write report");

    let tasks = list(&app, "/api/tasks").await;
    assert_eq!(tasks, vec![task]);
}

#[tokio::test]
async fn example_scenario_create_toggle_list_completed() {
    let app = app();
    let task = create(&app, "Write report", "2024-06-01", "09:00").await;

    let (status, body) = send(&app, "PATCH", &format!("/api/tasks/{}/toggle", task.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], json!(true));

    let completed = list(&app, "/api/tasks?category=completed").await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, task.id);
}

#[tokio::test]
async fn toggle_twice_restores_completion() {
    let app = app();
    let task = create(&app, "Read", "2024-06-02", "18:00").await;
    let uri = format!("/api/tasks/{}/toggle", task.id);

    send(&app, "PATCH", &uri, None).await;
    let (_, body) = send(&app, "PATCH", &uri, None).await;
    assert_eq!(body["completed"], json!(false));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app();
    let task = create(&app, "Temp", "2024-06-02", "10:00").await;
    let uri = format!("/api/tasks/{}", task.id);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!(format!("task {} not found", task.id)));

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_only_touches_given_fields() {
    let app = app();
    let task = create(&app, "Old", "2024-06-03", "14:15").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", task.id),
        Some(json!({ "title": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let updated: Task = serde_json::from_value(body).unwrap();
    assert_eq!(updated.title, "X");
    assert_eq!(updated.date, task.date);
    assert_eq!(updated.time, task.time);
    assert_eq!(updated.tag, task.tag);
    assert_eq!(updated.completed, task.completed);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = app();
    for (method, uri, body) in [
        ("GET", "/api/tasks/nope", None),
        ("PUT", "/api/tasks/nope", Some(json!({ "completed": true }))),
        ("PATCH", "/api/tasks/nope/toggle", None),
        ("DELETE", "/api/tasks/nope", None),
    ] {
        let (status, _) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
    }
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({
            "title": "  ",
            "tag": "Study",
            "date": "2024-06-01",
            "time": "09:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("title must not be empty"));
    assert!(list(&app, "/api/tasks").await.is_empty());
}

#[tokio::test]
async fn category_and_search_filters() {
    let app = app();
    let today = create(&app, "Standup", "2024-06-01", "09:30").await;
    let later = create(&app, "Dentist", "2024-06-05", "11:00").await;
    let past = create(&app, "Old chores", "2024-05-20", "08:00").await;
    send(&app, "PATCH", &format!("/api/tasks/{}/toggle", past.id), None).await;

    let ids = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.id).collect::<Vec<_>>();

    assert_eq!(ids(list(&app, "/api/tasks?category=today").await), [today.id.clone()]);
    assert_eq!(ids(list(&app, "/api/tasks?category=upcoming").await), [later.id.clone()]);
    assert_eq!(ids(list(&app, "/api/tasks?category=completed").await), [past.id.clone()]);
    assert_eq!(
        ids(list(&app, "/api/tasks").await),
        [past.id.clone(), today.id.clone(), later.id.clone()]
    );
    assert_eq!(ids(list(&app, "/api/tasks?search=DENT").await), [later.id]);
    assert!(list(&app, "/api/tasks?category=today&search=dentist").await.is_empty());
}

#[tokio::test]
async fn unknown_category_is_a_bad_request() {
    let (status, body) = send(&app(), "GET", "/api/tasks?category=someday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("unknown category: someday"));
}

#[tokio::test]
async fn undecodable_bodies_get_a_json_error() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "x", "date": "2024-06-01", "time": "09:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("tag"), "{message}");

    let task = create(&app, "Write report", "2024-06-01", "09:00").await;
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", task.id),
        Some(json!({ "time": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string(), "{body}");
}
