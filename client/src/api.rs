//! Typed client for the `/api/tasks` REST endpoints.
//!
//! Every call is exactly one HTTP round trip. Nothing is retried; a failed
//! request surfaces immediately as a [`ClientError`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{Category, CreateTaskRequest, Task, UpdateTaskRequest};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{ClientConfig, ClientError};

/// The remote operations the store depends on.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `None` (or `Category::All`) and an empty search are not sent.
    async fn list(
        &self,
        category: Option<Category>,
        search: Option<&str>,
    ) -> Result<Vec<Task>, ClientError>;

    async fn get(&self, id: &str) -> Result<Task, ClientError>;

    async fn create(&self, request: &CreateTaskRequest) -> Result<Task, ClientError>;

    async fn update(&self, id: &str, request: &UpdateTaskRequest) -> Result<Task, ClientError>;

    async fn toggle(&self, id: &str) -> Result<Task, ClientError>;

    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base: Url,
}

impl TaskClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&ClientConfig::from_env()?)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was ruled out in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn task_url(&self, id: &str) -> Url {
        self.endpoint(&["api", "tasks", id])
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        action: &'static str,
    ) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|e| {
            warn!(action, error = %e, "task service unreachable");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(action, status = status.as_u16(), "request succeeded");
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(action, status = status.as_u16(), error = %e, "unreadable error body");
                String::new()
            }
        };
        let message = remote_message(status, &body);
        warn!(action, status = status.as_u16(), %message, "request rejected");
        Err(ClientError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &'static str,
    ) -> Result<T, ClientError> {
        let response = self.execute(request, action).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(action, error = %e, "undecodable response body");
            ClientError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait]
impl TaskApi for TaskClient {
    async fn list(
        &self,
        category: Option<Category>,
        search: Option<&str>,
    ) -> Result<Vec<Task>, ClientError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(category) = category.and_then(Category::query_value) {
            query.push(("category", category));
        }
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search));
        }

        let mut request = self.http.get(self.endpoint(&["api", "tasks"]));
        if !query.is_empty() {
            request = request.query(&query);
        }
        self.fetch(request, "list").await
    }

    async fn get(&self, id: &str) -> Result<Task, ClientError> {
        self.fetch(self.http.get(self.task_url(id)), "get").await
    }

    async fn create(&self, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        let builder = self.http.post(self.endpoint(&["api", "tasks"])).json(request);
        self.fetch(builder, "create").await
    }

    async fn update(&self, id: &str, request: &UpdateTaskRequest) -> Result<Task, ClientError> {
        let builder = self.http.put(self.task_url(id)).json(request);
        self.fetch(builder, "update").await
    }

    async fn toggle(&self, id: &str) -> Result<Task, ClientError> {
        let url = self.endpoint(&["api", "tasks", id, "toggle"]);
        self.fetch(self.http.patch(url), "toggle").await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.http.delete(self.task_url(id)), "delete")
            .await
            .map(|_| ())
    }
}

/// `{"error": ...}` if the service sent one, else the raw body, else the
/// status reason.
fn remote_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> TaskClient {
        TaskClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn endpoints_join_onto_base_path() {
        assert_eq!(
            client("http://localhost:5107").task_url("abc").as_str(),
            "http://localhost:5107/api/tasks/abc"
        );
        assert_eq!(
            client("http://host/prefix/").endpoint(&["api", "tasks"]).as_str(),
            "http://host/prefix/api/tasks"
        );
    }

    #[test]
    fn ids_are_escaped_as_one_segment() {
        assert_eq!(
            client("http://localhost:5107").task_url("a/b").as_str(),
            "http://localhost:5107/api/tasks/a%2Fb"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            TaskClient::new(&ClientConfig::new("not a url")),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            TaskClient::new(&ClientConfig::new("mailto:someone@example.com")),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn remote_message_fallbacks() {
        assert_eq!(
            remote_message(StatusCode::NOT_FOUND, r#"{"error":"task 1 not found"}"#),
            "task 1 not found"
        );
        assert_eq!(
            remote_message(StatusCode::UNPROCESSABLE_ENTITY, "missing field `tag`\n"),
            "missing field `tag`"
        );
        assert_eq!(
            remote_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
    }
}
