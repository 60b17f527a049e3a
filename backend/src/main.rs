use anyhow::Context;
use backend::{AppState, BackendConfig, MemoryRepository, RedisRepository, TaskRepository};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,backend=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = BackendConfig::from_env()?;

    let repo: Arc<dyn TaskRepository> = match &config.redis_url {
        Some(url) => {
            info!(redis_url = %url, "using redis storage");
            Arc::new(RedisRepository::open(url).context("failed to open redis client")?)
        }
        None => {
            info!("REDIS_URL not set, keeping tasks in memory");
            Arc::new(MemoryRepository::new())
        }
    };

    let app = backend::router(AppState::new(repo));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
