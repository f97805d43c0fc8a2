mod advice;
mod config;
mod errors;
mod llm_client;
mod models;
mod profile;
mod relay;
mod requests;
mod routes;
mod state;
mod storage;
mod templates;
mod versions;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackendKind};
use crate::llm_client::LlmClient;
use crate::relay::FormspreeRelay;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileBackend, KvBackend, MemoryBackend, RedisBackend};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cvlm_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV/LM API v{}", env!("CARGO_PKG_VERSION"));

    let backend = build_backend(&config).await?;
    info!("Storage backend: {}", backend.name());

    let relay = Arc::new(FormspreeRelay::new(
        config.cv_relay_url.clone(),
        config.lm_relay_url.clone(),
        config.relay_timeout,
    ));

    // Advice degrades to a static message without a key
    let llm = config.anthropic_api_key.clone().map(LlmClient::new);
    match &llm {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => info!("ANTHROPIC_API_KEY not set; CV advice disabled"),
    }

    let state = AppState::new(backend, relay, llm, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_backend(config: &Config) -> Result<Arc<dyn KvBackend>> {
    let backend: Arc<dyn KvBackend> = match config.storage_backend {
        StorageBackendKind::Memory => Arc::new(MemoryBackend::new()),
        StorageBackendKind::File => Arc::new(FileBackend::open(config.data_dir.clone())?),
        StorageBackendKind::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("REDIS_URL is required for the redis backend"))?;
            Arc::new(RedisBackend::connect(url).await?)
        }
    };
    Ok(backend)
}
