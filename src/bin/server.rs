//! persona-engine HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `RUST_LOG` — Tracing filter (default: "info,persona_engine=debug")
//! - `PERSONA_CATALOG` — Catalog file or directory merged over the built-in catalog
//! - `MODEL_API_KEY` — Bearer token for the model provider
//! - `MODEL_BASE_URL` — OpenAI-compatible base URL (default: https://api.openai.com/v1)
//! - `MODEL_NAME` — Model name (default: gpt-4o-mini)
//! - `MODEL_TIMEOUT_SECS` — Request timeout (default: 60)
//!
//! # Usage
//!
//! ```bash
//! PERSONA_CATALOG=./my-personas cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use persona_engine::catalog::CatalogLoader;
use persona_engine::model::{ModelConfig, OpenAiCompatClient};
use persona_engine::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,persona_engine=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let mut loader = CatalogLoader::new();
    if let Ok(path) = std::env::var("PERSONA_CATALOG") {
        tracing::info!("Loading catalog from {}", path);
        loader.add_search_path(path);
    }
    let catalog = loader.load_all().context("failed to load persona catalog")?;
    tracing::info!(
        blocks = catalog.blocks.len(),
        values = catalog.values.len(),
        personas = catalog.personas.len(),
        "catalog loaded"
    );

    let model_config = ModelConfig::from_env();
    if model_config.api_key.is_empty() {
        tracing::warn!("MODEL_API_KEY not set; POST /test will answer 502");
    }
    let model = OpenAiCompatClient::new(model_config).context("failed to build model client")?;

    let app = app_router(AppState::new(catalog, Arc::new(model)));

    tracing::info!("persona-engine server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health    — liveness probe");
    tracing::info!("  GET  /catalog/* — blocks, values, personas");
    tracing::info!("  POST /compose   — system prompt");
    tracing::info!("  POST /evaluate  — reply scoring");
    tracing::info!("  POST /test      — compose, call model, score");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
