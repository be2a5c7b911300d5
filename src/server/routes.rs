//! Axum route handlers for the persona engine HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                 — Returns `{"status": "ok", "version": ...}`
//! - `GET  /catalog/blocks`         — Essence block catalog
//! - `GET  /catalog/values`         — Value node catalog
//! - `GET  /catalog/personas`       — Persona presets
//! - `GET  /catalog/personas/:id`   — One persona preset
//! - `POST /compose`                — Compose a system prompt
//! - `POST /evaluate`               — Score a reply against blocks
//! - `POST /test`                   — Compose, call the model, score the reply

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::{Catalog, CatalogError};
use crate::model::{ModelClient, ModelError};
use crate::persona::{
    evaluate, ActiveEssenceBlock, EngineError, EssenceBlock, EvaluationResult, PersonaPreset,
    PromptComposer, ValueNode,
};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Read-only catalog.
    pub catalog: Arc<Catalog>,
    /// Language model collaborator used by `/test`.
    pub model: Arc<dyn ModelClient>,
}

impl AppState {
    pub fn new(catalog: Catalog, model: Arc<dyn ModelClient>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            model,
        }
    }
}

/// Error response: status plus `{"error": message}`.
type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
}

fn engine_error(err: EngineError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, err)
}

fn catalog_error(err: CatalogError) -> ApiError {
    let status = match err {
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err)
}

fn model_error(err: ModelError) -> ApiError {
    tracing::warn!(error = %err, "model call failed");
    api_error(StatusCode::BAD_GATEWAY, err)
}

/// Unwrap a JSON body, answering 400 on any rejection.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/catalog/blocks", get(list_blocks_handler))
        .route("/catalog/values", get(list_values_handler))
        .route("/catalog/personas", get(list_personas_handler))
        .route("/catalog/personas/:id", get(get_persona_handler))
        .route("/compose", post(compose_handler))
        .route("/evaluate", post(evaluate_handler))
        .route("/test", post(test_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Request / Response types
// ============================================================================

/// Body of `/compose` and `/test`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    /// Inline persona (summary plus optional triggers, scenes, ...).
    #[serde(default)]
    pub persona: Option<PersonaPreset>,
    /// Catalog persona id; takes precedence over `persona`.
    #[serde(default)]
    pub persona_id: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ActiveEssenceBlock>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeResponse {
    pub prompt: String,
}

/// Body of `/evaluate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ActiveEssenceBlock>,
}

/// Reply of `/test`: the model's text plus its evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub response: String,
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
}

impl ComposeRequest {
    fn message(&self) -> Result<&str, ApiError> {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => Ok(m),
            _ => Err(engine_error(EngineError::missing_field("message", "request"))),
        }
    }

    fn resolve_persona<'a>(&'a self, catalog: &'a Catalog) -> Result<&'a PersonaPreset, ApiError> {
        if let Some(id) = self.persona_id.as_deref() {
            return catalog.persona(id).map_err(catalog_error);
        }
        self.persona
            .as_ref()
            .ok_or_else(|| engine_error(EngineError::missing_field("persona", "request")))
    }

    fn compose(&self, catalog: &Catalog) -> Result<String, ApiError> {
        let message = self.message()?;
        let persona = self.resolve_persona(catalog)?;
        PromptComposer::new(&catalog.values)
            .compose(persona, &self.blocks, message, self.message_count)
            .map_err(engine_error)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "persona-engine",
    }))
}

async fn list_blocks_handler(State(state): State<AppState>) -> Json<Vec<EssenceBlock>> {
    Json(state.catalog.blocks.clone())
}

async fn list_values_handler(State(state): State<AppState>) -> Json<Vec<ValueNode>> {
    Json(state.catalog.values.clone())
}

async fn list_personas_handler(State(state): State<AppState>) -> Json<Vec<PersonaPreset>> {
    Json(state.catalog.personas.clone())
}

async fn get_persona_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonaPreset>, ApiError> {
    state
        .catalog
        .persona(&id)
        .map(|p| Json(p.clone()))
        .map_err(catalog_error)
}

/// POST /compose — build the system prompt.
async fn compose_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<ComposeResponse>, ApiError> {
    let request = parse_body(payload)?;
    let prompt = request.compose(&state.catalog)?;
    Ok(Json(ComposeResponse { prompt }))
}

/// POST /evaluate — score a reply the caller already has.
async fn evaluate_handler(
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, ApiError> {
    let request = parse_body(payload)?;
    let response = request
        .response
        .ok_or_else(|| engine_error(EngineError::missing_field("response", "request")))?;
    crate::persona::validate_blocks(&request.blocks).map_err(engine_error)?;
    Ok(Json(evaluate(&response, &request.blocks)))
}

/// POST /test — compose, call the model once, score its reply.
///
/// Model failures come back as 502 with the upstream message.
async fn test_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<TestResponse>, ApiError> {
    let request = parse_body(payload)?;
    let prompt = request.compose(&state.catalog)?;
    let message = request.message()?;

    tracing::info!(
        model = state.model.model_name(),
        blocks = request.blocks.len(),
        "running persona test call"
    );

    let response = state
        .model
        .complete(&prompt, message)
        .await
        .map_err(model_error)?;
    let evaluation = evaluate(&response, &request.blocks);

    Ok(Json(TestResponse {
        response,
        evaluation,
    }))
}

// ============================================================================
// Tests
// ============================================================================
