//! HTTP server for the persona engine.
//!
//! Exposes prompt composition and reply evaluation as a JSON service. The
//! catalog is shared read-only; the only outbound call is `/test`, which goes
//! through the configured [`crate::model::ModelClient`].
//!
//! # Endpoints
//!
//! - `GET  /health`   — Liveness probe
//! - `GET  /catalog/*` — Catalog listing
//! - `POST /compose`  — System prompt for a persona + blocks + message
//! - `POST /evaluate` — Score a reply against blocks
//! - `POST /test`     — Compose → model → evaluate

pub mod routes;

pub use routes::{app_router, AppState, ComposeRequest, ComposeResponse, EvaluateRequest, TestResponse};
