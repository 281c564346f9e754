//! JSON API over the analyzer and report store.
//!
//! Endpoints:
//!  POST /api/verify      analyze { type, value }
//!  GET  /api/verify      convenience variant, ?value=...
//!  POST /api/report      persist a submitted report
//!  GET  /api/reports     list the latest reports
//!  GET  /                health/welcome

use crate::analyzer::{Analyzer, InputKind};
use crate::store::ReportStore;
use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub struct AppState {
    pub analyzer: Analyzer,
    pub store: ReportStore,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
}

fn default_kind() -> String {
    "text".to_string()
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub score: u32,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/verify", post(verify).get(verify_query))
        .route("/api/report", post(submit_report))
        .route("/api/reports", get(list_reports))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> &'static str {
    "verifyx backend is running. Use POST /api/verify or GET /api/verify?value=..."
}

async fn verify(State(state): State<Arc<AppState>>, Json(req): Json<VerifyRequest>) -> Response {
    let Some(value) = req.value.filter(|v| !v.trim().is_empty()) else {
        return missing_value("missing value");
    };
    run_analysis(&state, InputKind::parse(&req.kind), &value)
}

async fn verify_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let Some(value) = params.value.filter(|v| !v.trim().is_empty()) else {
        return missing_value("missing value (use ?value=...)");
    };
    run_analysis(&state, InputKind::Text, &value)
}

/// Analysis is pure string work and does not fail by design; the boundary
/// still catches a panic and reports it as a server error rather than
/// tearing down the connection.
fn run_analysis(state: &AppState, kind: InputKind, value: &str) -> Response {
    match catch_unwind(AssertUnwindSafe(|| state.analyzer.analyze(kind, value))) {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(_) => {
            log::error!("analyzer panicked on a {} byte input", value.len());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "analysis failed"})),
            )
                .into_response()
        }
    }
}

async fn submit_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Response {
    let Some(value) = req.value.filter(|v| !v.trim().is_empty()) else {
        return missing_value("missing value");
    };
    match state
        .store
        .insert(&req.kind, &value, &req.reasons, req.score)
    {
        Ok(id) => (StatusCode::OK, Json(json!({"ok": true, "id": id}))).into_response(),
        Err(e) => {
            log::error!("failed to store report: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to store report"})),
            )
                .into_response()
        }
    }
}

async fn list_reports(State(state): State<Arc<AppState>>) -> Response {
    match state.store.recent(100) {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(e) => {
            log::error!("failed to list reports: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to list reports"})),
            )
                .into_response()
        }
    }
}

fn missing_value(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}
