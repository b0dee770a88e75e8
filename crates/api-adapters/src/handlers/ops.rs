//! Liveness and metrics.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use domains::errors::DomainError;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state
        .metrics
        .render()
        .map_err(|err| DomainError::internal(format!("metrics encoding failed: {err}")))?;
    Ok(([(CONTENT_TYPE, OPENMETRICS)], body))
}
