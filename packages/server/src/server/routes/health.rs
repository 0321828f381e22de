use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    rows: usize,
    cols: usize,
}

/// Health check endpoint
///
/// Reports the shape of the loaded record table.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    let (rows, cols) = state.deps.records.shape();

    Json(HealthResponse {
        status: "ok".to_string(),
        rows,
        cols,
    })
}
