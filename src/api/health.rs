use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::resolver::IssuanceStrategy;
use crate::state::AppState;

/// Health response structure
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub issuance: String,
    pub timestamp: String,
}

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let strategy = state.resolver.strategy();

    let status = match strategy {
        IssuanceStrategy::Remote(_) | IssuanceStrategy::LocalSigning(_) => "healthy",
        IssuanceStrategy::IncompleteSigning | IssuanceStrategy::Unconfigured => "degraded",
    };

    Json(HealthResponse {
        status: status.to_string(),
        issuance: strategy.name().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
