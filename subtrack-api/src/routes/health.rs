/// Health check endpoint
///
/// Reports whether the server is up and whether storage answers a ping.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    #[schema(example = "healthy")]
    pub status: String,

    /// Application version
    pub version: String,

    /// "connected" or "disconnected"
    #[schema(example = "connected")]
    pub database: String,
}

/// Health check handler
///
/// Always answers 200; a failed storage ping only degrades the status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match state.repo.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Storage ping failed");
            false
        }
    };

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    }))
}
