//! Health check endpoint for service monitoring.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{error::AppError, state::AppState};

/// Known-good report used to probe the conversion engine.
const PROBE_METAR: &str = "METAR KJFK 231751Z 18012KT 10SM FEW040 15/07 A3005";

/// Health check response.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "engine_available": true
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" when the probe conversion succeeds, "degraded" otherwise
    pub status: String,

    /// Crate version
    pub version: String,

    /// Whether the conversion engine produced output for the probe
    pub engine_available: bool,
}

/// Health check handler.
///
/// Runs one probe conversion through the engine. Always answers 200;
/// a failing engine is reported in the body, not via the status code,
/// so monitors can distinguish "down" from "degraded".
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, AppError> {
    let engine = state.engine.clone();
    let probe = tokio::task::spawn_blocking(move || engine.convert(PROBE_METAR)).await;

    let engine_available = matches!(probe, Ok(Ok(_)));
    let status = if engine_available {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine_available,
    }))
}
