//! HTTP handlers for API key lifecycle management.
//!
//! - POST /auth/apikeys - Issue a new key (secret shown once)
//! - GET /auth/apikeys - List the caller's keys (metadata only)
//! - DELETE /auth/apikeys/{id} - Revoke a key permanently

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::api_key::{ApiKeyResponse, CreateApiKeyResponse},
    models::user::MessageResponse,
    services::apikey_service,
    state::AppState,
};

/// Issue a new API key for the authenticated user.
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "raw_key": "9f2c...64 hex chars...",
///   "created_at": "2026-08-30T10:00:00Z"
/// }
/// ```
///
/// `raw_key` is shown exactly once; only its hash is retained.
pub async fn create_apikey(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<(StatusCode, Json<CreateApiKeyResponse>), AppError> {
    let (key, raw_key) = apikey_service::create_api_key(&state.pool, auth.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateApiKeyResponse {
            id: key.id,
            raw_key,
            created_at: key.created_at,
        }),
    ))
}

/// List the caller's API keys. Secrets are never included.
pub async fn list_apikeys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let keys = apikey_service::list_api_keys(&state.pool, auth.user_id).await?;

    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

/// Revoke an API key. Permanent and immediate: the key fails validation
/// from this point on and is never reactivated.
///
/// # Response
///
/// - **Success (200 OK)**: `{"message": "API key revoked"}`
/// - **Error (404)**: no key with this id
/// - **Error (403)**: key belongs to another user
pub async fn revoke_apikey(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    apikey_service::revoke_api_key(&state.pool, auth.user_id, key_id).await?;

    Ok(Json(MessageResponse {
        message: "API key revoked".to_string(),
    }))
}
