//! Bearer token and API key authentication middleware.
//!
//! Two flavors share one credential check:
//! - `require_auth` rejects requests without a valid credential (the
//!   account and API key management routes)
//! - `optional_auth` lets anonymous requests through, but a credential
//!   that IS presented must validate (the conversion routes)
//!
//! A credential is either a signed access token (validated statelessly,
//! no store lookup) or an API key secret (hashed and looked up). Tokens
//! always contain `.` separators and API keys are plain hex, which is
//! how the two are told apart.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    services::{apikey_service, token_service},
    state::AppState,
};

/// Authentication context attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers extract it with
/// `Extension<AuthContext>` to know who made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Id of the authenticated user
    pub user_id: Uuid,
}

/// Authentication middleware for protected routes.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <credential>` header
/// 2. Validate the credential (token signature/expiry, or key hash lookup)
/// 3. If valid: inject `AuthContext`, call next handler
/// 4. If missing or invalid: 401, request never reaches the handler
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let credential = bearer_credential(&request).ok_or(AppError::NotAuthenticated)?;
    let context = authenticate(&state, &credential).await?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Optional-but-checked authentication for the conversion routes.
///
/// No `Authorization` header is fine (anonymous request); a header that
/// is present but does not validate aborts with 401 before any input is
/// processed.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(credential) = bearer_credential(&request) {
        let context = authenticate(&state, &credential).await?;
        request.extensions_mut().insert(context);
    }
    Ok(next.run(request).await)
}

/// Pull the credential out of `Authorization: Bearer <credential>`.
fn bearer_credential(request: &Request) -> Option<String> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Validate a credential of either kind and build the auth context.
async fn authenticate(state: &AppState, credential: &str) -> Result<AuthContext, AppError> {
    // Signed tokens are dotted triples; API key secrets are plain hex
    let user_id = if credential.contains('.') {
        token_service::validate_token(credential, &state.config.jwt_secret)?
    } else {
        apikey_service::validate_api_key(&state.pool, credential).await?
    };

    Ok(AuthContext { user_id })
}
