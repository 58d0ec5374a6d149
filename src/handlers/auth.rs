//! Authentication HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /auth/register - Create a new user
//! - POST /auth/login - Verify credentials, mint a bearer token
//! - GET /auth/me - Current user profile
//! - POST /auth/password-reset/request - Request a reset token
//! - POST /auth/password-reset/confirm - Redeem a reset token

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::user::{
        LoginRequest, LoginResponse, MessageResponse, PasswordResetConfirm, PasswordResetRequest,
        RegisterRequest, User, UserResponse,
    },
    services::{apikey_service, token_service},
    state::AppState,
};

/// Register a new user.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Ada Pilot",
///   "email": "ada@example.com",
///   "address": "1 Runway Way",
///   "username": "ada",
///   "password": "long-enough-secret"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns the created user (no hash)
/// - **Error (400)**: Validation failure or duplicate username/email
///
/// The duplicate check deliberately uses one combined message for
/// username and email collisions.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if request.username.len() < 3 || request.username.len() > 50 {
        return Err(AppError::InvalidRequest(
            "Username must be 3-50 characters".to_string(),
        ));
    }
    if request.password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !request.email.contains('@') {
        return Err(AppError::InvalidRequest(
            "Invalid email format".to_string(),
        ));
    }

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)")
            .bind(&request.username)
            .bind(&request.email)
            .fetch_one(&state.pool)
            .await?;
    if exists {
        return Err(AppError::InvalidRequest(
            "Username or email already exists".to_string(),
        ));
    }

    let password_hash = token_service::hash_password(&request.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, address, username, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, address, username, password_hash, is_active, created_at
        "#,
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&request.address)
    .bind(&request.username)
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in with username and password.
///
/// # Response
///
/// - **Success (200 OK)**: `{access_token, token_type, user, api_keys}`
/// - **Error (401)**: Invalid credentials — identical for unknown
///   username and wrong password, no token issued either way
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, access_token) = token_service::login(
        &state.pool,
        &state.config,
        &request.username,
        &request.password,
    )
    .await?;

    let api_keys = apikey_service::active_key_ids(&state.pool, user.id).await?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.into(),
        api_keys,
    }))
}

/// Current user profile, resolved from the bearer token subject.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, address, username, password_hash, is_active, created_at
         FROM users
         WHERE id = $1",
    )
    .bind(auth.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotAuthenticated)?;

    Ok(Json(user.into()))
}

/// Request a password reset token.
///
/// Always answers 200 with the same opaque message, whether or not the
/// email matched a user, so the endpoint cannot be used to enumerate
/// accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    token_service::request_password_reset(&state.pool, &state.config, &request.email).await?;

    Ok(Json(MessageResponse {
        message: "If the email exists a reset link was sent".to_string(),
    }))
}

/// Redeem a reset token and set a new password.
///
/// # Response
///
/// - **Success (200 OK)**: `{"message": "Password reset successful"}`
/// - **Error (400)**: invalid, expired, or already-used token
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirm>,
) -> Result<Json<MessageResponse>, AppError> {
    token_service::confirm_password_reset(&state.pool, &request.token, &request.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password reset successful".to_string(),
    }))
}
