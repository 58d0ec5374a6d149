//! User data models and API request/response types.
//!
//! This module defines:
//! - `User`: Database entity representing a registered user
//! - Request types for registration, login, and password reset
//! - `UserResponse`: Response body returned to clients (no password hash)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. Usernames and emails are unique across
/// the store. The password is stored only as an Argon2 hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// E-mail address (unique, used for password reset)
    pub email: String,

    /// Postal address (optional)
    pub address: Option<String>,

    /// Login name (unique)
    pub username: String,

    /// Argon2 hash of the password; never leaves the server
    pub password_hash: String,

    /// Whether this account may authenticate
    pub is_active: bool,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /auth/register`.
///
/// # Validation
///
/// - `username`: 3-50 characters
/// - `password`: at least 8 characters
/// - `address`: optional
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for `POST /auth/login`.
///
/// ```json
/// {
///   "access_token": "eyJhbGciOi...",
///   "token_type": "bearer",
///   "user": { "id": "...", "username": "pilot1", ... },
///   "api_keys": ["550e8400-e29b-41d4-a716-446655440000"]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed bearer token for subsequent requests
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,

    /// Profile of the authenticated user
    pub user: UserResponse,

    /// Ids of the user's non-revoked API keys (never the secrets)
    pub api_keys: Vec<Uuid>,
}

/// Request body for `POST /auth/password-reset/request`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Request body for `POST /auth/password-reset/confirm`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Generic message body, used where no structured payload exists.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response body for user-profile endpoints.
///
/// Strips the password hash and activity flag from the entity.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            username: user.username,
            created_at: user.created_at,
        }
    }
}
