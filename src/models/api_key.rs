//! API key model for the alternate authentication path.
//!
//! API keys let callers hit the conversion endpoints without a login
//! round-trip. They are stored as SHA-256 hashes; the plaintext secret
//! is returned exactly once at creation and never retained.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `user_id`: Owning user
/// - `key_hash`: SHA-256 hash of the actual secret (64 hex characters)
/// - `revoked`: Permanent kill switch; a revoked key is never reactivated
/// - `created_at`: When the key was created
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    /// User this key belongs to; revocation requires ownership
    pub user_id: Uuid,

    /// SHA-256 hash of the secret
    ///
    /// On each request the presented secret is hashed and looked up
    /// here; the plaintext is never stored.
    pub key_hash: String,

    /// Whether this key has been revoked
    pub revoked: bool,

    pub created_at: DateTime<Utc>,
}

/// Response body when creating an API key.
///
/// `raw_key` is the plaintext secret, shown once. There is no way to
/// retrieve it again afterwards.
#[derive(Debug, Serialize)]
pub struct CreateApiKeyResponse {
    pub id: Uuid,
    pub raw_key: String,
    pub created_at: DateTime<Utc>,
}

/// API key metadata for list responses (no secret material).
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            revoked: key.revoked,
            created_at: key.created_at,
        }
    }
}
