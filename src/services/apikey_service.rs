//! API key registry: issue, list, revoke, and validate long-lived keys.
//!
//! Keys are random 32-byte secrets shown to the caller once; only the
//! SHA-256 hash is stored. Validation hashes the presented secret and
//! looks it up by hash, fetching the row whether or not it is revoked so
//! "unknown" and "revoked" take the same query path.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{db::DbPool, error::AppError, models::api_key::ApiKey};

/// Generate a fresh plaintext API key (64 hex characters).
pub fn generate_raw_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 hex digest of a key, the only form ever stored.
pub fn hash_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a new API key for `user_id`.
///
/// Returns the stored record plus the plaintext secret. This is the only
/// time the plaintext exists outside the caller's hands.
pub async fn create_api_key(pool: &DbPool, user_id: Uuid) -> Result<(ApiKey, String), AppError> {
    let raw_key = generate_raw_key();
    let key_hash = hash_key(&raw_key);

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (user_id, key_hash)
        VALUES ($1, $2)
        RETURNING id, user_id, key_hash, revoked, created_at
        "#,
    )
    .bind(user_id)
    .bind(&key_hash)
    .fetch_one(pool)
    .await?;

    Ok((key, raw_key))
}

/// List all API keys belonging to `user_id`, oldest first.
pub async fn list_api_keys(pool: &DbPool, user_id: Uuid) -> Result<Vec<ApiKey>, AppError> {
    let keys = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT id, user_id, key_hash, revoked, created_at
        FROM api_keys
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// Ids of the user's non-revoked keys (for the login response).
pub async fn active_key_ids(pool: &DbPool, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM api_keys WHERE user_id = $1 AND revoked = FALSE ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Permanently revoke one of the caller's API keys.
///
/// # Errors
///
/// - `ApiKeyNotFound`: no key with this id exists (404)
/// - `NotOwner`: the key belongs to a different user (403)
pub async fn revoke_api_key(pool: &DbPool, user_id: Uuid, key_id: Uuid) -> Result<(), AppError> {
    let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM api_keys WHERE id = $1")
        .bind(key_id)
        .fetch_optional(pool)
        .await?;

    match owner {
        None => Err(AppError::ApiKeyNotFound),
        Some(owner_id) if owner_id != user_id => Err(AppError::NotOwner),
        Some(_) => {
            // Idempotent: revoking an already-revoked key is still success
            sqlx::query("UPDATE api_keys SET revoked = TRUE WHERE id = $1")
                .bind(key_id)
                .execute(pool)
                .await?;
            Ok(())
        }
    }
}

/// Validate a presented API key secret and return the owning user id.
///
/// The row is fetched by hash regardless of revocation state, then the
/// flag is checked in memory, so unknown and revoked keys cost the same
/// single indexed lookup.
///
/// # Errors
///
/// - `InvalidApiKey`: hash matches nothing
/// - `ApiKeyRevoked`: key exists but was revoked
pub async fn validate_api_key(pool: &DbPool, presented: &str) -> Result<Uuid, AppError> {
    let key_hash = hash_key(presented);

    let key = sqlx::query_as::<_, ApiKey>(
        "SELECT id, user_id, key_hash, revoked, created_at FROM api_keys WHERE key_hash = $1",
    )
    .bind(&key_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidApiKey)?;

    if key.revoked {
        return Err(AppError::ApiKeyRevoked);
    }

    Ok(key.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_keys_are_64_hex_chars_and_unique() {
        let a = generate_raw_key();
        let b = generate_raw_key();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hashing_is_deterministic_and_not_identity() {
        let raw = generate_raw_key();
        assert_eq!(hash_key(&raw), hash_key(&raw));
        assert_ne!(hash_key(&raw), raw);
        assert_eq!(hash_key(&raw).len(), 64);
    }
}
