//! Token service: password hashing, bearer token issue/validation,
//! and single-use password reset tokens.
//!
//! Bearer tokens are self-contained JWTs signed with the service secret.
//! Validation recomputes the signature and checks expiry; it performs no
//! store lookup, so it is O(1) and stateless. Every conversion request
//! passes through it, which is why this matters.
//!
//! Reset tokens are the opposite: opaque random values stored server-side
//! and redeemed at most once via a compare-and-set update.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Config, db::DbPool, error::AppError, models::user::User};

/// JWT claims carried by every access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token is bound to
    pub sub: Uuid,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds); always greater than `iat`
    pub exp: i64,
}

/// Hash a password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored Argon2 hash.
///
/// Argon2 verification is constant-time with respect to the password,
/// so a wrong password and an unknown hash take the same path.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("invalid stored password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Mint a signed access token bound to `user_id`.
///
/// The validity window comes from configuration (`JWT_EXPIRE_MINUTES`).
pub fn issue_token(user_id: Uuid, secret: &str, expire_minutes: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(expire_minutes)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

/// Validate a token and return the user id it is bound to.
///
/// Pure function of the token and the secret: no database access. The
/// default validation keeps a 60 second leeway on the expiry check to
/// tolerate clock skew between replicas.
///
/// # Errors
///
/// - `TokenExpired`: past the expiry claim
/// - `SignatureInvalid`: signature does not verify
/// - `TokenMalformed`: anything else structurally wrong
pub fn validate_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        ErrorKind::InvalidSignature => AppError::SignatureInvalid,
        _ => AppError::TokenMalformed,
    })?;

    Ok(data.claims.sub)
}

/// Verify credentials and mint a token.
///
/// The error is identical for "unknown username", "inactive account" and
/// "wrong password" so responses cannot be used to enumerate users.
pub async fn login(
    pool: &DbPool,
    config: &Config,
    username: &str,
    password: &str,
) -> Result<(User, String), AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, address, username, password_hash, is_active, created_at
         FROM users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !user.is_active || !verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(user.id, &config.jwt_secret, config.jwt_expire_minutes)?;
    Ok((user, token))
}

/// Create a reset token for `email` if a matching user exists.
///
/// Always succeeds from the caller's point of view, whether or not the
/// email matched anything. Delivery is out of scope; the token is logged
/// for the operator-side notification channel.
pub async fn request_password_reset(
    pool: &DbPool,
    config: &Config,
    email: &str,
) -> Result<(), AppError> {
    let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    let Some(user_id) = user_id else {
        // Same outward behavior as the success path
        return Ok(());
    };

    let token_bytes: [u8; 32] = rand::random();
    let token = hex::encode(token_bytes);
    let expires_at = Utc::now() + Duration::minutes(config.reset_expire_minutes);

    sqlx::query(
        "INSERT INTO password_reset_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)",
    )
    .bind(&token)
    .bind(user_id)
    .bind(expires_at)
    .execute(pool)
    .await?;

    tracing::info!(email = %email, token = %token, "password reset token issued");
    Ok(())
}

/// Redeem a reset token and set a new password.
///
/// The token is consumed with a compare-and-set UPDATE (`used = FALSE`
/// guard) inside the same transaction as the password change, so two
/// concurrent redemption attempts cannot both succeed.
///
/// # Errors
///
/// - `ResetTokenUsed`: already redeemed once
/// - `ResetTokenExpired`: past its expiry
/// - `ResetTokenInvalid`: token does not exist
pub async fn confirm_password_reset(
    pool: &DbPool,
    token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    if new_password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    // Atomically consume the token; only one request can win this update
    let user_id: Option<Uuid> = sqlx::query_scalar(
        "UPDATE password_reset_tokens
         SET used = TRUE
         WHERE token = $1 AND used = FALSE AND expires_at > NOW()
         RETURNING user_id",
    )
    .bind(token)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = user_id else {
        tx.rollback().await?;
        // Distinguish why the compare-and-set missed
        let row: Option<(bool, chrono::DateTime<Utc>)> = sqlx::query_as(
            "SELECT used, expires_at FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;
        return Err(match row {
            Some((true, _)) => AppError::ResetTokenUsed,
            Some((false, _)) => AppError::ResetTokenExpired,
            None => AppError::ResetTokenInvalid,
        });
    };

    let password_hash = hash_password(new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_then_validate_returns_the_user_id() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, SECRET, 60).unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        // Issued two hours in the past; well beyond the 60s leeway
        let token = issue_token(Uuid::new_v4(), SECRET, -120).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_fails_signature_check() {
        let token = issue_token(Uuid::new_v4(), "other-secret", 60).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(AppError::SignatureInvalid)
        ));
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert!(matches!(
            validate_token("not.a.token", SECRET),
            Err(AppError::TokenMalformed)
        ));
        assert!(matches!(
            validate_token("", SECRET),
            Err(AppError::TokenMalformed)
        ));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }
}
