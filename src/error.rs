//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Authentication**: bad credentials, expired/malformed/forged tokens,
///   unknown or revoked API keys — all abort the request with 401
/// - **Ownership**: acting on another user's API key — 403
/// - **Reset tokens**: invalid, expired, or already-redeemed — 400
/// - **Batch**: empty batches and batches where every item failed — 400
/// - **Infrastructure**: database, I/O, and archive failures — 500,
///   with details hidden from the client
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Username/password pair did not match a stored credential.
    ///
    /// Deliberately identical for "unknown username" and "wrong password"
    /// so the response does not confirm which usernames exist.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No usable `Authorization` header on a protected route.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Access token has passed its expiry claim.
    #[error("Token expired")]
    TokenExpired,

    /// Access token claims are structurally invalid.
    #[error("Malformed token")]
    TokenMalformed,

    /// Access token signature does not verify against the service secret.
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Presented API key does not hash to any stored key.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Presented API key exists but has been revoked.
    #[error("API key revoked")]
    ApiKeyRevoked,

    /// API key id does not exist.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// API key exists but belongs to a different user.
    #[error("API key belongs to another user")]
    NotOwner,

    /// Reset token does not exist.
    #[error("Invalid or expired token")]
    ResetTokenInvalid,

    /// Reset token exists but is past its expiry.
    #[error("Invalid or expired token")]
    ResetTokenExpired,

    /// Reset token was already redeemed once.
    #[error("Token already used")]
    ResetTokenUsed,

    /// The conversion request contained no input units at all.
    #[error("No inputs to convert")]
    EmptyBatch,

    /// Every input unit in the batch failed.
    ///
    /// Rendered with the aggregated `{message, errors, total_errors}`
    /// body instead of the standard error envelope, so callers can
    /// distinguish total failure from partial success.
    #[error("{message}")]
    AllFailed {
        message: String,
        errors: Vec<String>,
    },

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Multipart body could not be read.
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Archive construction failed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O failure while writing archive entries.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected internal fault (hashing, token signing, ...).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// Most errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// `AllFailed` is the one exception: it carries the full per-item error
/// list so the caller can see why each unit was rejected:
/// ```json
/// {
///   "message": "All conversions failed",
///   "errors": ["KJFK.txt: decoding error ..."],
///   "total_errors": 1
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The aggregated batch failure has its own body shape
        if let AppError::AllFailed { message, errors } = self {
            let body = Json(json!({
                "message": message,
                "total_errors": errors.len(),
                "errors": errors,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        // Map each remaining variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                self.to_string(),
            ),
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "token_expired", self.to_string())
            }
            AppError::TokenMalformed => (
                StatusCode::UNAUTHORIZED,
                "token_malformed",
                self.to_string(),
            ),
            AppError::SignatureInvalid => (
                StatusCode::UNAUTHORIZED,
                "signature_invalid",
                self.to_string(),
            ),
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::ApiKeyRevoked => (
                StatusCode::UNAUTHORIZED,
                "api_key_revoked",
                self.to_string(),
            ),
            AppError::ApiKeyNotFound => {
                (StatusCode::NOT_FOUND, "api_key_not_found", self.to_string())
            }
            AppError::NotOwner => (StatusCode::FORBIDDEN, "not_owner", self.to_string()),
            AppError::ResetTokenInvalid => (
                StatusCode::BAD_REQUEST,
                "reset_token_invalid",
                self.to_string(),
            ),
            AppError::ResetTokenExpired => (
                StatusCode::BAD_REQUEST,
                "reset_token_expired",
                self.to_string(),
            ),
            AppError::ResetTokenUsed => (
                StatusCode::BAD_REQUEST,
                "reset_token_used",
                self.to_string(),
            ),
            AppError::EmptyBatch => (StatusCode::BAD_REQUEST, "empty_batch", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Multipart(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "Could not read multipart body".to_string(),
            ),
            AppError::Database(_)
            | AppError::Archive(_)
            | AppError::Io(_)
            | AppError::Internal(_) => {
                // Log full context for operators, hide details from clients
                tracing::error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::AllFailed { .. } => unreachable!("handled above"),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
