//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, multipart form, URL params)
//! 2. Performs business logic (database queries, batch conversion)
//! 3. Returns HTTP response (JSON, archive bytes, status code)

/// API key lifecycle endpoints
pub mod apikeys;
/// Registration, login, profile, password reset
pub mod auth;
/// Batch conversion endpoints (JSON and ZIP)
pub mod convert;
/// Health check endpoint
pub mod health;
