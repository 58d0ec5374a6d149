//! Data models: database entities and API request/response types.

/// API key registry model
pub mod api_key;
/// Batch conversion types
pub mod conversion;
/// User and auth request/response types
pub mod user;
