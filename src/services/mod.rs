//! Business logic services.
//!
//! Services contain core logic separated from HTTP handlers: token
//! issuance and validation, the API key registry, batch orchestration,
//! and archive rendering.

pub mod apikey_service;
pub mod archive_service;
pub mod batch_service;
pub mod token_service;
