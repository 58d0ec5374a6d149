//! Shared application state passed to handlers and middleware.

use std::sync::Arc;

use crate::{config::Config, db::DbPool, engine::ConversionEngine};

/// State shared across every route.
///
/// Cloned per request by Axum; all members are cheap to clone
/// (pool and engine are reference-counted handles).
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: DbPool,

    /// Loaded configuration (signing secret, validity windows, batch limits)
    pub config: Config,

    /// The METAR TAC -> IWXXM conversion engine
    pub engine: Arc<dyn ConversionEngine>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, engine: Arc<dyn ConversionEngine>) -> Self {
        Self {
            pool,
            config,
            engine,
        }
    }
}
