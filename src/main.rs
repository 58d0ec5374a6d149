//! METAR to IWXXM Conversion Service - Main Application Entry Point
//!
//! This is a REST API server that converts METAR/SPECI TAC messages to
//! IWXXM XML, with token-gated batch conversion: callers authenticate
//! with signed bearer tokens or API keys, submit a heterogeneous batch
//! of text inputs (uploaded files and/or a manual text block), and get
//! back either per-item JSON results or a streamed ZIP archive.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server, multipart ingestion)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: HS256 JWTs plus SHA-256 hashed API keys
//! - **Conversion**: built-in Annex 3 TAC decoder / IWXXM encoder
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod engine;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use engine::Annex3Engine;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let server_port = config.server_port;
    let state = AppState::new(pool, config, Arc::new(Annex3Engine));

    // Routes that always require a valid bearer token or API key
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/apikeys", post(handlers::apikeys::create_apikey))
        .route("/auth/apikeys", get(handlers::apikeys::list_apikeys))
        .route(
            "/auth/apikeys/{id}",
            delete(handlers::apikeys::revoke_apikey),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Conversion routes: anonymous is allowed, but a presented
    // credential must validate
    let conversion_routes = Router::new()
        .route("/api/convert", post(handlers::convert::convert))
        .route("/api/convert-zip", post(handlers::convert::convert_zip))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::optional_auth,
        ));

    // Combine with fully public routes
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/password-reset/request",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        .merge(protected_routes)
        .merge(conversion_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Browser frontends talk to this API cross-origin
        .layer(CorsLayer::permissive())
        // Share state (pool, config, engine) with all handlers
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{server_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
