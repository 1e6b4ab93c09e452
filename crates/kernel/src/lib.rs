//! Gridwire Kernel Library
//!
//! Server-side grid processing: wire decoding, filter compilation, sort
//! resolution, query execution against pluggable data sources, and
//! response shaping. The `gridwire` binary wires this into a reference
//! HTTP server over PostgreSQL.

pub mod config;
pub mod db;
pub mod error;
pub mod grid;
pub mod models;
pub mod routes;
pub mod source;
pub mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(config: &Config, state: AppState) -> Router {
    Router::new()
        .merge(routes::employees::router())
        .merge(routes::health::router())
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([axum::http::header::CONTENT_TYPE])
    }
}

/// Run the HTTP server until shutdown.
pub async fn serve(config: Config, state: AppState) -> Result<()> {
    let app = build_router(&config, state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
