// src/main.rs
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use std::net::SocketAddr;

use pharmacy_backend::config::AppConfig;
use pharmacy_backend::state::AppState;
use pharmacy_backend::{build_app, database};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return;
        }
    };

    let db_pool = match database::create_pool(&config.database_url, config.db_max_connections).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create database pool");
            return;
        }
    };

    if let Err(e) = database::run_migrations(&db_pool).await {
        tracing::error!(error = %e, "Failed to run migrations");
        return;
    }

    let app_state = AppState::new(db_pool, config.jwt_secret.as_str());

    let cors = match config.cors_allow_origin.as_deref().map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(Err(e)) => {
            tracing::error!(error = %e, "CORS_ALLOW_ORIGIN is not a valid header value");
            return;
        }
        None => CorsLayer::permissive(),
    };

    let app = build_app(app_state).layer(cors);

    // Try base_port..base_port+20 to avoid crash when address is in use
    let (host, base_port) = (config.host, config.port);
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = base_port.saturating_add(offset);
            let addr = SocketAddr::from((host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => { bound = Some((l, addr)); break; }
                Err(e) => {
                    if offset == 0 { tracing::warn!(%addr, error=%e, "Port in use, trying next"); }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!("Failed to bind to any port starting at {} on {}", base_port, host);
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}
