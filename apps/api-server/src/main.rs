//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use quill_infra::InMemoryRateLimiter;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry_config = telemetry::TelemetryConfig::from_env();
    telemetry::init_telemetry(&telemetry_config);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            return Err(std::io::Error::other(e));
        }
    };

    tracing::info!("Starting Quill API Server on {}:{}", config.host, config.port);

    let state = match AppState::new(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            return Err(std::io::Error::other(e));
        }
    };

    let limiter = Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));
    let token_service = state.tokens.clone();
    let password_service = state.passwords.clone();

    HttpServer::new(move || {
        let limiter = limiter.clone();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
