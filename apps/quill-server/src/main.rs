//! # Quill Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{HttpServer, web};
use quill_core::ports::{PasswordService, RateLimiter};
use quill_infra::{Argon2PasswordService, InMemoryRateLimiter};

use quill_server::config::AppConfig;
use quill_server::state::AppState;
use quill_server::telemetry::{TelemetryConfig, init_telemetry};
use quill_server::templates::Templates;
use quill_server::{SessionSettings, build_app};

fn startup_failure(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    tracing::error!(error = %e, "{what}");
    std::io::Error::other(format!("{what}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!("Starting Quill on {}:{}", config.host, config.port);

    let session = SessionSettings {
        key: config
            .session
            .key()
            .map_err(|e| startup_failure("Invalid session configuration", e))?,
        cookie_secure: config.session.cookie_secure,
    };

    let templates = Templates::load(config.templates_dir.as_deref())
        .map_err(|e| startup_failure("Failed to load templates", e))?;

    let passwords: Arc<dyn PasswordService> = Arc::new(
        Argon2PasswordService::new(&config.passwords)
            .map_err(|e| startup_failure("Invalid password hashing configuration", e))?,
    );

    #[cfg(feature = "database")]
    let state = AppState::connect(&config.database, config.auto_migrate, templates, passwords)
        .await
        .map_err(|e| startup_failure("Failed to initialize storage", e))?;

    #[cfg(not(feature = "database"))]
    let state = {
        tracing::warn!("Built without the database feature. Data is kept in memory only.");
        AppState::in_memory(templates, passwords)
    };

    let state = web::Data::new(state);
    let limiter: Arc<dyn RateLimiter> =
        Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));

    // Start HTTP server
    HttpServer::new(move || build_app(state.clone(), session.clone(), limiter.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
