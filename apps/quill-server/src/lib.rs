//! # Quill Server
//!
//! Server-rendered blog: a single administrator publishes posts, registered
//! readers comment on them.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{
    App,
    body::MessageBody,
    cookie::{Key, SameSite},
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::ErrorHandlers,
    web,
};
use quill_core::ports::RateLimiter;
use tracing_actix_web::TracingLogger;

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod templates;
pub mod views;

use middleware::error::render_error_page;
use state::AppState;
use telemetry::QuillRootSpan;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Session cookie settings shared by every worker.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
}

/// Assemble the application: session cookies, request tracing, HTML error
/// pages, and every route.
pub fn build_app(
    state: web::Data<AppState>,
    session: SessionSettings,
    limiter: Arc<dyn RateLimiter>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let sessions = SessionMiddleware::builder(CookieSessionStore::default(), session.key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(session.cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build();

    App::new()
        .app_data(state)
        .configure(move |cfg| handlers::configure_routes(cfg, limiter))
        .default_service(web::to(handlers::not_found))
        .wrap(ErrorHandlers::new().default_handler(render_error_page))
        .wrap(sessions)
        .wrap(TracingLogger::<QuillRootSpan>::new())
}
