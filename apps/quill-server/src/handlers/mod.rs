//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod pages;
mod posts;

use std::sync::Arc;

use actix_web::{HttpResponse, guard, http::header, web};
use quill_core::ports::RateLimiter;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::guard::AccessGuard;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// `limiter` throttles credential submissions on `/login` and `/register`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    cfg
        // Public pages
        .route("/", web::get().to(posts::index))
        .route("/about", web::get().to(pages::about))
        .route("/contact", web::get().to(pages::contact))
        .route("/health", web::get().to(health::health_check))
        // Accounts
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_page))
                .route(web::post().to(auth::register))
                .wrap(RateLimitMiddleware::new(limiter.clone())),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login))
                .wrap(RateLimitMiddleware::new(limiter)),
        )
        .route("/logout", web::get().to(auth::logout))
        // Reading is public; commenting needs an account.
        .service(
            web::resource("/post/{post_id:\\d+}")
                .guard(guard::Post())
                .to(comments::create_comment)
                .wrap(AccessGuard::login_required()),
        )
        .route("/post/{post_id:\\d+}", web::get().to(posts::show_post))
        // Administration
        .service(
            web::resource("/new-post")
                .route(web::get().to(posts::new_post_page))
                .route(web::post().to(posts::create_post))
                .wrap(AccessGuard::admin_only())
                .wrap(AccessGuard::login_required()),
        )
        .service(
            web::resource("/edit-post/{post_id:\\d+}")
                .route(web::get().to(posts::edit_post_page))
                .route(web::post().to(posts::update_post))
                .wrap(AccessGuard::admin_only())
                .wrap(AccessGuard::login_required()),
        )
        .service(
            web::resource("/delete/{post_id:\\d+}")
                .route(web::get().to(posts::delete_post))
                .wrap(AccessGuard::admin_only())
                .wrap(AccessGuard::login_required()),
        )
        .service(
            web::resource("/{post_id:\\d+}/comment/{comment_id:\\d+}/delete")
                .route(web::get().to(comments::delete_comment))
                .wrap(AccessGuard::admin_only())
                .wrap(AccessGuard::login_required()),
        );
}

/// Fallback for unmatched paths.
pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound(
        "The page you requested does not exist".to_string(),
    ))
}

/// `303 See Other` to `location`.
fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
