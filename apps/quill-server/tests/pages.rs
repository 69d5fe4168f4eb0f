//! Public pages, error pages, health, and login throttling.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{http::StatusCode, test};
use quill_infra::{InMemoryRateLimiter, RateLimitConfig};

use common::{Browser, spawn_app, spawn_app_with, test_state};

#[actix_rt::test]
async fn static_pages_are_public() {
    let app = spawn_app(test_state()).await;
    let mut visitor = Browser::new();

    for uri in ["/", "/about", "/contact", "/login", "/register"] {
        let page = visitor.get(&app, uri).await;
        assert_eq!(page.status, StatusCode::OK, "GET {uri}");
        assert!(page.body.contains("href=\"/login\""), "GET {uri}");
    }
}

#[actix_rt::test]
async fn unknown_paths_render_the_error_page() {
    let app = spawn_app(test_state()).await;

    let page = Browser::new().get(&app, "/no/such/page").await;

    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("<h1>404</h1>"));
    assert!(page.body.contains("Request ID:"));
}

#[actix_rt::test]
async fn health_reports_ok() {
    let app = spawn_app(test_state()).await;

    let page = Browser::new().get(&app, "/health").await;

    assert_eq!(page.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&page.body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[actix_rt::test]
async fn repeated_login_attempts_are_throttled() {
    let limiter = Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(60),
    }));
    let app = spawn_app_with(test_state(), limiter).await;
    let mut attacker = Browser::new();
    let guess = [("email", "a@x.com"), ("password", "guess")];

    assert_eq!(attacker.post(&app, "/login", &guess).await.status, StatusCode::OK);
    assert_eq!(attacker.post(&app, "/login", &guess).await.status, StatusCode::OK);
    let blocked = attacker.post(&app, "/login", &guess).await;

    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(blocked.retry_after.is_some());
    assert!(blocked.body.contains("Too Many Requests"));

    // Viewing the form is never throttled.
    assert_eq!(attacker.get(&app, "/login").await.status, StatusCode::OK);
}

#[actix_rt::test]
async fn rotating_forwarded_for_does_not_escape_the_limit() {
    let limiter = Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(60),
    }));
    let app = spawn_app_with(test_state(), limiter).await;
    let peer: SocketAddr = "198.51.100.20:40000".parse().unwrap();

    let mut statuses = Vec::new();
    for n in 1..=6 {
        let req = test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer)
            .insert_header(("X-Forwarded-For", format!("10.9.9.{n}")))
            .set_form([("email", "a@x.com"), ("password", "guess")])
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(&statuses[..2], [StatusCode::OK, StatusCode::OK]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}
