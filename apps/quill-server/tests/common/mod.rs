//! Shared harness for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    cookie::{Cookie, Key},
    dev::{Service, ServiceResponse},
    http::{StatusCode, header},
    test, web,
};
use chrono::NaiveDate;
use quill_core::domain::{BlogPost, NewPost, PostDraft, User};
use quill_core::ports::{AuthError, PasswordService, RateLimiter};
use quill_infra::{InMemoryRateLimiter, RateLimitConfig};
use quill_server::state::AppState;
use quill_server::templates::Templates;
use quill_server::{SESSION_COOKIE, SessionSettings, build_app};

/// Reversible stand-in for Argon2 so tests stay fast.
pub struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(state_with_passwords(Arc::new(PlainPasswords)))
}

pub fn state_with_passwords(passwords: Arc<dyn PasswordService>) -> AppState {
    AppState::in_memory(Templates::builtin().expect("built-in templates"), passwords)
}

pub fn generous_limiter() -> Arc<dyn RateLimiter> {
    Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 1_000,
        window: Duration::from_secs(60),
    }))
}

pub async fn spawn_app_with(
    state: web::Data<AppState>,
    limiter: Arc<dyn RateLimiter>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
    };
    test::init_service(build_app(state, session, limiter)).await
}

pub async fn spawn_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    spawn_app_with(state, generous_limiter()).await
}

/// Everything a test looks at in a response.
#[derive(Debug)]
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub retry_after: Option<String>,
    pub body: String,
}

impl Page {
    /// Contents of every flash paragraph, in order.
    pub fn flashes(&self) -> Vec<&str> {
        self.body
            .split("<p class=\"flash\">")
            .skip(1)
            .filter_map(|rest| rest.split_once("</p>").map(|(text, _)| text))
            .collect()
    }
}

/// A client that keeps the session cookie between requests.
#[derive(Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_out(&self) -> bool {
        self.cookie.is_none()
    }

    pub async fn get<S, B>(&mut self, app: &S, uri: &str) -> Page
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = self.with_cookie(test::TestRequest::get().uri(uri));
        self.send(app, req.to_request()).await
    }

    pub async fn post<S, B>(&mut self, app: &S, uri: &str, form: &[(&str, &str)]) -> Page
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = self.with_cookie(test::TestRequest::post().uri(uri).set_form(form));
        self.send(app, req.to_request()).await
    }

    fn with_cookie(&self, req: test::TestRequest) -> test::TestRequest {
        match &self.cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    async fn send<S, B>(&mut self, app: &S, req: Request) -> Page
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let res = test::call_service(app, req).await;

        if let Some(cookie) = res.response().cookies().find(|c| c.name() == SESSION_COOKIE) {
            self.cookie = (!cookie.value().is_empty()).then(|| cookie.into_owned());
        }

        let header_value = |name: header::HeaderName| {
            res.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = res.status();
        let location = header_value(header::LOCATION);
        let retry_after = header_value(header::RETRY_AFTER);
        let body = test::read_body(res).await;

        Page {
            status,
            location,
            retry_after,
            body: String::from_utf8(body.to_vec()).expect("utf-8 body"),
        }
    }
}

/// Register through the form and return the logged-in browser.
pub async fn register<S, B>(app: &S, email: &str, name: &str) -> Browser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut browser = Browser::new();
    let page = browser
        .post(
            app,
            "/register",
            &[("email", email), ("password", "correct horse"), ("name", name)],
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER, "{}", page.body);
    assert_eq!(page.location.as_deref(), Some("/"));
    browser
}

pub async fn user_by_email(state: &AppState, email: &str) -> User {
    state
        .users
        .find_by_email(email)
        .await
        .unwrap()
        .expect("registered user")
}

/// Insert a post directly, bypassing the admin pages.
pub async fn seed_post(state: &AppState, author_id: i32, title: &str) -> BlogPost {
    state
        .posts
        .create(NewPost::new(
            PostDraft {
                title: title.to_string(),
                subtitle: format!("{title} subtitle"),
                body: format!("<p>{title} body</p>"),
                img_url: "https://img.example/post.png".to_string(),
            },
            author_id,
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        ))
        .await
        .unwrap()
}
