//! Identity extractors.
//!
//! The session only stores a user id. The first component that needs the
//! account (a guard, an extractor, or the error page) loads it once and caches
//! it in the request extensions.

use std::future::Future;
use std::pin::Pin;

use actix_session::SessionExt;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use quill_core::domain::User;

use crate::middleware::error::AppError;
use crate::session::SessionContext;
use crate::state::AppState;

#[derive(Clone)]
struct ResolvedIdentity(Option<User>);

/// Identity already resolved for this request, without touching the store.
pub(crate) fn cached_identity(req: &HttpRequest) -> Option<User> {
    req.extensions()
        .get::<ResolvedIdentity>()
        .and_then(|resolved| resolved.0.clone())
}

/// Load the account named by the session, once per request.
pub(crate) async fn resolve_identity(req: &HttpRequest) -> Result<Option<User>, AppError> {
    let cached = req.extensions().get::<ResolvedIdentity>().cloned();
    if let Some(ResolvedIdentity(user)) = cached {
        return Ok(user);
    }

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("AppState not found in app data".to_string()))?;

    let session = SessionContext::new(req.get_session());
    let user = match session.user_id()? {
        Some(id) => {
            let user = state.users.find_by_id(id).await?;
            if user.is_none() {
                // The account is gone; treat the cookie as anonymous from now on.
                tracing::debug!(user_id = id, "Session names an unknown user");
                session.purge();
            }
            user
        }
        None => None,
    };

    if let Some(user) = &user {
        tracing::Span::current().record("user_id", user.id);
    }
    req.extensions_mut().insert(ResolvedIdentity(user.clone()));
    Ok(user)
}

/// The logged-in user. Only used on routes behind a login guard.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            resolve_identity(&req)
                .await?
                .map(CurrentUser)
                .ok_or(AppError::Forbidden)
        })
    }
}

/// Optional identity extractor - doesn't fail for anonymous visitors.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve_identity(&req).await.map(MaybeUser) })
    }
}
