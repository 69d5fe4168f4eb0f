//! Route guards.
//!
//! Wrap a resource with [`AccessGuard`] to refuse requests whose identity does
//! not satisfy its requirements. Refusals are always `403 Forbidden`; they never
//! redirect to the login page. Guards compose by stacking:
//!
//! ```ignore
//! web::resource("/new-post")
//!     .route(web::get().to(handler))
//!     .wrap(AccessGuard::admin_only())
//!     .wrap(AccessGuard::login_required())
//! ```
//!
//! The outermost `wrap` runs first.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use quill_core::access::{Decision, Requirement, evaluate};

use crate::middleware::auth::resolve_identity;
use crate::middleware::error::AppError;

const LOGIN_REQUIRED: &[Requirement] = &[Requirement::LoggedIn];
const ADMIN_ONLY: &[Requirement] = &[Requirement::Admin];

/// Access guard middleware factory.
#[derive(Debug, Clone, Copy)]
pub struct AccessGuard {
    requirements: &'static [Requirement],
}

impl AccessGuard {
    pub fn new(requirements: &'static [Requirement]) -> Self {
        Self { requirements }
    }

    /// Refuse anonymous visitors.
    pub fn login_required() -> Self {
        Self::new(LOGIN_REQUIRED)
    }

    /// Refuse everyone but the administrator.
    pub fn admin_only() -> Self {
        Self::new(ADMIN_ONLY)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AccessGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGuardService {
            service: Rc::new(service),
            requirements: self.requirements,
        }))
    }
}

pub struct AccessGuardService<S> {
    service: Rc<S>,
    requirements: &'static [Requirement],
}

impl<S, B> Service<ServiceRequest> for AccessGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let requirements = self.requirements;

        Box::pin(async move {
            let resolved = resolve_identity(req.request()).await;
            let identity = match resolved {
                Ok(identity) => identity,
                Err(e) => return Ok(req.error_response(e).map_into_right_body()),
            };

            match evaluate(identity.as_ref(), requirements) {
                Decision::Allow => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Decision::Deny(reason) => {
                    tracing::warn!(
                        path = %req.path(),
                        user_id = identity.as_ref().map(|u| u.id),
                        %reason,
                        "Access denied"
                    );
                    Ok(req.error_response(AppError::Forbidden).map_into_right_body())
                }
            }
        })
    }
}
