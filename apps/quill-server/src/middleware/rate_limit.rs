//! Rate limiting middleware for credential submissions.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use quill_core::ports::RateLimiter;

use crate::middleware::error::AppError;

/// Rate limiting middleware factory.
///
/// Only `POST` requests count against the limit, keyed by the connecting
/// socket's address; showing the form is never limited.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

/// `path:ip` of the socket peer.
///
/// Forwarding headers such as `X-Forwarded-For` are ignored: a client could
/// rotate them freely and never be throttled.
fn limit_key(req: &ServiceRequest) -> String {
    let peer = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("{}:{}", req.path(), peer)
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
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
        let limiter = self.limiter.clone();

        Box::pin(async move {
            if req.method() != Method::POST {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }

            let key = limit_key(&req);

            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(key = %key, "Rate limit exceeded");
                    // Round up so clients never retry a moment too early.
                    let retry_after_secs = result.reset_after.as_secs()
                        + u64::from(result.reset_after.subsec_nanos() > 0);
                    let err = AppError::TooManyRequests { retry_after_secs };
                    Ok(req.error_response(err).map_into_right_body())
                }
                Ok(_) => service.call(req).await.map(ServiceResponse::map_into_left_body),
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_key_ignores_forwarding_headers() {
        let req = TestRequest::post()
            .uri("/login")
            .peer_addr("203.0.113.7:51000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "10.9.9.1"))
            .insert_header(("Forwarded", "for=10.9.9.2"))
            .to_srv_request();

        assert_eq!(limit_key(&req), "/login:203.0.113.7");
    }

    #[test]
    fn test_key_without_peer_address() {
        let req = TestRequest::post().uri("/register").to_srv_request();

        assert_eq!(limit_key(&req), "/register:unknown");
    }
}
