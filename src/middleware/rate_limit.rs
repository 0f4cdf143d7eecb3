use crate::error::ErrorResponse;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::future::{ready, Ready};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Single process-wide token bucket shared by every caller and route,
/// checked before authentication. One admitted request consumes one unit;
/// the check-and-decrement is atomic inside governor.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<GlobalLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(requests_per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap());
        Self::with_quota(quota)
    }

    fn with_quota(quota: Quota) -> Self {
        RateLimitMiddleware {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: Arc<GlobalLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.limiter.check().is_err() {
            warn!(path = %req.path(), "Rate limit exceeded");
            let (req, _pl) = req.into_parts();
            let body = ErrorResponse::new(
                StatusCode::TOO_MANY_REQUESTS,
                "API rate limit exceeded. Please try again later.",
                req.path(),
            );
            let res = HttpResponse::TooManyRequests().json(body);
            return Box::pin(
                async move { Ok(ServiceResponse::new(req, res).map_into_boxed_body()) },
            );
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}
