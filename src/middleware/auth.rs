use crate::db::user_repository::UserRepository;
use crate::error::{ErrorResponse, TokenError};
use crate::models::user::{Identity, Role};
use crate::utils::auth::{decode_jwt, is_token_valid};
use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoutePolicy {
    Public,
    Authenticated,
    RequireRole(Role),
}

const ADMIN_PREFIXES: &[&str] = &["/swagger-ui", "/api-docs"];

/// Static route-to-role table. Auth routes skip identity extraction
/// entirely; documentation tooling requires ADMIN; everything else needs
/// any authenticated identity.
fn policy_for(path: &str) -> RoutePolicy {
    if path.starts_with("/api/v1/auth/") {
        RoutePolicy::Public
    } else if ADMIN_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        RoutePolicy::RequireRole(Role::Admin)
    } else {
        RoutePolicy::Authenticated
    }
}

/// App-wide security middleware: extracts and verifies the bearer token,
/// loads the user record to establish roles, then enforces the route
/// policy. Runs after the rate limiter and before any handler.
#[derive(Clone)]
pub struct SecurityMiddleware {
    users: UserRepository,
}

impl SecurityMiddleware {
    pub fn new(users: UserRepository) -> Self {
        SecurityMiddleware { users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            users: self.users.clone(),
        }))
    }
}

pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    users: UserRepository,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let users = self.users.clone();

        Box::pin(async move {
            let policy = policy_for(req.path());
            if policy == RoutePolicy::Public {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|t| t.to_string());

            let Some(token) = token else {
                return Ok(reject(
                    req,
                    StatusCode::UNAUTHORIZED,
                    "Authorization token required",
                ));
            };

            let claims = match decode_jwt(&token) {
                Ok(claims) => claims,
                Err(TokenError::Expired) => {
                    return Ok(reject(req, StatusCode::UNAUTHORIZED, "Token expired"));
                }
                Err(TokenError::Invalid) => {
                    return Ok(reject(req, StatusCode::UNAUTHORIZED, "Invalid token"));
                }
            };

            let user = match users.find_by_username(&claims.sub).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(subject = %claims.sub, "Token subject no longer exists");
                    return Ok(reject(req, StatusCode::UNAUTHORIZED, "Invalid token"));
                }
                Err(e) => {
                    warn!(error = %e, "Credential store failure during authentication");
                    return Ok(reject(
                        req,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Authentication check failed",
                    ));
                }
            };

            if !is_token_valid(&token, &user.username) {
                return Ok(reject(req, StatusCode::UNAUTHORIZED, "Invalid token"));
            }

            let identity = Identity {
                username: user.username,
                roles: user.roles,
            };

            if let RoutePolicy::RequireRole(role) = policy {
                if !identity.roles.contains(&role) {
                    warn!(username = %identity.username, path = %req.path(), "Access denied");
                    return Ok(reject(req, StatusCode::FORBIDDEN, "Access denied"));
                }
            }

            req.extensions_mut().insert(identity);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn reject<B>(
    req: ServiceRequest,
    status: StatusCode,
    message: &str,
) -> ServiceResponse<EitherBody<B, BoxBody>> {
    let (req, _pl) = req.into_parts();
    let body = ErrorResponse::new(status, message, req.path());
    let res = HttpResponse::build(status).json(body);
    ServiceResponse::new(req, res).map_into_right_body()
}
