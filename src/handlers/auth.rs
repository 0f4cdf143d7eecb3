use crate::error::{AuthError, ErrorResponse};
use crate::services::auth::AuthService;
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

fn auth_error_response(err: AuthError, path: &str) -> HttpResponse {
    match err {
        AuthError::UsernameAlreadyExists(_) | AuthError::Validation(_) => HttpResponse::BadRequest()
            .json(ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                err.to_string(),
                path,
            )),
        AuthError::InvalidCredentials => HttpResponse::Unauthorized().json(ErrorResponse::new(
            StatusCode::UNAUTHORIZED,
            err.to_string(),
            path,
        )),
        other => {
            error!(error = %other, "Authentication request failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                path,
            ))
        }
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = AuthRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid request or username already exists", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    payload: web::Json<AuthRequest>,
    req: HttpRequest,
) -> impl Responder {
    info!(username = %payload.username, "Registration attempt");

    match auth_service
        .register(&payload.username, &payload.password)
        .await
    {
        Ok(token) => HttpResponse::Created().json(AuthResponse { token }),
        Err(e) => auth_error_response(e, req.path()),
    }
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    payload: web::Json<AuthRequest>,
    req: HttpRequest,
) -> impl Responder {
    info!(username = %payload.username, "Login attempt");

    match auth_service.login(&payload.username, &payload.password).await {
        Ok(token) => HttpResponse::Ok().json(AuthResponse { token }),
        Err(e) => auth_error_response(e, req.path()),
    }
}
