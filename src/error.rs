use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body shape shared by every error the API produces, including the ones
/// emitted from middleware before a handler is reached.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, path: &str) -> Self {
        ErrorResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: message.into(),
            path: path.to_string(),
        }
    }
}

fn bad_request(message: String, req: &HttpRequest) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(
        StatusCode::BAD_REQUEST,
        message,
        req.path(),
    ))
}

/// Extractor error handlers so rejected payloads, path segments, and
/// query strings produce the same body shape as every other error.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let res = bad_request(err.to_string(), req);
    InternalError::from_response(err, res).into()
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    let res = bad_request(err.to_string(), req);
    InternalError::from_response(err, res).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let res = bad_request(err.to_string(), req);
    InternalError::from_response(err, res).into()
}

/// Failures from the sled-backed repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode record: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("record already exists")]
    AlreadyExists,
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' is already taken")]
    UsernameAlreadyExists(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("failed to hash password")]
    Hash,
    #[error("failed to issue token: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product with id {0} not found")]
    NotFound(u64),
    #[error("{0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}
