use std::collections::BTreeMap;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A pool construction error.
    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A rejected login. Unknown usernames and wrong passwords both land here
    /// so the response cannot be used to probe which usernames exist.
    #[error("Invalid credentials provided")]
    InvalidCredentials,

    /// A request that presented a token but could not be authenticated.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An authenticated user missing a required authority.
    #[error("Access denied")]
    AccessDenied,

    /// A resource not found error.
    #[error("{0}")]
    NotFound(String),

    /// A token whose signature verified but whose contents are unusable.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Per-field request validation failures.
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    /// A request the transport layer could not decode.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An argument that violates an internal contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Broken or missing runtime configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A failure in the external video source.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

const FALLBACK_BODY: &str =
    r#"{"error":"INTERNAL_SERVER_ERROR","message":"An unexpected error occurred. Please try again later."}"#;

/// The error body sent on the wire: `{error, message, fieldErrors?, timestamp}`.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(rename = "fieldErrors", skip_serializing_if = "Option::is_none")]
    field_errors: Option<BTreeMap<String, String>>,
    timestamp: DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field_errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::CreatePool(ref e) => {
                tracing::error!("Pool creation error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Login rejected: invalid credentials");
                (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    "Invalid credentials provided".to_string(),
                    None,
                )
            }

            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    format!("Authentication required: {}", msg),
                    None,
                )
            }

            AppError::AccessDenied => {
                tracing::warn!("Access denied: insufficient authorities");
                (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Access denied: Insufficient permissions".to_string(),
                    None,
                )
            }

            AppError::NotFound(ref msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
            }

            AppError::MalformedToken(ref msg) => {
                tracing::warn!("Malformed token: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    format!("Authentication required: {}", msg),
                    None,
                )
            }

            AppError::Validation(fields) => {
                tracing::warn!("Validation failed: {:?}", fields);
                (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    "Validation failed".to_string(),
                    Some(fields),
                )
            }

            AppError::BadRequest(ref msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }

            AppError::InvalidArgument(ref msg) => {
                tracing::error!("Invalid argument: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::Configuration(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::Upstream(ref msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let body = sonic_rs::to_string(&ErrorBody {
            error: code,
            message,
            field_errors,
            timestamp: Utc::now(),
        })
        .unwrap_or_else(|_| FALLBACK_BODY.to_string());

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
