/// Unified Error Handling Module
///
/// Provides the error handling system for the entire application:
/// 1. Domain-specific error types (validation, storage, authentication)
/// 2. A central `AppError` that all of them convert into
/// 3. HTTP response mapping with structured logging and tracking ids
///
/// Every authentication failure, whatever its internal cause, maps to the
/// same status code and the same response body. The cause is logged under
/// the tracking id and never sent to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Postgres error code for unique constraint violations.
const PG_UNIQUE_VIOLATION: &str = "23505";

// ============================================================================
// DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(&'static str),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(&'static str, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(&'static str),
    #[error("exactly one of username or email must be provided")]
    AmbiguousIdentifier,
    #[error("at least one field must be provided for update")]
    EmptyUpdate,
}

/// Storage errors, translated from sqlx at the repository boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already taken")]
    Duplicate,
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("record".to_string()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) => {
                StoreError::Duplicate
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Internal cause of an authentication failure. Only ever logged; every
/// variant is presented to the client as the same 401 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing authentication token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("token version does not match the stored version")]
    StaleToken,
    #[error("token subject does not resolve to a user")]
    UnknownSubject,
}

// ============================================================================
// UNIFIED APPLICATION ERROR TYPE
// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("username or email already taken")]
    Duplicate,
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::Duplicate,
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

// ============================================================================
// HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking (request ID or trace ID)
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, error_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let (code, message) = match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            AppError::Duplicate => ("ALREADY_TAKEN", "Email or username already taken.".to_string()),
            AppError::NotFound(_) => ("NOT_FOUND", "Record not found.".to_string()),
            // One body for every authentication failure: a caller must not be
            // able to tell a wrong password from an unknown account or a
            // revoked token.
            AppError::Unauthorized(_) => ("UNAUTHORIZED", "Invalid credentials or token.".to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error.".to_string()),
        };

        let error_response = ErrorResponse::new(
            error_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(
                    error_id = error_id,
                    error = %e,
                    "Validation error"
                );
            }
            AppError::Duplicate => {
                tracing::warn!(
                    error_id = error_id,
                    "Duplicate username or email"
                );
            }
            AppError::NotFound(what) => {
                tracing::warn!(
                    error_id = error_id,
                    what = %what,
                    "Record not found"
                );
            }
            AppError::Unauthorized(cause) => {
                tracing::warn!(
                    error_id = error_id,
                    cause = %cause,
                    "Authentication rejected"
                );
            }
            AppError::Internal(detail) => {
                tracing::error!(
                    error_id = error_id,
                    error = %detail,
                    "Internal error"
                );
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &error_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
