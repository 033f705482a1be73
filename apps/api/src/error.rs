//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ├── body rejected ─── JsonRejection ───────────┐                │
//! │         │                                              │                │
//! │         ├── rule broken ───── CoreError ───────────────┤                │
//! │         │                                              ▼                │
//! │         ├── storage failed ── DbError ────────────► ApiError            │
//! │         │                                              │                │
//! │         ▼                                              ▼                │
//! │  200/201 + JSON                      status + {"code", "message"}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (SQL errors, commit failures) are logged here and
//! replaced by a generic message in the response.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockroom_core::CoreError;
use stockroom_db::DbError;
use tracing::error;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Coffee Beans (...): available 2, requested 5"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Not enough units on hand for a sale (400)
    InsufficientStock,

    /// Unique value already taken (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                error!(error = %e, "Database connection failed");
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!(error = %e, "Database migration failed");
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!(error = %e, "Database query failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!(error = %e, "Transaction failed");
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database busy, try again")
            }
            DbError::Internal(e) => {
                error!(error = %e, "Internal database error");
                ApiError::new(ErrorCode::Internal, "Internal server error")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::EmptySale
            | CoreError::TooManyLines { .. }
            | CoreError::AmountOverflow
            | CoreError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Malformed, incomplete or mistyped JSON bodies are validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// `axum::Json` whose rejection is an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorCode::NotFound, StatusCode::NOT_FOUND),
            (ErrorCode::ValidationError, StatusCode::BAD_REQUEST),
            (ErrorCode::InsufficientStock, StatusCode::BAD_REQUEST),
            (ErrorCode::Conflict, StatusCode::CONFLICT),
            (ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            assert_eq!(code.status(), status, "{code:?}");
        }
    }

    #[test]
    fn test_code_serializes_screaming_snake_case() {
        let body = serde_json::to_value(ApiError::new(ErrorCode::InsufficientStock, "x")).unwrap();
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["message"], "x");
    }

    #[test]
    fn test_domain_errors_unwrap_through_db_error() {
        let err: ApiError = DbError::Domain(CoreError::InsufficientStock {
            product_id: "p1".to_string(),
            product_name: "Tea".to_string(),
            available: 2,
            requested: 5,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 2, requested 5"));

        let err: ApiError = DbError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = DbError::Domain(CoreError::ProductNotFound("p9".to_string())).into();
        assert_eq!(err, ApiError::not_found("Product", "p9"));

        let err: ApiError = CoreError::SaleNotFound("s9".to_string()).into();
        assert_eq!(err, ApiError::not_found("Sale", "s9"));

        let err: ApiError = DbError::Domain(CoreError::AmountOverflow).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_duplicate_sku_is_conflict() {
        let err: ApiError = DbError::duplicate("sku", "BEV-001").into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "sku 'BEV-001' already exists");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err: ApiError = DbError::QueryFailed("no such table: products".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("products"));
    }

    #[test]
    fn test_unclassified_db_errors_are_internal() {
        let err: ApiError = DbError::Internal("decode failed for column price_cents".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("price_cents"));
    }
}
