pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Body of every JSON error response.
///
/// ```json
/// {
///   "code": 1012,
///   "error": "INVALID_FILTER",
///   "message": "Invalid category id 'abc'",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details, e.g. validation field errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Error type returned by handlers; renders as [`ErrorResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Multipart extraction error: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    #[error("Multipart read error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other failure that has its own [`ErrorCode`]
    #[error("{0}: {1}")]
    Coded(ErrorCode, String),
}

impl AppError {
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Coded(code, message.into())
    }

    /// Status code this error is answered with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::MultipartRejection(e) => e.status(),
            AppError::Multipart(e) => e.status(),
            other => other.error_code().status(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Database(e) => db_error_code(e),
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::MultipartRejection(_) | AppError::Multipart(_) => {
                ErrorCode::MultipartExtraction
            }
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::UuidError(_) => ErrorCode::InvalidUuid,
            AppError::BadRequest(_) => ErrorCode::InvalidParameter,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            AppError::Coded(code, _) => *code,
        }
    }
}

fn db_error_code(error: &DbErr) -> ErrorCode {
    match error {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => ErrorCode::DatabaseNotFound,
        DbErr::ConnectionAcquire(_) => ErrorCode::DatabaseUnavailable,
        _ => ErrorCode::DatabaseError,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = ?self, "Request failed");
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
        }

        let (message, details) = match self {
            // Internal details of these stay in the log
            AppError::Database(_) | AppError::InternalServerError(_) => {
                (code.default_message().to_string(), None)
            }
            AppError::JsonExtractorRejection(e) => (e.body_text(), None),
            AppError::MultipartRejection(e) => (e.body_text(), None),
            AppError::Multipart(e) => (e.body_text(), None),
            AppError::ValidationError(e) => (
                code.default_message().to_string(),
                serde_json::to_value(&e).ok(),
            ),
            AppError::UuidError(_) => (code.default_message().to_string(), None),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Coded(_, msg) => (msg, None),
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Build a JSON error response without going through [`AppError`]
pub fn error_response(code: ErrorCode, message: impl Into<String>) -> Response {
    (code.status(), Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_coded_error_uses_code_status() {
        let response =
            AppError::coded(ErrorCode::InvalidFilter, "Invalid category id 'x'").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "INVALID_FILTER");
        assert_eq!(json["code"], 1012);
        assert_eq!(json["message"], "Invalid category id 'x'");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_database_error_hides_internals() {
        let response = AppError::Database(DbErr::Custom("password=secret".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "DATABASE_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn test_record_not_found_maps_to_404() {
        let err = AppError::Database(DbErr::RecordNotFound("products".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    #[tokio::test]
    async fn test_validation_error_carries_details() {
        let errors = Named { name: String::new() }.validate().unwrap_err();
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert!(json["details"]["name"].is_array());
    }

    #[test]
    fn test_error_response_helper() {
        let response = error_response(ErrorCode::MethodNotAllowed, "nope");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
