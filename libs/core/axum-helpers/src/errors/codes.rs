//! Type-safe error codes for API responses.
//!
//! Each code carries:
//! - a SCREAMING_SNAKE_CASE identifier for clients (e.g. "INVALID_FILTER")
//! - an integer for logs and dashboards (e.g. 1012)
//! - the HTTP status it is answered with
//! - a default human-readable message
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InvalidParameter;
//! assert_eq!(code.as_str(), "INVALID_PARAMETER");
//! assert_eq!(code.code(), 1011);
//! assert_eq!(code.status().as_u16(), 400);
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,
    /// Malformed UUID in a path or query parameter
    InvalidUuid,
    /// JSON body could not be extracted
    JsonExtraction,
    /// Multipart body could not be read
    MultipartExtraction,
    /// Requested resource was not found
    NotFound,
    /// HTTP method not supported by the route
    MethodNotAllowed,
    /// Request conflicts with the current state
    Conflict,
    /// Numeric or enumerated parameter out of range or unparsable
    InvalidParameter,
    /// Filter value could not be applied
    InvalidFilter,
    /// Request body or upload exceeds the configured limit
    PayloadTooLarge,
    /// Upload content type is not accepted
    UnsupportedMediaType,

    // Server errors (1500-1999)
    /// An unexpected internal server error occurred
    InternalError,
    /// Stored data could not be decoded
    CorruptData,
    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Database errors (2000-2999)
    /// Database query or connection error
    DatabaseError,
    /// Record targeted by an update or delete no longer exists
    DatabaseNotFound,
    /// Connection pool exhausted or closed
    DatabaseUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::MultipartExtraction => "MULTIPART_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Conflict => "CONFLICT",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::InvalidFilter => "INVALID_FILTER",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::CorruptData => "CORRUPT_DATA",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
        }
    }

    /// Integer code for structured logs.
    ///
    /// Ranges: 1000-1499 client, 1500-1999 server, 2000-2999 database.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::MethodNotAllowed => 1005,
            Self::Conflict => 1008,
            Self::MultipartExtraction => 1010,
            Self::InvalidParameter => 1011,
            Self::InvalidFilter => 1012,
            Self::PayloadTooLarge => 1013,
            Self::UnsupportedMediaType => 1014,
            Self::InternalError => 1500,
            Self::CorruptData => 1501,
            Self::ServiceUnavailable => 1503,
            Self::DatabaseError => 2003,
            Self::DatabaseNotFound => 2001,
            Self::DatabaseUnavailable => 2013,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ValidationError
            | Self::InvalidUuid
            | Self::JsonExtraction
            | Self::MultipartExtraction
            | Self::InvalidParameter
            | Self::InvalidFilter => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::DatabaseNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InternalError | Self::CorruptData | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ServiceUnavailable | Self::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to parse request body",
            Self::MultipartExtraction => "Failed to read form data",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::Conflict => "Request conflicts with the current state",
            Self::InvalidParameter => "Invalid request parameter",
            Self::InvalidFilter => "Invalid filter value",
            Self::PayloadTooLarge => "Payload too large",
            Self::UnsupportedMediaType => "Unsupported media type",
            Self::InternalError => "An internal server error occurred",
            Self::CorruptData => "Stored data is corrupt",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseNotFound => "Database record not found",
            Self::DatabaseUnavailable => "Database is temporarily unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_representations() {
        assert_eq!(ErrorCode::InvalidFilter.as_str(), "INVALID_FILTER");
        assert_eq!(ErrorCode::InvalidFilter.code(), 1012);
        assert_eq!(ErrorCode::InvalidFilter.to_string(), "INVALID_FILTER");
    }

    #[test]
    fn test_error_code_statuses() {
        assert_eq!(ErrorCode::InvalidParameter.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::CorruptData.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::DatabaseUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_string(&ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "\"VALIDATION_ERROR\"");
        let code: ErrorCode = serde_json::from_str("\"CORRUPT_DATA\"").unwrap();
        assert_eq!(code, ErrorCode::CorruptData);
    }
}
