use axum::response::Response;

use super::{ErrorCode, error_response};

/// Router fallback for unknown paths
pub async fn not_found() -> Response {
    error_response(ErrorCode::NotFound, "The requested resource was not found")
}

/// Fallback for routes hit with an unsupported verb
pub async fn method_not_allowed() -> Response {
    error_response(
        ErrorCode::MethodNotAllowed,
        ErrorCode::MethodNotAllowed.default_message(),
    )
}
