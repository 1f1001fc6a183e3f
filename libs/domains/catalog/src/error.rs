use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Product {0} has no image")]
    NoImage(Uuid),

    #[error("Stored image of product {id} is corrupt: {reason}")]
    CorruptImage { id: Uuid, reason: String },

    #[error("No categories exist")]
    NoCategories,

    #[error("Unsupported image type '{0}'")]
    UnsupportedImageType(String),

    #[error("Image of {size} bytes exceeds the {max} byte limit")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to read form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Lookups that the image endpoints answer with a bare 404
    pub fn is_missing_image(&self) -> bool {
        matches!(self, Self::ProductNotFound(_) | Self::NoImage(_))
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(id) => {
                AppError::NotFound(format!("Product {} not found", id))
            }
            CatalogError::CategoryNotFound(id) => {
                AppError::NotFound(format!("Category {} not found", id))
            }
            CatalogError::InvalidFilter(msg) => AppError::coded(ErrorCode::InvalidFilter, msg),
            err @ CatalogError::InvalidParameter { .. } => {
                AppError::coded(ErrorCode::InvalidParameter, err.to_string())
            }
            CatalogError::NoImage(id) => {
                AppError::NotFound(format!("Product {} has no image", id))
            }
            err @ CatalogError::CorruptImage { .. } => {
                // Message is safe to show; the raster decoder output goes to the log
                tracing::error!(error = %err, "Corrupt stored image");
                AppError::coded(ErrorCode::CorruptData, "Stored image could not be decoded")
            }
            CatalogError::NoCategories => AppError::Conflict(
                "No categories exist; add at least one category first".to_string(),
            ),
            err @ CatalogError::UnsupportedImageType(_) => {
                AppError::coded(ErrorCode::UnsupportedMediaType, err.to_string())
            }
            err @ CatalogError::ImageTooLarge { .. } => {
                AppError::coded(ErrorCode::PayloadTooLarge, err.to_string())
            }
            CatalogError::Validation(errors) => AppError::ValidationError(errors),
            CatalogError::Multipart(e) => AppError::Multipart(e),
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: CatalogError) -> StatusCode {
        AppError::from(err).status()
    }

    #[test]
    fn test_error_statuses() {
        let id = Uuid::now_v7();
        assert_eq!(status_of(CatalogError::ProductNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CatalogError::CategoryNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CatalogError::NoImage(id)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CatalogError::InvalidFilter("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CatalogError::invalid_parameter("size", "must be positive")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(CatalogError::NoCategories), StatusCode::CONFLICT);
        assert_eq!(
            status_of(CatalogError::CorruptImage {
                id,
                reason: "bad base64".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CatalogError::ImageTooLarge { size: 10, max: 5 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(CatalogError::UnsupportedImageType("text/plain".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_invalid_parameter_message_names_parameter() {
        let err = CatalogError::invalid_parameter("pp", "must be between 1 and 100");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'pp': must be between 1 and 100"
        );
    }

    #[test]
    fn test_is_missing_image() {
        let id = Uuid::now_v7();
        assert!(CatalogError::ProductNotFound(id).is_missing_image());
        assert!(CatalogError::NoImage(id).is_missing_image());
        assert!(!CatalogError::CategoryNotFound(id).is_missing_image());
    }
}
