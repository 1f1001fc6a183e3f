//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Parses the `{id}` path segment as a UUID.
///
/// Works on routes with further parameters (`/thumbnail/{id}/{size}`) as
/// long as the identifier segment is named `id`. A route with a single
/// parameter may name it anything. Malformed values are rejected with
/// `400 INVALID_UUID` before the handler runs.
///
/// ```ignore
/// async fn show(UuidPath(id): UuidPath) -> String {
///     format!("product {}", id)
/// }
///
/// let app = Router::new().route("/produto/edit/{id}", get(show));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let raw = match params.get("id") {
            Some(raw) => raw,
            None if params.len() == 1 => params.values().next().map(String::as_str).unwrap_or(""),
            None => return Err(AppError::BadRequest("Missing 'id' path parameter".to_string())),
        };

        Ok(UuidPath(Uuid::parse_str(raw)?))
    }
}
