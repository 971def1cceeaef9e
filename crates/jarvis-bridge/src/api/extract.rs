//! Lenient JSON body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;

/// JSON request body where "no body" means "all defaults".
///
/// An empty body or a literal `null` yields `T::default()`, so endpoint
/// validation reports the missing field instead of a parse error. The
/// content type is not checked. Any other body must be a JSON object;
/// arrays and scalars are a 400 even when serde could map them onto `T`.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))?;
        if value.is_null() {
            return Ok(Self(T::default()));
        }
        if !value.is_object() {
            return Err(ApiError::bad_request("Request body must be a JSON object"));
        }

        serde_json::from_value(value)
            .map(Self)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
    }
}
