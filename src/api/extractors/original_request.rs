use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub const ORIGINAL_METHOD: &str = "x-original-method";
pub const ORIGINAL_URI: &str = "x-original-uri";

/// The request the front-end wants authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalRequest {
    /// Empty when the front-end did not send one; maps to no operation.
    pub method: String,
    /// Path only: query and fragment are dropped.
    pub path: String,
}

impl<S> FromRequestParts<S> for OriginalRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let method = header_str(parts, ORIGINAL_METHOD).unwrap_or_default().trim().to_string();
        let uri = header_str(parts, ORIGINAL_URI).ok_or_else(|| {
            AppError::bad_request("MISSING_ORIGINAL_URI", "missing X-Original-URI header")
        })?;

        let path = uri.split(['?', '#']).next().unwrap_or_default().to_string();

        Ok(OriginalRequest { method, path })
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}
