/*
 * Responsibility
 * - AppError shared by extractors and handlers
 * - IntoResponse: 401 carries a WWW-Authenticate challenge, 403 carries the
 *   decision reason as plain text, everything else a JSON error body
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

const REALM_CHALLENGE: &str = r#"Bearer realm="scitokens""#;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Unauthorized { message: String, challenge: String },
    #[error("{0}")]
    Forbidden(String),
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
}

impl AppError {
    /// No usable `Authorization: Bearer ...` header.
    pub fn missing_credentials() -> Self {
        Self::Unauthorized {
            message: "No Authorization header".into(),
            challenge: REALM_CHALLENGE.into(),
        }
    }

    /// A token was presented but failed verification.
    pub fn invalid_token(description: impl std::fmt::Display) -> Self {
        let description = description.to_string().replace(['"', '\\'], "'");
        Self::Unauthorized {
            message: "Invalid token".into(),
            challenge: format!(
                r#"{REALM_CHALLENGE},error="invalid_token",error_description="{description}""#
            ),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized { message, challenge } => {
                let challenge = HeaderValue::from_str(&challenge)
                    .unwrap_or_else(|_| HeaderValue::from_static(REALM_CHALLENGE));
                (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, challenge)],
                    message,
                )
                    .into_response()
            }
            AppError::Forbidden(reason) => (StatusCode::FORBIDDEN, reason).into_response(),
            AppError::BadRequest { code, message } => {
                json_error(StatusCode::BAD_REQUEST, code, message)
            }
        }
    }
}

fn json_error(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = ErrorResponse {
        error: ErrorBody { code, message },
    };
    (status, Json(body)).into_response()
}
