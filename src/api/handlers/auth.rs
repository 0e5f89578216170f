/*
 * Responsibility
 * - GET /auth: the auth subrequest
 * - 401 when no token / token fails verification, otherwise 200 or 403 from
 *   the decision engine with the reason as body
 * - Logs every decision with the token id (jti) when the token carries one
 */
use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::extractors::{BearerToken, OriginalRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Carries the token subject to the front-end for issuers with `map_subject`.
pub const SUBJECT_HEADER: HeaderName = HeaderName::from_static("x-authz-subject");

/// Tokens from issuers missing from the configuration fail verification,
/// so they surface as 401 rather than the engine's 403.
pub async fn authorize(
    State(state): State<AppState>,
    BearerToken(raw_token): BearerToken,
    request: OriginalRequest,
) -> Result<Response, AppError> {
    let runtime = state.runtime();

    let token = runtime.verifier.verify(&raw_token).map_err(|err| {
        tracing::warn!(error = %err, "failed to verify token");
        AppError::invalid_token(&err)
    })?;

    let decision = runtime
        .engine
        .decide(&request.method, &request.path, &token)
        .await;

    if !decision.allowed {
        match token.jti.as_deref() {
            Some(jti) => tracing::warn!(
                jti,
                method = %request.method,
                path = %request.path,
                reason = %decision.reason,
                "denied token"
            ),
            None => tracing::warn!(
                method = %request.method,
                path = %request.path,
                reason = %decision.reason,
                "denied token without token id"
            ),
        }
        return Err(AppError::Forbidden(decision.reason));
    }

    if let Some(jti) = token.jti.as_deref() {
        tracing::info!(jti, method = %request.method, path = %request.path, "allowed token");
    }

    let mut response = (StatusCode::OK, decision.reason).into_response();
    if let Some(subject) = decision.mapped_subject {
        match HeaderValue::from_str(&subject) {
            Ok(value) => {
                response.headers_mut().insert(SUBJECT_HEADER, value);
            }
            Err(_) => tracing::warn!(subject, "subject is not a valid header value; not mapped"),
        }
    }

    Ok(response)
}
