//! Bearer token verification.
//!
//! The HTTP layer only sees the `TokenVerifier` trait; the JWT/JWKS
//! implementation lives in `jwt` and `keys`.

pub mod claims;
pub mod jwt;
pub mod keys;

pub use claims::VerifiedToken;
pub use jwt::JwtVerifier;

use jsonwebtoken::Algorithm;
use thiserror::Error;

// Errors returned by token verification. All of them end up as 401.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("untrusted issuer: {0}")]
    UntrustedIssuer(String),
    #[error("no signing keys available for issuer {0}")]
    NoKeys(String),
    #[error("unsupported signing algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("no signing key with kid {0:?}")]
    UnknownKey(String),
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("token audience not accepted")]
    AudienceMismatch,
}

/// Parse and verify a presented token, yielding its claims or failing.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, raw: &str) -> Result<VerifiedToken, TokenError>;
}
