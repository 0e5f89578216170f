use base64::Engine as _;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, jwk::Jwk};
use serde_json::{Map, Value};

use super::keys::IssuerKeys;
use super::{TokenError, TokenVerifier, VerifiedToken};
use crate::services::authz::Audience;

/// JWT verifier backed by per-issuer JWK sets.
///
/// `jsonwebtoken::Validation` checks:
/// - signature
/// - `exp` / `nbf` (with leeway)
/// - `iss` (pinned to the issuer whose keys verified the token)
///
/// This type additionally checks:
/// - the issuer is one we hold keys for (tokens from anyone else never get that far)
/// - `iss` / `sub` are present and non-empty
/// - `aud` against the configured audience
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    keys: IssuerKeys,
    audience: Audience,
    leeway_seconds: u64,
}

const REQUIRED_CLAIMS: [&str; 3] = ["exp", "iss", "sub"];

fn is_asymmetric(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
            | Algorithm::ES256
            | Algorithm::ES384
            | Algorithm::EdDSA
    )
}

impl JwtVerifier {
    pub fn new(keys: IssuerKeys, audience: Audience, leeway_seconds: u64) -> Self {
        Self {
            keys,
            audience,
            leeway_seconds,
        }
    }

    // Read `iss` from the payload without verifying anything, to pick a key set.
    fn unverified_issuer(raw: &str) -> Result<String, TokenError> {
        let mut parts = raw.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(TokenError::Malformed),
        };
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

        match claims.get("iss").and_then(Value::as_str) {
            Some(iss) if !iss.trim().is_empty() => Ok(iss.to_string()),
            _ => Err(TokenError::EmptyClaim("iss")),
        }
    }

    fn validation(&self, alg: Algorithm, issuer: &str) -> Validation {
        let mut validation = Validation::new(alg);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        // Audience may be a list or the ANY wildcard; checked by `Audience::accepts`.
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;
        validation
    }

    fn decode_with(
        raw: &str,
        jwk: &Jwk,
        validation: &Validation,
    ) -> Result<Map<String, Value>, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_jwk(jwk)?;
        let data = jsonwebtoken::decode::<Map<String, Value>>(raw, &key, validation)?;
        Ok(data.claims)
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, raw: &str) -> Result<VerifiedToken, TokenError> {
        let issuer = Self::unverified_issuer(raw)?;
        let header = jsonwebtoken::decode_header(raw)?;

        if !is_asymmetric(header.alg) {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let set = self
            .keys
            .get(&issuer)
            .ok_or_else(|| TokenError::UntrustedIssuer(issuer.clone()))?;
        if set.keys.is_empty() {
            return Err(TokenError::NoKeys(issuer));
        }

        let candidates: Vec<&Jwk> = match header.kid.as_deref() {
            Some(kid) => set.find(kid).into_iter().collect(),
            None => set.keys.iter().collect(),
        };
        if candidates.is_empty() {
            return Err(TokenError::UnknownKey(header.kid.unwrap_or_default()));
        }

        let validation = self.validation(header.alg, &issuer);
        let mut last_err = None;
        let mut claims = None;
        for jwk in candidates {
            match Self::decode_with(raw, jwk, &validation) {
                Ok(decoded) => {
                    claims = Some(decoded);
                    break;
                }
                Err(err) => last_err = Some(err),
            }
        }
        let claims = match (claims, last_err) {
            (Some(claims), _) => claims,
            (None, Some(err)) => return Err(TokenError::Jwt(err)),
            (None, None) => return Err(TokenError::NoKeys(issuer)),
        };

        let token = VerifiedToken::from_claims(claims).map_err(TokenError::EmptyClaim)?;

        if !self.audience.accepts(token.audience()) {
            return Err(TokenError::AudienceMismatch);
        }

        Ok(token)
    }
}
