use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A token whose signature, issuer, expiry and audience have been checked.
///
/// The full claim set is kept so scope claims in either the `scope` or the
/// `scp` form stay available to the scope matcher.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub issuer: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
    pub jti: Option<String>,
    pub claims: Map<String, Value>,
}

impl VerifiedToken {
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let issuer = issuer.into();
        let subject = subject.into();
        let mut claims = Map::new();
        claims.insert("iss".into(), Value::String(issuer.clone()));
        claims.insert("sub".into(), Value::String(subject.clone()));
        claims.insert("exp".into(), Value::from(expires_at.timestamp()));

        Self {
            issuer,
            subject,
            expires_at,
            jti: None,
            claims,
        }
    }

    /// Build from a decoded claim map. `iss`, `sub` and `exp` must be present and non-empty.
    pub fn from_claims(claims: Map<String, Value>) -> Result<Self, &'static str> {
        let issuer = non_empty_str(&claims, "iss")?;
        let subject = non_empty_str(&claims, "sub")?;
        let expires_at = claims
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .ok_or("exp")?;
        let jti = claims.get("jti").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Ok(Self {
            issuer,
            subject,
            expires_at,
            jti,
            claims,
        })
    }

    pub fn with_jti(mut self, jti: impl Into<String>) -> Self {
        let jti = jti.into();
        self.claims.insert("jti".into(), Value::String(jti.clone()));
        self.jti = Some(jti);
        self
    }

    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// The `aud` claim, or `Null` when the token has none.
    pub fn audience(&self) -> &Value {
        self.claims.get("aud").unwrap_or(&Value::Null)
    }
}

fn non_empty_str(claims: &Map<String, Value>, name: &'static str) -> Result<String, &'static str> {
    match claims.get(name).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(name),
    }
}
