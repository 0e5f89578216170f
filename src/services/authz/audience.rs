//! The process-wide audience tokens must be addressed to.

use serde::Deserialize;
use serde_json::Value;

/// Audience accepted by this service.
///
/// An empty single value means no audience restriction is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Default for Audience {
    fn default() -> Self {
        Self::One(String::new())
    }
}

/// Tokens carrying this audience are accepted by every service.
const ANY_AUDIENCE: &str = "ANY";

impl Audience {
    /// Parse the `audience_json` option: a JSON string or a JSON list of strings.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parse the literal `audience` option. A comma-separated value becomes a list.
    pub fn from_literal(raw: &str) -> Self {
        if raw.contains(',') {
            Self::Many(raw.split(',').map(|s| s.trim().to_string()).collect())
        } else {
            Self::One(raw.to_string())
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        match self {
            Self::One(s) => s.is_empty(),
            Self::Many(list) => list.is_empty(),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(s) if s.is_empty() => Vec::new(),
            Self::One(s) => vec![s.as_str()],
            Self::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }

    /// Check a token's `aud` claim (string, list of strings, or absent).
    pub fn accepts(&self, aud: &Value) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        let presented: Vec<&str> = match aud {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => return false,
        };

        let accepted = self.values();
        presented
            .iter()
            .any(|p| *p == ANY_AUDIENCE || accepted.contains(p))
    }
}
