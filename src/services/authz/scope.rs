//! Scope-claim evaluation.
//!
//! A scope entry has the form `authz[:path]`, e.g. `write:/stuff` or `read`
//! (path defaults to `/`). Entries come from the space-separated `scope` claim
//! and from `scp`, which some issuers send as a string and others as a list.

use serde_json::Value;

use super::{Audience, Operation, path};
use crate::services::token::VerifiedToken;

/// Result of asking whether a token's scopes grant an operation on a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOutcome {
    Allowed,
    Denied,
    /// The token could not be evaluated at all; the message is shown as-is.
    Error(String),
}

/// Given a verified token, an operation and a path, report whether a scope claim authorizes it.
pub trait ScopeMatcher: Send + Sync {
    fn check(
        &self,
        issuer_url: &str,
        audience: &Audience,
        token: &VerifiedToken,
        operation: Operation,
        path: &str,
    ) -> ScopeOutcome;
}

/// Evaluates `scope` / `scp` claims, including the storage.* capability names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimScopeMatcher;

impl ClaimScopeMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl ScopeMatcher for ClaimScopeMatcher {
    fn check(
        &self,
        issuer_url: &str,
        audience: &Audience,
        token: &VerifiedToken,
        operation: Operation,
        path: &str,
    ) -> ScopeOutcome {
        if token.issuer != issuer_url {
            return ScopeOutcome::Error(format!(
                "token issuer {} does not match {}",
                token.issuer, issuer_url
            ));
        }
        if !audience.accepts(token.audience()) {
            return ScopeOutcome::Error(format!(
                "token audience {} does not match {}",
                token.audience(),
                audience.values().join(", ")
            ));
        }

        let entries = match scope_entries(token) {
            Ok(entries) => entries,
            Err(message) => return ScopeOutcome::Error(message.to_string()),
        };

        let requested = path::normalize(path);
        let granted = entries.iter().any(|&entry| {
            let (authz, scope_path) = entry.split_once(':').unwrap_or((entry, "/"));
            grants(authz) == Some(operation)
                && operation != Operation::Unknown
                && path::is_within(&requested, &path::normalize(scope_path))
        });

        if granted {
            ScopeOutcome::Allowed
        } else {
            ScopeOutcome::Denied
        }
    }
}

// Operation granted by an authz name; unrecognized names grant nothing.
fn grants(authz: &str) -> Option<Operation> {
    match authz {
        "read" | "storage.read" => Some(Operation::Read),
        "write" | "storage.modify" | "storage.create" => Some(Operation::Write),
        _ => None,
    }
}

fn scope_entries(token: &VerifiedToken) -> Result<Vec<&str>, &'static str> {
    let mut entries = Vec::new();
    let mut found = false;

    for name in ["scope", "scp"] {
        let Some(value) = token.claim(name) else {
            continue;
        };
        found = true;
        match value {
            Value::String(s) => entries.extend(s.split_whitespace()),
            Value::Array(items) => {
                for item in items {
                    let s = item.as_str().ok_or("invalid scope claim")?;
                    entries.extend(s.split_whitespace());
                }
            }
            _ => return Err("invalid scope claim"),
        }
    }

    if found {
        Ok(entries)
    } else {
        Err("token carries no scope claim")
    }
}
