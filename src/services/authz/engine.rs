//! Allow/deny decisions for a (method, path, verified token) triple.
//!
//! Order of evaluation:
//! 1. issuer must be registered (hard deny otherwise)
//! 2. path must sit under the issuer's base path (hard deny otherwise)
//! 3. impersonation, when enabled, may allow; a "no" falls through
//! 4. the token's scope claims decide

use std::sync::Arc;

use thiserror::Error;

use super::{
    AuthzSettings, ImpersonationEvaluator, IssuerConfig, Operation, ScopeMatcher, ScopeOutcome,
    path,
};
use crate::services::token::VerifiedToken;

/// Why a request was denied. The `Display` text is the user-visible reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("issuer not recognized")]
    UnknownIssuer,
    #[error("path outside issuer's authorized root")]
    PathOutsideBase,
    #[error("path not allowed by token scope")]
    ScopeDenied,
    /// Reported verbatim from the scope matcher.
    #[error("{0}")]
    EnforcementError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Empty on allow.
    pub reason: String,
    /// Token subject, on allow, when the issuer has subject mapping enabled.
    pub mapped_subject: Option<String>,
}

impl Decision {
    fn allow(issuer: &IssuerConfig, token: &VerifiedToken) -> Self {
        Self {
            allowed: true,
            reason: String::new(),
            mapped_subject: issuer.map_subject.then(|| token.subject.clone()),
        }
    }

    fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
            mapped_subject: None,
        }
    }
}

#[derive(Clone)]
pub struct AuthzEngine {
    settings: Arc<AuthzSettings>,
    impersonation: ImpersonationEvaluator,
    scopes: Arc<dyn ScopeMatcher>,
}

impl std::fmt::Debug for AuthzEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthzEngine")
            .field("settings", &self.settings)
            .field("impersonation", &self.impersonation)
            .finish()
    }
}

impl AuthzEngine {
    pub fn new(
        settings: Arc<AuthzSettings>,
        impersonation: ImpersonationEvaluator,
        scopes: Arc<dyn ScopeMatcher>,
    ) -> Self {
        Self {
            settings,
            impersonation,
            scopes,
        }
    }

    pub fn settings(&self) -> &AuthzSettings {
        &self.settings
    }

    /// Decide whether `token` may perform `method` on `raw_path`. Never fails.
    pub async fn decide(&self, method: &str, raw_path: &str, token: &VerifiedToken) -> Decision {
        let operation = Operation::from_method(method);

        let Some(issuer) = self.settings.registry.lookup(&token.issuer) else {
            return Decision::deny(DenyReason::UnknownIssuer);
        };

        let path = path::normalize(raw_path);
        let relative = match path::strip_base(&path, &issuer.base_path) {
            Ok(relative) => relative,
            Err(err) => {
                tracing::debug!(error = %err, "requested path does not start with base_path");
                return Decision::deny(DenyReason::PathOutsideBase);
            }
        };

        if issuer.use_impersonation
            && self
                .impersonation
                .check(&token.subject, operation, &relative)
                .await
        {
            return Decision::allow(issuer, token);
        }

        match self.scopes.check(
            &issuer.issuer_url,
            &self.settings.audience,
            token,
            operation,
            &relative,
        ) {
            ScopeOutcome::Allowed => Decision::allow(issuer, token),
            ScopeOutcome::Denied => Decision::deny(DenyReason::ScopeDenied),
            ScopeOutcome::Error(message) => Decision::deny(DenyReason::EnforcementError(message)),
        }
    }
}
