/// Factory: build the authorization runtime (engine + token verifier) from `Config`.
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::services::authz::{
    AuthzEngine, AuthzSettings, ClaimScopeMatcher, ConfigFileError, ImpersonationEvaluator,
    PermissionProbe,
};
use crate::services::token::{JwtVerifier, TokenVerifier, keys};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigFileError),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// One consistent configuration snapshot. Replaced as a whole on reload.
pub struct AuthzRuntime {
    pub engine: AuthzEngine,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for AuthzRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs
        f.debug_struct("AuthzRuntime")
            .field("engine", &self.engine)
            .finish()
    }
}

impl AuthzRuntime {
    pub fn new(engine: AuthzEngine, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { engine, verifier }
    }
}

pub async fn build_runtime(
    config: &Config,
    probe: Arc<dyn PermissionProbe>,
) -> Result<AuthzRuntime, RuntimeError> {
    let settings = AuthzSettings::load(&config.config_path)?;
    tracing::info!(
        issuers = settings.registry.len(),
        audience = ?settings.audience,
        "authorization settings loaded"
    );

    let client = keys::http_client(config.jwks_timeout)?;
    let issuer_keys = keys::load_issuer_keys(&settings.registry, &client).await;

    let verifier = JwtVerifier::new(
        issuer_keys,
        settings.audience.clone(),
        config.token_leeway_seconds,
    );
    let engine = AuthzEngine::new(
        Arc::new(settings),
        ImpersonationEvaluator::new(probe, config.probe_timeout),
        Arc::new(ClaimScopeMatcher::new()),
    );

    Ok(AuthzRuntime::new(engine, Arc::new(verifier)))
}
