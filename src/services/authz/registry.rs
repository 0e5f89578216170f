//! Trusted issuers and the part of the namespace each one governs.

use std::collections::HashMap;
use std::path::PathBuf;

use super::path;

/// Per-issuer authorization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    pub issuer_url: String,
    /// Normalized, absolute.
    pub base_path: String,
    pub use_impersonation: bool,
    pub map_subject: bool,
    /// Local JWKS document; when absent the keys are discovered from the issuer.
    pub jwks_file: Option<PathBuf>,
}

impl IssuerConfig {
    pub fn new(issuer_url: impl Into<String>, base_path: &str) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            base_path: path::normalize(base_path),
            use_impersonation: false,
            map_subject: false,
            jwks_file: None,
        }
    }

    pub fn with_impersonation(mut self, enabled: bool) -> Self {
        self.use_impersonation = enabled;
        self
    }

    pub fn with_map_subject(mut self, enabled: bool) -> Self {
        self.map_subject = enabled;
        self
    }

    pub fn with_jwks_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.jwks_file = Some(file.into());
        self
    }
}

/// Issuer URL → settings. Lookups are exact string matches.
#[derive(Debug, Clone, Default)]
pub struct IssuerRegistry {
    issuers: HashMap<String, IssuerConfig>,
}

impl IssuerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the entry for `config.issuer_url`.
    ///
    /// Returns the entry that was replaced, if any. Entries with an empty
    /// issuer URL are ignored.
    pub fn register(&mut self, config: IssuerConfig) -> Option<IssuerConfig> {
        if config.issuer_url.is_empty() {
            return None;
        }
        self.issuers.insert(config.issuer_url.clone(), config)
    }

    pub fn lookup(&self, issuer_url: &str) -> Option<&IssuerConfig> {
        self.issuers.get(issuer_url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IssuerConfig> {
        self.issuers.values()
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_is_normalized_on_construction() {
        let cfg = IssuerConfig::new("https://issuer.example/", "//protected/./");
        assert_eq!(cfg.base_path, "/protected");
    }

    #[test]
    fn reregistering_replaces_every_field() {
        let mut registry = IssuerRegistry::new();
        registry.register(
            IssuerConfig::new("https://issuer.example/", "/first")
                .with_impersonation(true)
                .with_map_subject(true),
        );
        let replaced = registry.register(IssuerConfig::new("https://issuer.example/", "/second"));

        assert!(replaced.is_some());
        let cfg = registry.lookup("https://issuer.example/").unwrap();
        assert_eq!(cfg.base_path, "/second");
        assert!(!cfg.use_impersonation);
        assert!(!cfg.map_subject);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_is_exact() {
        let mut registry = IssuerRegistry::new();
        registry.register(IssuerConfig::new("https://issuer.example/", "/protected"));

        assert!(registry.lookup("https://issuer.example").is_none());
        assert!(registry.lookup("HTTPS://issuer.example/").is_none());
        assert!(registry.lookup("https://issuer.example/").is_some());
    }

    #[test]
    fn empty_issuer_is_not_registered() {
        let mut registry = IssuerRegistry::new();
        registry.register(IssuerConfig::new("", "/protected"));
        assert!(registry.is_empty());
    }
}
