//! Authorization settings file (INI).
//!
//! ```ini
//! [Global]
//! audience_json = ["https://storage.example", "testing"]
//!
//! [Issuer demo]
//! issuer = https://issuer.example/
//! base_path = /protected
//! impersonation = false
//! map_subject = true
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption, Properties};
use thiserror::Error;

use super::{Audience, IssuerConfig, IssuerRegistry};

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ini::ParseError),
    #[error("invalid boolean {value:?} for `{key}` in [{section}]")]
    InvalidBool {
        section: String,
        key: &'static str,
        value: String,
    },
    #[error("section [{0}] appears more than once")]
    DuplicateSection(String),
    #[error("invalid audience_json: {0}")]
    Audience(#[from] serde_json::Error),
}

/// Immutable snapshot of everything the decision engine reads.
#[derive(Debug, Clone, Default)]
pub struct AuthzSettings {
    pub registry: IssuerRegistry,
    pub audience: Audience,
}

const GLOBAL_SECTION: &str = "Global";
const ISSUER_SECTION_PREFIX: &str = "issuer ";

impl AuthzSettings {
    pub fn new(registry: IssuerRegistry, audience: Audience) -> Self {
        Self { registry, audience }
    }

    /// Load from disk. A missing file means "no issuers configured".
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        tracing::info!(path = %path.display(), "loading authorization configuration");

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "configuration file not found; no issuers configured");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigFileError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigFileError> {
        // Values are taken literally: audience_json carries JSON quotes.
        // Indented lines continue the previous value, so a JSON list may span lines.
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            enabled_indented_mutiline_value: true,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(contents, opt)?;

        let mut settings = Self::default();
        let mut seen = HashSet::new();

        for (name, props) in ini.iter() {
            let Some(name) = name else { continue };
            if !seen.insert(name) {
                return Err(ConfigFileError::DuplicateSection(name.to_string()));
            }
            let options = lowercase_options(props);

            if name == GLOBAL_SECTION {
                if let Some(raw) = options.get("audience_json") {
                    settings.audience = Audience::from_json(raw)?;
                } else if let Some(raw) = options.get("audience") {
                    settings.audience = Audience::from_literal(raw);
                }
                continue;
            }

            if !name.to_lowercase().starts_with(ISSUER_SECTION_PREFIX) {
                continue;
            }

            let Some(issuer) = options.get("issuer") else {
                tracing::warn!(section = name, "ignoring section without an `issuer` option");
                continue;
            };
            let Some(base_path) = options.get("base_path") else {
                tracing::warn!(section = name, "ignoring section without a `base_path` option");
                continue;
            };

            let mut config = IssuerConfig::new(*issuer, base_path)
                .with_impersonation(flag(name, &options, "impersonation")?)
                .with_map_subject(flag(name, &options, "map_subject")?);
            if let Some(file) = options.get("jwks_file") {
                config = config.with_jwks_file(*file);
            }

            tracing::info!(
                section = name,
                issuer = %config.issuer_url,
                base_path = %config.base_path,
                impersonation = config.use_impersonation,
                map_subject = config.map_subject,
                "configured token access"
            );

            if settings.registry.register(config).is_some() {
                tracing::info!(section = name, "issuer configured more than once; later section wins");
            }
        }

        Ok(settings)
    }
}

fn lowercase_options(props: &Properties) -> HashMap<String, &str> {
    props
        .iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim()))
        .collect()
}

fn flag(
    section: &str,
    options: &HashMap<String, &str>,
    key: &'static str,
) -> Result<bool, ConfigFileError> {
    let Some(value) = options.get(key) else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(ConfigFileError::InvalidBool {
            section: section.to_string(),
            key,
            value: value.to_string(),
        }),
    }
}
