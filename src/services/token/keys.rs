//! Signing keys for each configured issuer.
//!
//! Keys come from the issuer's `jwks_file` when one is configured, otherwise
//! from the issuer's published metadata (`jwks_uri`). A failure for one issuer
//! is logged and leaves that issuer without keys; it does not stop startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use serde::Deserialize;
use thiserror::Error;

use crate::services::authz::{IssuerConfig, IssuerRegistry};

const METADATA_PATHS: [&str; 2] = [
    ".well-known/openid-configuration",
    ".well-known/oauth-authorization-server",
];

#[derive(Debug, Error)]
pub enum KeyFetchError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JWKS document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid issuer URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("issuer metadata has no jwks_uri")]
    MissingJwksUri,
}

#[derive(Debug, Deserialize)]
struct IssuerMetadata {
    jwks_uri: Option<String>,
}

/// Issuer URL → key set.
pub type IssuerKeys = HashMap<String, JwkSet>;

pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub async fn load_issuer_keys(registry: &IssuerRegistry, client: &reqwest::Client) -> IssuerKeys {
    let mut keys = IssuerKeys::new();

    for issuer in registry.iter() {
        match load_one(issuer, client).await {
            Ok(set) => {
                tracing::info!(issuer = %issuer.issuer_url, keys = set.keys.len(), "loaded issuer signing keys");
                keys.insert(issuer.issuer_url.clone(), set);
            }
            Err(err) => {
                tracing::error!(issuer = %issuer.issuer_url, error = %err, "failed to load issuer signing keys");
            }
        }
    }

    keys
}

async fn load_one(issuer: &IssuerConfig, client: &reqwest::Client) -> Result<JwkSet, KeyFetchError> {
    match &issuer.jwks_file {
        Some(path) => read_jwks_file(path),
        None => discover(client, &issuer.issuer_url).await,
    }
}

pub fn read_jwks_file(path: &Path) -> Result<JwkSet, KeyFetchError> {
    let raw = std::fs::read_to_string(path).map_err(|source| KeyFetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// `https://issuer.example/x` + `.well-known/...` → `https://issuer.example/x/.well-known/...`
pub fn metadata_url(issuer_url: &str, well_known: &str) -> Result<url::Url, url::ParseError> {
    let base = format!("{}/", issuer_url.trim_end_matches('/'));
    url::Url::parse(&base)?.join(well_known)
}

async fn discover(client: &reqwest::Client, issuer_url: &str) -> Result<JwkSet, KeyFetchError> {
    let mut last_err = KeyFetchError::MissingJwksUri;

    for well_known in METADATA_PATHS {
        let url = metadata_url(issuer_url, well_known)?;
        let metadata = match fetch_json::<IssuerMetadata>(client, url.as_str()).await {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::debug!(%url, error = %err, "issuer metadata not available");
                last_err = err;
                continue;
            }
        };

        let Some(jwks_uri) = metadata.jwks_uri else {
            last_err = KeyFetchError::MissingJwksUri;
            continue;
        };
        return fetch_json::<JwkSet>(client, &jwks_uri).await;
    }

    Err(last_err)
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, KeyFetchError> {
    let value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await?;
    Ok(value)
}
