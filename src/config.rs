/*
 * Responsibility
 * - Process settings: CLI arguments (with env fallbacks) and env-only tunables
 * - Validation of those values (invalid -> startup failure)
 * - Issuer / audience settings live in the INI file named by `--config`
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Authorize HTTP requests on behalf of a front-end server using bearer capability tokens.
#[derive(Parser, Debug, Clone)]
#[command(name = "scitokens-authz", version, about)]
pub struct Args {
    /// Location of the configuration file
    #[arg(
        short,
        long,
        env = "AUTHZ_CONFIG",
        value_name = "FILE",
        default_value = "/etc/scitokens/authorizer.cfg"
    )]
    pub config: PathBuf,

    /// Address the auth-check endpoint listens on
    #[arg(long, env = "AUTHZ_LISTEN", default_value = "127.0.0.1:1234")]
    pub listen: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub config_path: PathBuf,
    pub app_env: AppEnv,

    // Upper bound for a single impersonation probe
    pub probe_timeout: Duration,
    // Clock skew tolerated on exp/nbf
    pub token_leeway_seconds: u64,
    // Issuer metadata / JWKS fetches
    pub jwks_timeout: Duration,
    // Whole-request bound applied by the HTTP middleware
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let probe_timeout = Duration::from_secs(env_u64("AUTHZ_PROBE_TIMEOUT_SECONDS", 5)?);
        let token_leeway_seconds = env_u64("AUTHZ_TOKEN_LEEWAY_SECONDS", 60)?;
        let jwks_timeout = Duration::from_secs(env_u64("AUTHZ_JWKS_TIMEOUT_SECONDS", 10)?);
        let request_timeout = Duration::from_secs(env_u64("AUTHZ_REQUEST_TIMEOUT_SECONDS", 30)?);

        if probe_timeout >= request_timeout {
            return Err(ConfigError::Invalid("AUTHZ_PROBE_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr: args.listen,
            config_path: args.config,
            app_env: AppEnv::from_env(),
            probe_timeout,
            token_leeway_seconds,
            jwks_timeout,
            request_timeout,
        })
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}
