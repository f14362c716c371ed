//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Connection settings for the remote signup functions host.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL, e.g. `https://project.functions.example.com`.
    pub base_url: String,
    /// Bearer credential sent with every request.
    pub api_key: SecretString,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    /// Port the JSON API listens on.
    pub port: u16,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
    /// How often idle sessions are swept.
    pub sweep_interval: Duration,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;
    pub const DEFAULT_SWEEP_SECS: u64 = 60;

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("SIGNUP_SERVICE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("SIGNUP_SERVICE_URL".to_string()))?;
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "SIGNUP_SERVICE_URL".to_string(),
                message: format!("expected an http(s) URL, got {base_url:?}"),
            });
        }

        let api_key = lookup("SIGNUP_SERVICE_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("SIGNUP_SERVICE_KEY".to_string()))?;

        let port: u16 = lookup("SIGNUP_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::DEFAULT_PORT);

        let idle_secs: u64 = lookup("SIGNUP_SESSION_IDLE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::DEFAULT_SESSION_IDLE_SECS);

        let sweep_secs: u64 = lookup("SIGNUP_SESSION_SWEEP_SECS")
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(Self::DEFAULT_SWEEP_SECS);

        Ok(Self {
            service: ServiceConfig {
                base_url,
                api_key: SecretString::from(api_key),
            },
            port,
            session_idle_timeout: Duration::from_secs(idle_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}
