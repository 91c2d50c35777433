//! Runtime configuration.
//!
//! Read once at start-up from environment variables. Unset variables fall
//! back to the defaults below.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Default health and metrics port
pub const HEALTH_PORT: u16 = 8080;

/// Errors reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A port variable is not a valid u16
    #[error("invalid port in {var}: {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

/// Webhook process configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    /// HTTPS port serving admission reviews
    pub webhook_port: u16,
    /// Plain HTTP port serving probes and metrics
    pub health_port: u16,
    /// PEM certificate for the webhook server
    pub cert_path: PathBuf,
    /// PEM private key for the webhook server
    pub key_path: PathBuf,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
            cert_path: PathBuf::from(WEBHOOK_CERT_PATH),
            key_path: PathBuf::from(WEBHOOK_KEY_PATH),
        }
    }
}

impl WebhookConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            webhook_port: port(&lookup, "WEBHOOK_PORT", defaults.webhook_port)?,
            health_port: port(&lookup, "HEALTH_PORT", defaults.health_port)?,
            cert_path: lookup("WEBHOOK_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
        })
    }

    /// Whether both TLS files exist on disk.
    pub fn tls_files_present(&self) -> bool {
        self.cert_path.exists() && self.key_path.exists()
    }
}

fn port<F>(lookup: &F, var: &'static str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { var, value }),
        None => {
            debug!(var, default, "Port not set, using default");
            Ok(default)
        }
    }
}
