//! Configuration management

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthnVerifier, DigestAlgorithm, TrustSigner};
use crate::client::ClientConfig;
use crate::directory::KeyPolicy;
use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trust-header handshake configuration
    pub trust: TrustConfig,
    /// Identity-directory source configuration
    pub identity: IdentityConfig,
    /// Certificate cache configuration
    pub tls: TlsConfig,
    /// Outbound HTTP client configuration
    pub client: ClientSettings,
}

/// Trust-header handshake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Path to the shared-secret file. Empty disables the handshake
    /// entirely (every request passes — logged as a warning at runtime).
    pub key_file: String,
    /// Digest algorithm: `sha1` (protocol default) or `sha256`.
    pub digest: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            key_file: String::new(),
            digest: "sha1".to_string(),
        }
    }
}

impl TrustConfig {
    /// Build the verifier this configuration describes.
    pub fn verifier(&self) -> Result<AuthnVerifier> {
        let algorithm = match self.digest.to_lowercase().as_str() {
            "sha1" => DigestAlgorithm::Sha1,
            "sha256" => DigestAlgorithm::Sha256,
            other => {
                return Err(Error::Config(format!("unknown digest algorithm '{other}'")));
            }
        };
        if self.key_file.is_empty() {
            return Ok(AuthnVerifier::disabled());
        }
        let signer = TrustSigner::from_key_file(&self.key_file)?.with_algorithm(algorithm);
        Ok(AuthnVerifier::new(signer))
    }
}

/// Identity-directory source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// HTTPS endpoint serving the identity-record JSON array.
    pub url: String,
    /// Local JSON file, used when `url` is empty.
    pub file: String,
    /// Directory key policy token: `login`, `id`, `name`, `dn`, `sorted-dn`.
    pub key_policy: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            file: String::new(),
            key_policy: "login".to_string(),
        }
    }
}

impl IdentityConfig {
    /// Parse the configured key policy.
    pub fn key_policy(&self) -> Result<KeyPolicy> {
        self.key_policy.parse()
    }
}

/// Certificate cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Seconds between certificate re-reads.
    pub renew_interval_secs: u64,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            renew_interval_secs: 600,
        }
    }
}

impl TlsConfig {
    /// Renew interval as a [`Duration`].
    #[must_use]
    pub fn renew_interval(&self) -> Duration {
        Duration::from_secs(self.renew_interval_secs)
    }
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Bearer token or token file path; empty means certificate auth.
    pub token: String,
    /// Request timeout in seconds; zero means no timeout.
    pub timeout_secs: u64,
    /// Skip server certificate verification (private grid CAs).
    pub accept_invalid_certs: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            timeout_secs: 0,
            accept_invalid_certs: false,
        }
    }
}

impl ClientSettings {
    /// Resolve into the client builder's config.
    #[must_use]
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            token: if self.token.is_empty() {
                None
            } else {
                Some(self.token.clone())
            },
            timeout: if self.timeout_secs == 0 {
                None
            } else {
                Some(Duration::from_secs(self.timeout_secs))
            },
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file with `CMS_TRUST_*`
    /// environment overrides (nested keys split on `__`, e.g.
    /// `CMS_TRUST_TRUST__KEY_FILE`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("CMS_TRUST_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }
}
