//! Outbound HTTP client construction.
//!
//! Builds the cert/token-aware `reqwest::Client` used to fetch identity
//! records and to call downstream services. When a bearer token is
//! configured the client skips client certificates entirely; otherwise the
//! PEM bundle (typically from a [`crate::tls::CertificateCache`]) becomes
//! the TLS identity.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::{Error, Result};

/// Outbound client settings.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Bearer token, or a path to a file holding one (see [`read_token`]).
    /// When set, client certificates are not used.
    pub token: Option<String>,
    /// Request timeout; `None` means no timeout.
    pub timeout: Option<Duration>,
    /// Skip server certificate verification.
    ///
    /// Grid endpoints commonly present host certificates from private CAs;
    /// the deployed protocol accepts them. Leave off unless talking to such
    /// an endpoint.
    pub accept_invalid_certs: bool,
}

/// Resolve a token value: when it names an existing file, the file's
/// contents with newlines stripped; otherwise the literal string.
pub fn read_token(value: &str) -> Result<String> {
    if Path::new(value).exists() {
        let contents = std::fs::read_to_string(value).map_err(|e| {
            Error::SourceUnavailable(format!("cannot read token file '{value}': {e}"))
        })?;
        return Ok(contents.replace('\n', ""));
    }
    Ok(value.to_string())
}

/// Build the outbound client.
///
/// `identity_pem` is the client certificate bundle (certificate chain plus
/// key, PEM); pass `None` for a plain client. It is ignored when a token is
/// configured, since token auth supersedes certificate auth.
pub fn build_client(config: &ClientConfig, identity_pem: Option<&[u8]>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if config.accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if config.token.is_none() {
        if let Some(pem) = identity_pem {
            let identity = reqwest::Identity::from_pem(pem)?;
            builder = builder.identity(identity);
            debug!("outbound client configured with client certificate");
        }
    } else {
        debug!("outbound client configured for token auth");
    }

    Ok(builder.build()?)
}
