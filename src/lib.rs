//! cms-trust Library
//!
//! Header-based authentication/authorization handshake for gateway-fronted
//! services, plus the identity-directory indexing that maps external identity
//! records onto authorization roles.
//!
//! # Features
//!
//! - **Trust headers**: canonical, length-prefixed encoding of the
//!   `cms-authn-*` / `cms-authz-*` header bundle
//! - **HMAC handshake**: SHA-1 keyed signing (protocol default) with an
//!   explicit unkeyed degraded mode and opt-in SHA-256
//! - **Authorization matching**: loose substring role/group/site policy
//! - **Identity directory**: deduplicated key→record map built from external
//!   JSON identity records, with canonical DN keying
//! - **Certificate cache**: lock-serialized, clock-injected refresh of client
//!   certificate bundles for the outbound HTTP client
//!
//! The front-end gateway stamps the trust headers and their signature;
//! backends verify the bundle and consult the directory when mapping the
//! asserted identity onto local roles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod tls;

pub use auth::{AuthnVerifier, HeaderSet, TrustSigner, Verification, authorize};
pub use directory::{IdentityDirectory, IdentityRecord, KeyPolicy, sorted_dn};
pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
