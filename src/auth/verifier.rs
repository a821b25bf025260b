//! Authentication verification over the trust-header bundle.
//!
//! The verifier inspects `cms-auth-status`, canonicalizes the trust headers,
//! and checks the presented digest. Instead of mutating the caller's header
//! collection, a successful verification returns a derived header map with
//! the `cms-authn-` prefixes stripped (`cms-authn-login` → `login`), which
//! downstream authorization logic consumes.

use tracing::{debug, warn};

use crate::auth::canonical::{AUTH_STATUS_HEADER, AUTHN_PREFIX, HMAC_HEADER, canonical_signing_string};
use crate::auth::headers::HeaderSet;
use crate::auth::signer::TrustSigner;
use crate::{Error, Result};

/// Why authentication was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No `cms-auth-status` header present.
    MissingAuthStatus,
    /// No `cms-authn-hmac` header to check against.
    MissingSignature,
    /// Computed digest disagrees with the presented one.
    SignatureMismatch,
}

/// Outcome of verifying a trust-header bundle.
///
/// A denial is an expected, frequent outcome — it is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The bundle verified.
    Authenticated {
        /// `cms-authn-*` headers re-exposed under their prefix-stripped
        /// names, for downstream consumers.
        derived: HeaderSet,
    },
    /// The bundle did not verify.
    Denied(DenyReason),
}

impl Verification {
    /// Whether the bundle verified.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Authorization hook consulted after successful authentication.
///
/// The default [`AllowAll`] passes everything; deployments override this to
/// plug in their own policy without re-implementing the handshake.
pub trait Authorizer: Send + Sync {
    /// Whether the (already authenticated) request is authorized.
    fn authorize(&self, headers: &HeaderSet) -> bool;
}

/// Authorization hook that accepts every authenticated request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _headers: &HeaderSet) -> bool {
        true
    }
}

/// Verifies the trust-header handshake stamped by the front-end gateway.
pub struct AuthnVerifier {
    signer: Option<TrustSigner>,
    authorizer: Box<dyn Authorizer>,
}

impl AuthnVerifier {
    /// Verifier backed by the given signer.
    #[must_use]
    pub fn new(signer: TrustSigner) -> Self {
        Self {
            signer: Some(signer),
            authorizer: Box::new(AllowAll),
        }
    }

    /// Verifier with the whole subsystem disabled: [`AuthnVerifier::check`]
    /// always succeeds. Distinct from the unkeyed signer mode — no digest is
    /// checked at all.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            signer: None,
            authorizer: Box::new(AllowAll),
        }
    }

    /// Build from a trust-key file path.
    ///
    /// An empty path disables the subsystem entirely; a readable file yields
    /// a keyed (or, for an empty file, unkeyed) signer. These are two
    /// distinct degraded modes: "disabled" skips verification, "unkeyed"
    /// still checks a plain hash.
    pub fn from_key_file(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self::disabled());
        }
        Ok(Self::new(TrustSigner::from_key_file(path)?))
    }

    /// Replace the authorization hook.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Box::new(authorizer);
        self
    }

    /// Whether verification is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.signer.is_some()
    }

    /// Verify the authentication assertions carried by `headers`.
    ///
    /// Errors only on signer faults; an unauthenticated request is a
    /// [`Verification::Denied`] value.
    pub fn verify(&self, headers: &HeaderSet) -> Result<Verification> {
        let Some(signer) = &self.signer else {
            warn!("trust key not configured, authentication disabled");
            return Ok(Verification::Authenticated {
                derived: HeaderSet::new(),
            });
        };

        let Some(status_values) = headers.get(AUTH_STATUS_HEADER) else {
            return Ok(Verification::Denied(DenyReason::MissingAuthStatus));
        };
        if status_values.len() == 1 && status_values[0] == "NONE" {
            // user authentication is optional on this endpoint
            return Ok(Verification::Authenticated {
                derived: HeaderSet::new(),
            });
        }

        let Some(presented) = headers.first(HMAC_HEADER) else {
            return Ok(Verification::Denied(DenyReason::MissingSignature));
        };

        let canonical = canonical_signing_string(headers);
        if !signer.matches(&canonical, presented)? {
            debug!("trust header digest mismatch");
            return Ok(Verification::Denied(DenyReason::SignatureMismatch));
        }

        Ok(Verification::Authenticated {
            derived: derive_stripped_headers(headers),
        })
    }

    /// Compute the digest over the trust headers already placed in `headers`
    /// and stamp it into `cms-authn-hmac`, returning the digest.
    ///
    /// Callers set the other `cms-authn-*`/`cms-authz-*` values first.
    pub fn stamp(&self, headers: &mut HeaderSet) -> Result<String> {
        let Some(signer) = &self.signer else {
            return Err(Error::Config(
                "cannot stamp trust headers without a configured signer".to_string(),
            ));
        };
        let digest = signer.sign(&canonical_signing_string(headers))?;
        headers.set(HMAC_HEADER, digest.clone());
        Ok(digest)
    }

    /// Combined authentication and authorization check.
    ///
    /// With the subsystem disabled this always succeeds, which turns off
    /// real protection — it is logged so operators can see it.
    pub fn check(&self, headers: &HeaderSet) -> Result<bool> {
        if self.signer.is_none() {
            warn!("trust key not configured, authentication disabled");
            return Ok(true);
        }
        if !self.verify(headers)?.is_authenticated() {
            return Ok(false);
        }
        Ok(self.authorizer.authorize(headers))
    }
}

/// Re-expose every `cms-authn-*` header under its prefix-stripped name.
fn derive_stripped_headers(headers: &HeaderSet) -> HeaderSet {
    let prefix = format!("{AUTHN_PREFIX}-");
    let mut derived = HeaderSet::new();
    for (name, values) in headers.iter() {
        if name == HMAC_HEADER {
            continue;
        }
        if let Some(stripped) = name.strip_prefix(&prefix) {
            for value in values {
                derived.insert(stripped, value.clone());
            }
        }
    }
    derived
}
