//! Trust-header authentication and authorization.
//!
//! Provides the canonical-header HMAC handshake used by the front-end
//! gateway to vouch for a user's identity, and the substring-based
//! role/group/site authorization matcher.

pub mod authz;
pub mod canonical;
pub mod headers;
pub mod signer;
pub mod verifier;

pub use authz::authorize;
pub use canonical::canonical_signing_string;
pub use headers::HeaderSet;
pub use signer::{DigestAlgorithm, SignerMode, TrustSigner};
pub use verifier::{AllowAll, AuthnVerifier, Authorizer, DenyReason, Verification};
