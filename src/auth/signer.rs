//! Trust-header digest computation.
//!
//! The signer owns the shared secret loaded at startup and turns a canonical
//! signing string into a lower-hex digest. Keyed and unkeyed operation are
//! distinct, explicit modes: callers and tests can assert which one is
//! active instead of guessing from key length.

use hmac::{Hmac, KeyInit, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{Error, Result};

/// Digest algorithm used for signing.
///
/// SHA-1 is the deployed protocol default and must stay the default for
/// compatibility; SHA-256 is available for deployments that negotiated it
/// out of band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// HMAC-SHA1 / SHA-1 (protocol default).
    #[default]
    Sha1,
    /// HMAC-SHA256 / SHA-256 (opt-in).
    Sha256,
}

/// Signing mode.
#[derive(Clone, PartialEq, Eq)]
pub enum SignerMode {
    /// Keyed HMAC over the canonical string.
    Keyed(Vec<u8>),
    /// Plain hash over the canonical string.
    ///
    /// Degraded, collision-susceptible mode used only when no trust file is
    /// configured. Anyone who can forge headers can forge the digest; it
    /// protects against accidental corruption, not against an attacker.
    Unkeyed,
}

impl std::fmt::Debug for SignerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key material
        match self {
            Self::Keyed(key) => f.debug_tuple("Keyed").field(&format!("<{} bytes>", key.len())).finish(),
            Self::Unkeyed => f.write_str("Unkeyed"),
        }
    }
}

/// Computes and checks trust-header digests.
#[derive(Debug, Clone)]
pub struct TrustSigner {
    mode: SignerMode,
    algorithm: DigestAlgorithm,
}

impl TrustSigner {
    /// Keyed signer over the given shared secret.
    #[must_use]
    pub fn keyed(key: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: SignerMode::Keyed(key.into()),
            algorithm: DigestAlgorithm::default(),
        }
    }

    /// Unkeyed signer (plain hash, degraded mode).
    #[must_use]
    pub fn unkeyed() -> Self {
        Self {
            mode: SignerMode::Unkeyed,
            algorithm: DigestAlgorithm::default(),
        }
    }

    /// Select a non-default digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Load the shared secret from a trust-key file.
    ///
    /// An empty file yields an unkeyed signer — the key material is absent,
    /// so only the degraded plain-hash mode is possible. An unreadable file
    /// is [`Error::SourceUnavailable`], surfaced to the caller rather than
    /// silently downgrading.
    pub fn from_key_file(path: &str) -> Result<Self> {
        let key = std::fs::read(path).map_err(|e| {
            Error::SourceUnavailable(format!("cannot read trust key file '{path}': {e}"))
        })?;
        if key.is_empty() {
            tracing::warn!(path = %path, "trust key file is empty, falling back to unkeyed digests");
            return Ok(Self::unkeyed());
        }
        Ok(Self::keyed(key))
    }

    /// Active signing mode.
    #[must_use]
    pub fn mode(&self) -> &SignerMode {
        &self.mode
    }

    /// Whether the signer holds key material.
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        matches!(self.mode, SignerMode::Keyed(_))
    }

    /// Compute the lower-hex digest of a canonical signing string.
    pub fn sign(&self, canonical: &str) -> Result<String> {
        let data = canonical.as_bytes();
        let digest = match (&self.mode, self.algorithm) {
            (SignerMode::Keyed(key), DigestAlgorithm::Sha1) => {
                let mut mac = Hmac::<Sha1>::new_from_slice(key)
                    .map_err(|e| Error::Config(format!("Invalid trust key: {e}")))?;
                mac.update(data);
                hex::encode(mac.finalize().into_bytes())
            }
            (SignerMode::Keyed(key), DigestAlgorithm::Sha256) => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key)
                    .map_err(|e| Error::Config(format!("Invalid trust key: {e}")))?;
                mac.update(data);
                hex::encode(mac.finalize().into_bytes())
            }
            (SignerMode::Unkeyed, DigestAlgorithm::Sha1) => hex::encode(Sha1::digest(data)),
            (SignerMode::Unkeyed, DigestAlgorithm::Sha256) => hex::encode(Sha256::digest(data)),
        };
        Ok(digest)
    }

    /// Check a presented hex digest against the canonical string.
    ///
    /// Constant-time comparison to prevent timing side-channels.
    pub fn matches(&self, canonical: &str, presented: &str) -> Result<bool> {
        let computed = self.sign(canonical)?;
        Ok(computed.as_bytes().ct_eq(presented.as_bytes()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_and_unkeyed_are_distinct_modes() {
        let keyed = TrustSigner::keyed(b"secret".to_vec());
        let unkeyed = TrustSigner::unkeyed();
        assert!(keyed.is_keyed());
        assert!(!unkeyed.is_keyed());
        assert_ne!(
            keyed.sign("h3v1#abc").unwrap(),
            unkeyed.sign("h3v1#abc").unwrap()
        );
    }

    #[test]
    fn sha1_digest_is_forty_hex_chars() {
        let digest = TrustSigner::keyed(b"secret".to_vec()).sign("payload").unwrap();
        assert_eq!(digest.len(), 40);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unkeyed_sha1_matches_known_vector() {
        // sha1("abc")
        let digest = TrustSigner::unkeyed().sign("abc").unwrap();
        assert_eq!(digest, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn sha256_is_opt_in_and_longer() {
        let signer = TrustSigner::keyed(b"secret".to_vec()).with_algorithm(DigestAlgorithm::Sha256);
        assert_eq!(signer.sign("payload").unwrap().len(), 64);
    }

    #[test]
    fn matches_accepts_own_digest_and_rejects_others() {
        let signer = TrustSigner::keyed(b"secret".to_vec());
        let digest = signer.sign("canonical").unwrap();
        assert!(signer.matches("canonical", &digest).unwrap());
        assert!(!signer.matches("canonical", "0000").unwrap());
        assert!(!signer.matches("different", &digest).unwrap());
    }

    #[test]
    fn key_file_loading_distinguishes_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();

        let keyed_path = dir.path().join("key");
        std::fs::write(&keyed_path, b"shared-secret").unwrap();
        assert!(TrustSigner::from_key_file(keyed_path.to_str().unwrap())
            .unwrap()
            .is_keyed());

        let empty_path = dir.path().join("empty");
        std::fs::write(&empty_path, b"").unwrap();
        assert!(!TrustSigner::from_key_file(empty_path.to_str().unwrap())
            .unwrap()
            .is_keyed());

        let missing = TrustSigner::from_key_file("/nonexistent/trust.key");
        assert!(matches!(missing, Err(crate::Error::SourceUnavailable(_))));
    }

    #[test]
    fn debug_never_prints_key_material() {
        let signer = TrustSigner::keyed(b"super-secret".to_vec());
        let rendered = format!("{signer:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
