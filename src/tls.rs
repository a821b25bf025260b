//! Client-certificate cache for the outbound HTTP client.
//!
//! Grid deployments rotate short-lived proxy certificates on disk (a cron
//! job renews them); re-reading the files on every request is wasteful and
//! racing the renewal is worse. The cache serializes refreshes behind a
//! mutex and re-reads only after a renew interval. On a refresh failure the
//! previously loaded bundle keeps serving live traffic, with the expiry
//! pushed out by a grace window while the certificate itself is still valid
//! — a failed renewal must not take down outbound calls.
//!
//! The clock is injected so interval and fallback logic are testable without
//! real time delays; there is no process-wide singleton.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{debug, warn};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::{Error, Result};

/// Grace window granted after a failed refresh, while the cached
/// certificate itself remains valid that long.
const REFRESH_GRACE: Duration = Duration::from_secs(600);

/// Time source for the cache. Inject a fake in tests.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> SystemTime;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Supplies the PEM bundle (certificate chain plus private key).
pub trait CertSource: Send + Sync {
    /// Load a fresh PEM bundle.
    fn load(&self) -> Result<Vec<u8>>;
}

/// Certificate material resolved from the conventional grid locations.
///
/// Prefers the proxy file (`X509_USER_PROXY`), which already carries both
/// certificate and key; otherwise concatenates the `X509_USER_CERT` /
/// `X509_USER_KEY` pair.
#[derive(Debug, Clone, Default)]
pub struct ProxyFiles {
    /// Proxy file carrying certificate and key in one PEM bundle.
    pub proxy: Option<PathBuf>,
    /// User certificate file.
    pub cert: Option<PathBuf>,
    /// User key file.
    pub key: Option<PathBuf>,
}

impl ProxyFiles {
    /// Resolve paths from the `X509_USER_PROXY`, `X509_USER_CERT` and
    /// `X509_USER_KEY` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            proxy: var("X509_USER_PROXY"),
            cert: var("X509_USER_CERT"),
            key: var("X509_USER_KEY"),
        }
    }

    /// Whether any certificate material is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.proxy.is_some() || (self.cert.is_some() && self.key.is_some())
    }
}

impl CertSource for ProxyFiles {
    fn load(&self) -> Result<Vec<u8>> {
        if let Some(proxy) = &self.proxy {
            debug!(path = %proxy.display(), "loading proxy certificate");
            return std::fs::read(proxy).map_err(|e| {
                Error::SourceUnavailable(format!("cannot read proxy '{}': {e}", proxy.display()))
            });
        }
        if let (Some(cert), Some(key)) = (&self.cert, &self.key) {
            debug!(cert = %cert.display(), key = %key.display(), "loading user certificate pair");
            let mut bundle = std::fs::read(cert).map_err(|e| {
                Error::SourceUnavailable(format!("cannot read cert '{}': {e}", cert.display()))
            })?;
            bundle.push(b'\n');
            bundle.extend(std::fs::read(key).map_err(|e| {
                Error::SourceUnavailable(format!("cannot read key '{}': {e}", key.display()))
            })?);
            return Ok(bundle);
        }
        Err(Error::Config(
            "no client certificate material configured".to_string(),
        ))
    }
}

struct CacheState {
    pem: Option<Vec<u8>>,
    expire: Option<SystemTime>,
}

/// Lock-serialized, interval-refreshed certificate bundle.
pub struct CertificateCache<S = ProxyFiles, C = SystemClock> {
    source: S,
    clock: C,
    renew_interval: Duration,
    state: Mutex<CacheState>,
}

impl<S: CertSource> CertificateCache<S, SystemClock> {
    /// Cache over `source`, re-reading after `renew_interval`.
    pub fn new(source: S, renew_interval: Duration) -> Self {
        Self::with_clock(source, renew_interval, SystemClock)
    }
}

impl<S: CertSource, C: Clock> CertificateCache<S, C> {
    /// Cache with an injected clock.
    pub fn with_clock(source: S, renew_interval: Duration, clock: C) -> Self {
        Self {
            source,
            clock,
            renew_interval,
            state: Mutex::new(CacheState {
                pem: None,
                expire: None,
            }),
        }
    }

    /// Current PEM bundle, refreshed when the renew interval elapsed.
    ///
    /// At most one refresh runs at a time; concurrent callers block on the
    /// lock and observe the refreshed bundle. A refresh failure surfaces as
    /// an error only when no bundle was ever loaded.
    pub fn pem_bundle(&self) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        let now = self.clock.now();

        if let Some(pem) = &state.pem {
            if state.expire.is_some_and(|expire| now < expire) {
                return Ok(pem.clone());
            }
        }

        match self.source.load() {
            Ok(pem) => {
                debug!(renew_interval = ?self.renew_interval, "refreshed certificate bundle");
                state.pem = Some(pem.clone());
                state.expire = Some(now + self.renew_interval);
                Ok(pem)
            }
            Err(err) => {
                let Some(pem) = state.pem.clone() else {
                    return Err(err);
                };
                // stale-but-valid bundle keeps serving; extend the window
                // only while the certificate outlives it
                let grace = now + REFRESH_GRACE;
                if min_not_after(&pem).is_some_and(|not_after| not_after > grace) {
                    state.expire = Some(grace);
                }
                warn!(error = %err, "certificate refresh failed, serving cached bundle");
                Ok(pem)
            }
        }
    }
}

/// Minimum `notAfter` across the certificates in a PEM bundle.
fn min_not_after(pem: &[u8]) -> Option<SystemTime> {
    let mut earliest: Option<SystemTime> = None;
    for der in rustls_pemfile::certs(&mut &pem[..]).flatten() {
        if let Ok((_, cert)) = X509Certificate::from_der(der.as_ref()) {
            let ts = cert.validity().not_after.timestamp();
            if ts >= 0 {
                let not_after = SystemTime::UNIX_EPOCH + Duration::from_secs(ts.unsigned_abs());
                earliest = Some(earliest.map_or(not_after, |e| e.min(not_after)));
            }
        }
    }
    earliest
}
