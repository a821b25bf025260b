//! Identity-record loading from file or HTTPS.
//!
//! Thin I/O wrappers around the indexer: read or fetch the JSON array of
//! records, decode it, and hand it to [`build_directory`]. A failed read is
//! [`crate::Error::SourceUnavailable`]; malformed JSON is a decode error —
//! the caller never receives a silently partial directory.

use std::path::Path;

use reqwest::Client;
use tracing::debug;

use crate::directory::index::{IdentityDirectory, KeyPolicy, build_directory};
use crate::directory::record::IdentityRecord;
use crate::{Error, Result};

/// Read identity records from a local JSON file.
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<IdentityRecord>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        Error::SourceUnavailable(format!("cannot read identity file '{}': {e}", path.display()))
    })?;
    let entries: Vec<IdentityRecord> = serde_json::from_slice(&bytes)?;
    debug!(count = entries.len(), path = %path.display(), "loaded identity records");
    Ok(entries)
}

/// Fetch identity records from an HTTPS endpoint.
pub async fn fetch_entries(client: &Client, url: &str) -> Result<Vec<IdentityRecord>> {
    debug!(url = %url, "fetching identity records");
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(Error::SourceUnavailable(format!(
            "identity source '{url}' returned HTTP {}",
            response.status()
        )));
    }

    let entries: Vec<IdentityRecord> = response.json().await?;
    debug!(count = entries.len(), url = %url, "fetched identity records");
    Ok(entries)
}

/// Load a directory from a local JSON file under the given key policy.
pub fn load_directory(path: impl AsRef<Path>, policy: KeyPolicy) -> Result<IdentityDirectory> {
    Ok(build_directory(read_entries(path)?, policy))
}

/// Fetch a directory from an HTTPS endpoint under the given key policy.
pub async fn fetch_directory(
    client: &Client,
    url: &str,
    policy: KeyPolicy,
) -> Result<IdentityDirectory> {
    Ok(build_directory(fetch_entries(client, url).await?, policy))
}
