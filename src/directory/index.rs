//! Identity-directory construction.
//!
//! Builds the key→record lookup map from a materialized batch of records.
//! Duplicate keys merge into a survivor record: the first-seen record keeps
//! its scalar fields and absorbs the newcomer's DN into its alternate-DN
//! list. The build is one-shot and single-threaded; the finished directory
//! is never mutated, so concurrent readers need no locking.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::str::FromStr;

use tracing::debug;

use crate::directory::dn::sorted_dn;
use crate::directory::record::IdentityRecord;
use crate::{Error, Result};

/// Deduplicated key→record map.
pub type IdentityDirectory = HashMap<String, IdentityRecord>;

/// Which record field keys the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Login name.
    Login,
    /// Numeric ID rendered as a decimal string.
    Id,
    /// Display name.
    Name,
    /// Raw distinguished name.
    Dn,
    /// Canonicalized distinguished name (see [`sorted_dn`]).
    SortedDn,
}

impl KeyPolicy {
    fn key_for(self, record: &IdentityRecord) -> String {
        match self {
            Self::Login => record.login.clone(),
            Self::Id => record.id.to_string(),
            Self::Name => record.name.clone(),
            Self::Dn => record.dn.clone(),
            Self::SortedDn => record
                .sorted_dn
                .clone()
                .unwrap_or_else(|| sorted_dn(&record.dn)),
        }
    }
}

impl FromStr for KeyPolicy {
    type Err = Error;

    /// Parse a key-policy token.
    ///
    /// Unknown tokens are a hard [`Error::UnsupportedKeyPolicy`], never a
    /// silent default.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "dn" => Ok(Self::Dn),
            "sorted-dn" | "sorted_dn" | "sorteddn" => Ok(Self::SortedDn),
            other => Err(Error::UnsupportedKeyPolicy(other.to_string())),
        }
    }
}

/// Build a directory from `entries` in input order.
///
/// A record whose key is already present merges into the existing survivor:
/// only the survivor's alternate-DN list grows; its other fields keep their
/// first-seen values. A record with a fresh key is stored with its own DN
/// seeded into its alternate-DN list. When keying by sorted DN the computed
/// canonical DN is recorded on the stored entry.
#[must_use]
pub fn build_directory(entries: Vec<IdentityRecord>, policy: KeyPolicy) -> IdentityDirectory {
    let mut directory = IdentityDirectory::with_capacity(entries.len());
    for mut record in entries {
        if policy == KeyPolicy::SortedDn {
            record.sorted_dn = Some(sorted_dn(&record.dn));
        }
        let key = policy.key_for(&record);
        match directory.entry(key) {
            Entry::Occupied(mut survivor) => {
                debug!(
                    key = %survivor.key(),
                    dn = %record.dn,
                    "duplicate identity record, absorbing DN into survivor"
                );
                survivor.get_mut().dns.push(record.dn);
            }
            Entry::Vacant(slot) => {
                record.dns.push(record.dn.clone());
                slot.insert(record);
            }
        }
    }
    directory
}

/// [`build_directory`] with the key policy supplied as a string token.
pub fn build_directory_by_key(
    entries: Vec<IdentityRecord>,
    key: &str,
) -> Result<IdentityDirectory> {
    Ok(build_directory(entries, key.parse()?))
}
