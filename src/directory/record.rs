//! External identity record shape.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One external identity entry.
///
/// Decoded from the upstream JSON document; never mutated after insertion
/// into the directory except to append alternate DNs when a duplicate key is
/// discovered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Primary distinguished name.
    #[serde(rename = "DN", default)]
    pub dn: String,

    /// All DNs assigned to the user. Grows on duplicate-key merges.
    #[serde(rename = "DNs", default)]
    pub dns: Vec<String>,

    /// Numeric identifier.
    #[serde(rename = "ID", default)]
    pub id: i64,

    /// Login name.
    #[serde(rename = "LOGIN", default)]
    pub login: String,

    /// Display name.
    #[serde(rename = "NAME", default)]
    pub name: String,

    /// Role name → group/site tokens.
    #[serde(rename = "ROLES", default)]
    pub roles: HashMap<String, Vec<String>>,

    /// Canonical DN, recorded when the directory is keyed by sorted DN.
    /// Not part of the upstream document.
    #[serde(rename = "SORTED_DN", default, skip_serializing_if = "Option::is_none")]
    pub sorted_dn: Option<String>,
}

impl fmt::Display for IdentityRecord {
    /// Multi-line diagnostic rendering, used when reporting duplicates.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roles = String::new();
        for (role, tokens) in &self.roles {
            roles.push_str(&format!("\n{role}: {tokens:?}"));
        }
        write!(
            f,
            "ID: {}\nLogin: {}\nName: {}\nDN: {}\nDNs: {:?}\nRoles: {}",
            self.id, self.login, self.name, self.dn, self.dns, roles
        )
    }
}
