//! Case-insensitive header multimap.
//!
//! HTTP header names are case-insensitive; the handshake must produce the
//! same canonical string regardless of how the front end cased the names.
//! `HeaderSet` stores names lower-cased and keeps the ordered value sequence
//! per name, so iteration is already in sorted lower-cased name order — the
//! order the canonicalizer needs.

use std::collections::BTreeMap;

/// Case-insensitive mapping from header name to an ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderSet {
    /// Create an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name` (case-insensitive).
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .entry(name.as_ref().to_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Replace all values under `name` with a single value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_lowercase(), vec![value.into()]);
    }

    /// All values recorded under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
    }

    /// First value recorded under `name`, if any.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    /// Whether any value is recorded under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// Iterate over `(lower-cased name, values)` in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for HeaderSet {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl From<&reqwest::header::HeaderMap> for HeaderSet {
    /// Convert from the HTTP header map used on the wire.
    ///
    /// Values that are not valid UTF-8 are skipped; the trust headers this
    /// crate consumes are always ASCII.
    fn from(map: &reqwest::header::HeaderMap) -> Self {
        let mut set = Self::new();
        for (name, value) in map {
            if let Ok(value) = value.to_str() {
                set.insert(name.as_str(), value);
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HeaderSet::new();
        headers.insert("Cms-Authn-Login", "alice");
        assert_eq!(headers.first("cms-authn-login"), Some("alice"));
        assert_eq!(headers.first("CMS-AUTHN-LOGIN"), Some("alice"));
        assert!(headers.contains("cMs-AuThN-lOgIn"));
    }

    #[test]
    fn insert_appends_and_set_replaces() {
        let mut headers = HeaderSet::new();
        headers.insert("cms-authz-user", "group:a");
        headers.insert("CMS-AUTHZ-USER", "group:b");
        assert_eq!(
            headers.get("cms-authz-user"),
            Some(&["group:a".to_string(), "group:b".to_string()][..])
        );

        headers.set("cms-authz-user", "group:c");
        assert_eq!(headers.get("cms-authz-user"), Some(&["group:c".to_string()][..]));
    }

    #[test]
    fn iteration_is_sorted_by_lowercased_name() {
        let headers: HeaderSet = [
            ("Zebra", "1"),
            ("alpha", "2"),
            ("Mid", "3"),
        ]
        .into_iter()
        .collect();
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn missing_header_yields_none() {
        let headers = HeaderSet::new();
        assert!(headers.first("cms-auth-status").is_none());
        assert!(headers.get("cms-auth-status").is_none());
        assert!(headers.is_empty());
    }

    #[test]
    fn converts_from_reqwest_header_map() {
        let mut map = reqwest::header::HeaderMap::new();
        map.insert("Cms-Auth-Status", "NONE".parse().unwrap());
        map.append("cms-authz-user", "group:a".parse().unwrap());
        map.append("cms-authz-user", "group:b".parse().unwrap());

        let headers = HeaderSet::from(&map);
        assert_eq!(headers.first("cms-auth-status"), Some("NONE"));
        assert_eq!(headers.get("cms-authz-user").map(<[String]>::len), Some(2));
    }
}
