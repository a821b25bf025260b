//! Distinguished-name canonicalization.

/// Canonicalize a `/`-separated distinguished name for stable keying.
///
/// Splits on `/`, sorts the components lexicographically (plain
/// case-sensitive byte order, not DN-semantic order), drops duplicate
/// components, and rejoins with `/`. The empty token produced by a leading
/// `/` sorts first, so a rooted DN keeps a single leading slash; repeated
/// slashes collapse with the duplicates.
///
/// Pure and idempotent: `sorted_dn(sorted_dn(x)) == sorted_dn(x)`.
#[must_use]
pub fn sorted_dn(dn: &str) -> String {
    let mut parts: Vec<&str> = dn.split('/').collect();
    parts.sort_unstable();
    parts.dedup();
    parts.join("/")
}
