//! Canonical signing string for the trust-header bundle.
//!
//! The canonical form is `prefix + "#" + suffix` where, per selected header
//! in sorted lower-cased name order, the prefix accumulates
//! `h<name-len-hex>v<value-len-hex>` and the suffix accumulates the
//! lower-cased name immediately followed by the header's first value. The
//! length prefix pins every name/value boundary, so shifting bytes between
//! adjacent pairs cannot produce a colliding canonical string.
//!
//! Values are concatenated raw; a value containing `#` or a crafted
//! name-like run is an accepted limitation of the deployed protocol.

use std::fmt::Write;

use crate::auth::headers::HeaderSet;

/// Header-name prefix for authentication assertions.
pub const AUTHN_PREFIX: &str = "cms-authn";

/// Header-name prefix for authorization assertions.
pub const AUTHZ_PREFIX: &str = "cms-authz";

/// Header carrying the hex HMAC digest; excluded from the canonical string.
pub const HMAC_HEADER: &str = "cms-authn-hmac";

/// Header carrying the gateway's authentication status.
pub const AUTH_STATUS_HEADER: &str = "cms-auth-status";

/// Build the canonical signing string over the trust headers.
///
/// Selects headers whose lower-cased name starts with `cms-authn` or
/// `cms-authz`, excluding [`HMAC_HEADER`] itself. Only the first value of a
/// multi-valued header participates; repeated values are left to the
/// authorization matcher.
#[must_use]
pub fn canonical_signing_string(headers: &HeaderSet) -> String {
    let mut prefix = String::new();
    let mut suffix = String::new();
    for (name, values) in headers.iter() {
        if !is_signed_header(name) {
            continue;
        }
        let Some(value) = values.first() else {
            continue;
        };
        // infallible: writing into a String cannot fail
        let _ = write!(prefix, "h{:x}v{:x}", name.len(), value.len());
        suffix.push_str(name);
        suffix.push_str(value);
    }
    format!("{prefix}#{suffix}")
}

/// Whether a lower-cased header name participates in the canonical string.
pub(crate) fn is_signed_header(name: &str) -> bool {
    (name.starts_with(AUTHN_PREFIX) || name.starts_with(AUTHZ_PREFIX)) && name != HMAC_HEADER
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn canonical_string_has_length_prefix_and_content_suffix() {
        let headers: HeaderSet = [("cms-authn-login", "alice")].into_iter().collect();
        // name is 15 chars (0xf), value 5 chars
        assert_eq!(canonical_signing_string(&headers), "hfv5#cms-authn-loginalice");
    }

    #[test]
    fn canonical_string_is_casing_independent() {
        let lower: HeaderSet = [
            ("cms-authn-login", "alice"),
            ("cms-authz-user", "group:a"),
        ]
        .into_iter()
        .collect();
        let mixed: HeaderSet = [
            ("CMS-AUTHN-LOGIN", "alice"),
            ("Cms-Authz-User", "group:a"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            canonical_signing_string(&lower),
            canonical_signing_string(&mixed)
        );
    }

    #[test]
    fn hmac_header_and_foreign_headers_are_excluded() {
        let headers: HeaderSet = [
            ("cms-authn-login", "alice"),
            ("cms-authn-hmac", "deadbeef"),
            ("content-type", "application/json"),
            ("cms-auth-status", "OK"),
        ]
        .into_iter()
        .collect();
        let canonical = canonical_signing_string(&headers);
        assert!(!canonical.contains("deadbeef"));
        assert!(!canonical.contains("content-type"));
        // cms-auth-status does not carry the cms-authn/cms-authz prefix
        assert!(!canonical.contains("status"));
    }

    #[test]
    fn only_first_value_of_multivalued_header_is_signed() {
        let mut headers = HeaderSet::new();
        headers.insert("cms-authz-user", "group:a");
        headers.insert("cms-authz-user", "group:b");
        let canonical = canonical_signing_string(&headers);
        assert!(canonical.contains("group:a"));
        assert!(!canonical.contains("group:b"));
    }

    #[test]
    fn headers_are_signed_in_sorted_name_order() {
        let headers: HeaderSet = [
            ("cms-authz-role", "r"),
            ("cms-authn-name", "n"),
            ("cms-authn-login", "l"),
        ]
        .into_iter()
        .collect();
        let canonical = canonical_signing_string(&headers);
        let suffix = canonical.split_once('#').map(|(_, s)| s).unwrap();
        assert_eq!(suffix, "cms-authn-loginlcms-authn-namencms-authz-roler");
    }

    #[test]
    fn no_trust_headers_yields_bare_separator() {
        let headers: HeaderSet = [("content-type", "text/plain")].into_iter().collect();
        assert_eq!(canonical_signing_string(&headers), "#");
    }

    #[test]
    fn shifted_boundaries_do_not_collide() {
        // Same suffix bytes, different name/value split — the length prefix
        // must keep the two canonical strings distinct.
        let a: HeaderSet = [("cms-authn-xy", "z")].into_iter().collect();
        let b: HeaderSet = [("cms-authn-x", "yz")].into_iter().collect();
        assert_ne!(canonical_signing_string(&a), canonical_signing_string(&b));
    }
}
