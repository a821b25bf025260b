//! Role/group/site authorization matching.
//!
//! The deployed policy is deliberately loose: the role token matches as a
//! substring anywhere in the header name, and group/site tokens match as
//! case-insensitive substrings of any header value. Downstream deployments
//! depend on this looseness, so it must not be tightened to exact matching.

use crate::auth::canonical::AUTHZ_PREFIX;
use crate::auth::headers::HeaderSet;

/// Check whether the `cms-authz-*` headers grant `role` for `group` or
/// `site`.
///
/// A header participates when its lower-cased name starts with `cms-authz`
/// AND contains `role` as a substring. Unlike canonicalization, every value
/// of a matching header is consulted; the first value that contains `group`
/// OR contains `site` (case-insensitively) authorizes the request.
///
/// An empty `site` is contained in every value, so it authorizes any request
/// whose role matched a header — callers treat an empty site as "site check
/// disabled" by convention only. The same holds for an empty `group`. This
/// function does not special-case empty tokens.
#[must_use]
pub fn authorize(headers: &HeaderSet, role: &str, group: &str, site: &str) -> bool {
    let role = role.to_lowercase();
    let group = group.to_lowercase();
    let site = site.to_lowercase();

    for (name, values) in headers.iter() {
        if !name.starts_with(AUTHZ_PREFIX) || !name.contains(&role) {
            continue;
        }
        for value in values {
            let value = value.to_lowercase();
            if value.contains(&group) || value.contains(&site) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_authz_headers_denies_everything() {
        let headers = HeaderSet::new();
        assert!(!authorize(&headers, "operator", "dbs", "T1"));
        assert!(!authorize(&headers, "", "", ""));
    }

    #[test]
    fn matching_group_authorizes() {
        let headers: HeaderSet = [("cms-authz-operator", "group:dbs")].into_iter().collect();
        assert!(authorize(&headers, "operator", "dbs", "T1"));
    }

    #[test]
    fn absent_role_header_denies() {
        let headers: HeaderSet = [("cms-authz-operator", "group:dbs")].into_iter().collect();
        assert!(!authorize(&headers, "admin", "xcache", "T9_XX_Nowhere"));
    }

    #[test]
    fn matching_site_alone_authorizes() {
        // OR between group and site: a site hit needs no group hit
        let headers: HeaderSet = [("cms-authz-operator", "site:T1_CH_CERN")]
            .into_iter()
            .collect();
        assert!(authorize(&headers, "operator", "no-such-group", "T1_CH_CERN"));
    }

    #[test]
    fn all_values_of_a_matching_header_are_consulted() {
        let mut headers = HeaderSet::new();
        headers.insert("cms-authz-operator", "group:dbs");
        headers.insert("cms-authz-operator", "group:xcache");
        assert!(authorize(&headers, "operator", "xcache", "T9_XX_Nowhere"));
    }

    #[test]
    fn picks_the_right_header_among_many_roles() {
        let headers: HeaderSet = [
            ("cms-authz-operator", "group:dbs group:xcache"),
            ("cms-authz-dbsexpert", "group:ops"),
            ("cms-authz-developer", "group:web"),
            ("cms-authz-admin", "group:infra"),
            ("cms-authz-users", "group:everyone"),
        ]
        .into_iter()
        .collect();
        assert!(authorize(&headers, "operator", "xcache", "T9_XX_Nowhere"));
        assert!(!authorize(&headers, "developer", "infra", "T9_XX_Nowhere"));
    }

    #[test]
    fn header_name_casing_is_irrelevant() {
        let headers: HeaderSet = [("Cms-Authz-Operator", "group:dbs")].into_iter().collect();
        assert!(authorize(&headers, "operator", "dbs", "T1"));
    }

    #[test]
    fn value_matching_is_case_insensitive() {
        let headers: HeaderSet = [("cms-authz-operator", "GROUP:DBS")].into_iter().collect();
        assert!(authorize(&headers, "operator", "dbs", "T1"));
    }

    #[test]
    fn role_matches_as_substring_of_the_header_name() {
        // loose policy: "admin" matches a header named -administrative
        let headers: HeaderSet = [("cms-authz-administrative", "group:infra")]
            .into_iter()
            .collect();
        assert!(authorize(&headers, "admin", "infra", "T1"));
    }

    #[test]
    fn empty_site_matches_any_value_of_a_role_header() {
        // documented foot-gun: "" is contained in everything
        let headers: HeaderSet = [("cms-authz-operator", "group:dbs")].into_iter().collect();
        assert!(authorize(&headers, "operator", "dbs", ""));
        assert!(authorize(&headers, "operator", "unrelated", ""));
    }

    #[test]
    fn non_authz_headers_never_participate() {
        let headers: HeaderSet = [
            ("cms-authn-operator", "group:dbs"),
            ("x-operator", "group:dbs"),
        ]
        .into_iter()
        .collect();
        assert!(!authorize(&headers, "operator", "dbs", "T1"));
    }
}
