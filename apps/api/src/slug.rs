//! Slug rules. A slug doubles as a subdomain (`alice` serves
//! `alice.example.com`), so it must be a valid lowercase DNS label.

use thiserror::Error;

/// Labels that collide with infrastructure hosts and can never be claimed.
const RESERVED: &[&str] = &["www", "api", "app", "mail"];

const MAX_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,

    #[error("slug must be at most {MAX_LEN} characters")]
    TooLong,

    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,

    #[error("slug must not start or end with a hyphen")]
    EdgeHyphen,

    #[error("slug '{0}' is reserved")]
    Reserved(String),
}

/// Validates a user-chosen slug against the DNS-label rules.
pub fn validate_slug(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::Empty);
    }
    if slug.len() > MAX_LEN {
        return Err(SlugError::TooLong);
    }
    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(SlugError::InvalidCharacter);
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(SlugError::EdgeHyphen);
    }
    if RESERVED.contains(&slug) {
        return Err(SlugError::Reserved(slug.to_string()));
    }
    Ok(())
}

/// Extracts the slug from a request host, given the configured root domain.
/// Exactly one label below the root resolves; the bare root, nested labels,
/// and foreign domains do not. The port, if any, is ignored.
pub fn slug_from_host<'a>(host: &'a str, root_domain: &str) -> Option<&'a str> {
    let host = host.split(':').next()?;
    let prefix = host
        .strip_suffix(root_domain)?
        .strip_suffix('.')?;
    if prefix.is_empty() || prefix.contains('.') {
        return None;
    }
    validate_slug(prefix).ok()?;
    Some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lowercase_slug_is_valid() {
        assert_eq!(validate_slug("alice"), Ok(()));
        assert_eq!(validate_slug("alice-z2"), Ok(()));
    }

    #[test]
    fn test_empty_slug_is_rejected() {
        assert_eq!(validate_slug(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_uppercase_and_symbols_are_rejected() {
        assert_eq!(validate_slug("Alice"), Err(SlugError::InvalidCharacter));
        assert_eq!(validate_slug("alice_z"), Err(SlugError::InvalidCharacter));
        assert_eq!(validate_slug("alice z"), Err(SlugError::InvalidCharacter));
    }

    #[test]
    fn test_edge_hyphens_are_rejected() {
        assert_eq!(validate_slug("-alice"), Err(SlugError::EdgeHyphen));
        assert_eq!(validate_slug("alice-"), Err(SlugError::EdgeHyphen));
    }

    #[test]
    fn test_overlong_slug_is_rejected() {
        let slug = "a".repeat(64);
        assert_eq!(validate_slug(&slug), Err(SlugError::TooLong));
    }

    #[test]
    fn test_reserved_labels_are_rejected() {
        assert_eq!(
            validate_slug("www"),
            Err(SlugError::Reserved("www".to_string()))
        );
    }

    #[test]
    fn test_host_resolves_to_slug() {
        assert_eq!(slug_from_host("alice.example.com", "example.com"), Some("alice"));
        assert_eq!(
            slug_from_host("alice.example.com:8080", "example.com"),
            Some("alice")
        );
    }

    #[test]
    fn test_bare_root_does_not_resolve() {
        assert_eq!(slug_from_host("example.com", "example.com"), None);
    }

    #[test]
    fn test_nested_and_foreign_hosts_do_not_resolve() {
        assert_eq!(slug_from_host("a.b.example.com", "example.com"), None);
        assert_eq!(slug_from_host("alice.other.org", "example.com"), None);
        // Suffix match alone is not enough; the label boundary must be a dot.
        assert_eq!(slug_from_host("evilexample.com", "example.com"), None);
    }

    #[test]
    fn test_reserved_subdomain_does_not_resolve() {
        assert_eq!(slug_from_host("www.example.com", "example.com"), None);
    }
}
