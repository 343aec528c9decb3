use axum::http::Method;
use pagegate::guards::{
    is_allowed_origin,
    origin::{normalize_allow_entry, origin_host},
};
use std::collections::HashSet;

fn allow_list() -> HashSet<String> {
    ["pages.example.com", "localhost:3000"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

const MUTATING: [Method; 4] = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

#[test]
fn test_reads_pass_regardless_of_origin() {
    let hosts = allow_list();
    for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
        assert!(is_allowed_origin(&method, None, &hosts));
        assert!(is_allowed_origin(&method, Some("https://evil.test"), &hosts));
        assert!(is_allowed_origin(&method, Some("not a url"), &hosts));
    }
}

#[test]
fn test_mutating_without_origin_is_rejected() {
    let hosts = allow_list();
    for method in MUTATING {
        assert!(!is_allowed_origin(&method, None, &hosts), "{method} without origin");
    }
}

#[test]
fn test_mutating_from_allowed_origin_passes() {
    let hosts = allow_list();
    for method in MUTATING {
        assert!(is_allowed_origin(&method, Some("https://pages.example.com"), &hosts));
        assert!(is_allowed_origin(&method, Some("http://localhost:3000"), &hosts));
    }
}

#[test]
fn test_mutating_from_foreign_origin_is_rejected() {
    let hosts = allow_list();
    for origin in [
        "https://evil.test",
        "https://pages.example.com.evil.test",
        "https://sub.pages.example.com",
        "http://localhost:4000",
        "http://localhost",
    ] {
        assert!(!is_allowed_origin(&Method::POST, Some(origin), &hosts), "{origin}");
    }
}

#[test]
fn test_malformed_origins_are_rejected() {
    let hosts = allow_list();
    for origin in [
        "",
        "null",
        "pages.example.com",
        "ftp://pages.example.com",
        "https://pages.example.com/",
        "https://pages.example.com/path",
        "https://pages.example.com?x=1",
        "https://user:pw@pages.example.com",
    ] {
        assert!(!is_allowed_origin(&Method::POST, Some(origin), &hosts), "{origin:?}");
    }
}

#[test]
fn test_origin_host_canonical_form() {
    assert_eq!(
        origin_host("https://Pages.Example.com").as_deref(),
        Some("pages.example.com")
    );
    assert_eq!(
        origin_host("https://pages.example.com:443").as_deref(),
        Some("pages.example.com")
    );
    assert_eq!(
        origin_host("http://localhost:3000").as_deref(),
        Some("localhost:3000")
    );
    assert_eq!(origin_host("null"), None);
}

#[test]
fn test_allow_entries_normalize_like_headers() {
    assert_eq!(
        normalize_allow_entry("https://Pages.Example.com/").as_deref(),
        Some("pages.example.com")
    );
    assert_eq!(
        normalize_allow_entry(" localhost:3000 ").as_deref(),
        Some("localhost:3000")
    );
    assert_eq!(normalize_allow_entry("   "), None);
}

#[test]
fn test_bare_entries_drop_default_ports() {
    assert_eq!(
        normalize_allow_entry("Example.com:443").as_deref(),
        Some("example.com")
    );
    assert_eq!(
        normalize_allow_entry("example.com:80").as_deref(),
        Some("example.com")
    );
    assert_eq!(
        normalize_allow_entry("example.com:8443").as_deref(),
        Some("example.com:8443")
    );
    assert_eq!(normalize_allow_entry("example.com/path"), None);

    let hosts: HashSet<String> = normalize_allow_entry("example.com:443").into_iter().collect();
    assert!(is_allowed_origin(&Method::POST, Some("https://example.com"), &hosts));
}
