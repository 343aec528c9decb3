use axum::http::Method;
use std::collections::HashSet;
use url::Url;

/// is_mutating
///
/// The methods the origin check applies to. Everything else is treated as a read.
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// origin_host
///
/// Extracts the canonical `host[:port]` from an `Origin` header value.
///
/// Returns `None` for anything that is not a bare serialized origin: non-http(s) schemes,
/// the opaque `null` origin, credentials, paths, queries or fragments. Default ports are
/// elided and the host is lower-cased, so `https://Example.com:443` yields `example.com`.
pub fn origin_host(origin: &str) -> Option<String> {
    let url = Url::parse(origin.trim()).ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if !url.username().is_empty() || url.password().is_some() {
        return None;
    }
    // An origin never carries a path; the parser normalizes an empty one to "/".
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return None;
    }
    // Reject a trailing "/" too: browsers never send one.
    if origin.trim().ends_with('/') {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}

/// normalize_allow_entry
///
/// Brings a configured allow-list entry into the same form `origin_host` produces.
/// Entries may be full origins (`https://app.example.com`) or bare hosts
/// (`localhost:3000`). A bare host carries no scheme, so both default ports (80 and 443)
/// are elided from it. Returns `None` for blank or unparsable entries.
pub fn normalize_allow_entry(entry: &str) -> Option<String> {
    let entry = entry.trim().trim_end_matches('/');
    if entry.is_empty() {
        return None;
    }
    if entry.contains("://") {
        return origin_host(entry);
    }

    let url = Url::parse(&format!("http://{entry}")).ok()?;
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    // The http parse already drops 80.
    Some(match url.port() {
        None | Some(443) => host,
        Some(port) => format!("{host}:{port}"),
    })
}

/// is_allowed_origin
///
/// Decides whether a request may proceed past the origin check.
///
/// Reads always pass. A mutating request passes only when it declares an `Origin` whose
/// host is in `host_allow_list`. A missing header is untrusted: legacy same-origin
/// clients that omit it are rejected along with cross-site forgeries.
///
/// `host_allow_list` must hold entries already passed through `normalize_allow_entry`.
pub fn is_allowed_origin(
    method: &Method,
    origin_header: Option<&str>,
    host_allow_list: &HashSet<String>,
) -> bool {
    if !is_mutating(method) {
        return true;
    }

    match origin_header.and_then(origin_host) {
        Some(host) => host_allow_list.contains(&host),
        None => false,
    }
}
