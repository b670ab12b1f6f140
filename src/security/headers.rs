//! Header manipulation between upstream and caller.
//!
//! # Responsibilities
//! - Copy upstream response headers into the reply, keeping every value
//! - Strip hop-by-hop headers that describe the upstream connection only
//!
//! # Design Decisions
//! - Values are appended, never overwritten, so multi-valued headers survive
//! - Headers named in `Connection` are treated as hop-by-hop too

use axum::http::header::{self, HeaderMap, HeaderName};

/// Headers that apply to a single transport hop (RFC 9110, section 7.6.1).
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Whether `name` is a hop-by-hop header.
///
/// Any `proxy-*` header counts, which covers the non-standard
/// `Proxy-Connection` as well.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name) || name.as_str().starts_with("proxy-")
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let mut doomed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    doomed.extend(headers.keys().filter(|name| is_hop_by_hop(name)).cloned());

    for name in doomed {
        headers.remove(name);
    }
}

/// Append every name/value pair of `src` to `dst`, preserving multiplicity.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}
