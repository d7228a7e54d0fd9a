// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL normalization and same-domain filtering for the crawl frontier.

use url::Url;

/// Path extensions that never lead to a crawlable page
const STATIC_ASSET_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "bmp", "tif", "tiff", "avif",
    // config / data
    "json", "xml", "yml", "yaml", "toml", "ini", "conf", "cfg", "env", "map",
    // other static payloads
    "css", "js", "woff", "woff2", "ttf", "eot", "pdf", "zip", "gz", "tar", "mp4", "mp3",
];

/// Resolve `href` against `base` into an absolute http(s) URL.
///
/// Returns `None` for malformed input and for non-http(s) schemes
/// (`mailto:`, `javascript:`, `data:` ...). The fragment is dropped so
/// `/page#a` and `/page#b` dedup to one frontier entry.
pub fn normalize(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    let base = Url::parse(base).ok()?;
    let mut resolved = base.join(href).ok()?;

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if resolved.host_str().map(str::is_empty).unwrap_or(true) {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Hostname of `url`, if it parses
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

/// True when `url` is hosted on `domain`; unparseable URLs are never same-domain
pub fn same_domain(url: &str, domain: &str) -> bool {
    match hostname(url) {
        Some(host) => host.eq_ignore_ascii_case(domain),
        None => false,
    }
}

/// True when the URL path ends in a static-asset extension
pub fn is_static_asset(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let last_segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, ext)) => STATIC_ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// True when a hostname points at the local machine
pub fn is_localhost(url: &str) -> bool {
    matches!(
        hostname(url).as_deref(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
    )
}
