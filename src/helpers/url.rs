//! Site links

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Bytes escaped in a single path segment. Unreserved characters stay.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Prefix a site-relative path with the configured root
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Absolute URL of a site-relative path, for canonical links
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!("{}{}", config.url.trim_end_matches('/'), url_for(config, path))
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Site-relative path of a post page. The uid is encoded so the link
/// resolves to `post/<uid>/index.html` whatever characters it holds.
pub fn post_path(uid: &str) -> String {
    format!("post/{}/", encode_segment(uid))
}

/// Site-relative path of listing page `n`; page 1 is the site root
pub fn listing_path(n: usize) -> String {
    if n <= 1 {
        String::new()
    } else {
        format!("page/{}/", n)
    }
}
