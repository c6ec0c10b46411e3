//! URL classification helpers.

use crate::amazon::selectors::patterns;

/// Returns true for Amazon storefront URLs and amzn.to short links.
pub fn is_amazon_link(url: &str) -> bool {
    patterns::AMAZON_URL.is_match(url)
}

/// Returns true when the host of `url` belongs to the Amazon family.
pub fn is_amazon_host(url: &str) -> bool {
    host_of(url).is_some_and(|host| patterns::AMAZON_HOST.is_match(host))
}

/// Extracts the host portion of an absolute URL, without userinfo or port.
pub fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = host_port.split(':').next()?;

    (!host.is_empty()).then_some(host)
}

/// Lowercased file extension of the URL path, including the dot (`.jpg`).
pub fn path_extension(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let path_start = rest.find('/')?;
    let path = rest[path_start..].split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;

    match file.rfind('.') {
        Some(idx) if idx > 0 => Some(file[idx..].to_lowercase()),
        _ => None,
    }
}
