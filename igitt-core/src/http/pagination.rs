//! `Link` header pagination (RFC 8288), as used by both GitHub and GitLab

use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// URL of the `rel="next"` page, if the response has one
pub fn next_link(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_next)
}

/// Find the `rel="next"` target in a single `Link` header value
pub fn parse_next(header_value: &str) -> Option<Url> {
    for link in header_value.split(',') {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });

        if is_next {
            let target = target.strip_prefix('<')?.strip_suffix('>')?;
            return Url::parse(target).ok();
        }
    }

    None
}
