use percent_encoding::percent_decode_str;
use url::Url;

/// Resolve `href` against `page` and return its decoded fragment when the
/// link points into the page itself: same host, same path, and an explicit
/// `#`. An empty fragment (`href="#"`) yields `Some("")`.
pub fn same_page_fragment(href: &str, page: &str) -> Option<String> {
    let page = Url::parse(page).ok()?;
    let link = page.join(href).ok()?;
    if link.host_str() != page.host_str() || link.path() != page.path() {
        return None;
    }
    link.fragment().map(decode_fragment)
}

/// Decoded fragment of the page URL, or an empty string when it has none.
pub fn page_fragment(page: &str) -> String {
    Url::parse(page)
        .ok()
        .and_then(|url| url.fragment().map(decode_fragment))
        .unwrap_or_default()
}

/// Decoded fragment of a link's `href`, without checking where it points.
pub fn href_fragment(href: &str) -> Option<String> {
    let (_, fragment) = href.split_once('#')?;
    Some(decode_fragment(fragment))
}

fn decode_fragment(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
