//! URL handling module for Comic-Sync
//!
//! Items and chapters are stored by site path only; these helpers turn page
//! hrefs into paths and paths back into fetchable URLs.

use url::Url;

/// Returns the path component of an absolute URL
///
/// # Examples
///
/// ```
/// use comic_sync::url::item_path;
///
/// let path = item_path("https://comics.example.com/truyen/abc-123?x=1").unwrap();
/// assert_eq!(path, "/truyen/abc-123");
/// ```
pub fn item_path(url: &str) -> Result<String, url::ParseError> {
    Ok(Url::parse(url.trim())?.path().to_string())
}

/// Resolves an href found on `page_url` and returns its path
///
/// Returns None for empty hrefs, fragments, and non-HTTP schemes.
pub fn resolve_path(page_url: &Url, href: &str) -> Option<String> {
    resolve_url(page_url, href).map(|url| url.path().to_string())
}

/// Resolves an href found on `page_url` to an absolute HTTP(S) URL
pub fn resolve_url(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with("data:")
    {
        return None;
    }

    match page_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}

/// Builds the absolute URL of a stored site path
pub fn site_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    base.join(path)
}

/// Builds the URL of one listing page
///
/// `listing_path` may carry a fixed query (`tim-truyen?status=&sort=10`); the
/// page number is appended as `page_param`.
pub fn listing_url(
    base: &Url,
    listing_path: &str,
    page_param: &str,
    page: u32,
) -> Result<Url, url::ParseError> {
    let mut url = base.join(listing_path)?;
    url.query_pairs_mut()
        .append_pair(page_param, &page.to_string());
    Ok(url)
}

/// Wraps `target` in a rendering-proxy request
pub fn render_url(endpoint: &str, api_key: &str, target: &Url) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("api_key", api_key)
        .append_pair("url", target.as_str())
        .append_pair("render", "true");
    Ok(url)
}
