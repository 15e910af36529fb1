//! URL helpers for listing pagination and output naming
//!
//! This module handles:
//! - Rewriting the listing URL for a specific page number
//! - Deriving the vendor id/name pair from the listing URL query
//! - Resolving scraped hrefs and image sources to absolute URLs

use url::Url;

/// Vendor identity derived from the listing URL query parameters
///
/// Used to build the output filenames (`raw_<id>_<name>.json` and
/// `schema_<id>_<name>.json`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRef {
    /// Value of the `vendors` query parameter
    pub id: String,
    /// Value of the `vendorName` query parameter, sanitized for filenames
    pub name: String,
}

/// Returns a copy of `url` with its `page` query parameter set to `page`
///
/// Any existing `page` parameter is replaced; all other query parameters
/// are preserved.
pub fn with_page(url: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    {
        let mut pairs = out.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("page", &page.to_string());
    }
    out
}

/// Derives the vendor id and sanitized vendor name from a listing URL
///
/// Both parameters fall back to "vendor" when absent. The name is reduced
/// to `[A-Za-z0-9_-]`: every other run of characters becomes a single
/// underscore, with no leading or trailing underscores.
pub fn vendor_from_url(url: &Url) -> VendorRef {
    let mut id = None;
    let mut name = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "vendors" if id.is_none() => id = Some(value.into_owned()),
            "vendorName" if name.is_none() => name = Some(value.into_owned()),
            _ => {}
        }
    }

    VendorRef {
        id: id.unwrap_or_else(|| "vendor".to_string()),
        name: sanitize_name(&name.unwrap_or_else(|| "vendor".to_string())),
    }
}

/// Returns the site origin of a URL (scheme + host + port, path "/")
///
/// Scraped relative links and image sources are resolved against this.
pub fn site_origin(url: &Url) -> crate::Result<Url> {
    if url.host_str().is_none() {
        return Err(crate::HarvestError::MissingHost {
            url: url.to_string(),
        });
    }

    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    Ok(origin)
}

/// Resolves a scraped href or image source to an absolute http(s) URL
///
/// Protocol-relative sources (`//cdn...`) are assumed to be https.
/// Returns None for empty sources and anything that fails to resolve to
/// an http(s) URL.
pub fn absolutize(src: &str, origin: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    let resolved = if let Some(rest) = src.strip_prefix("//") {
        Url::parse(&format!("https://{}", rest)).ok()?
    } else {
        origin.join(src).ok()?
    };

    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved.to_string())
    } else {
        None
    }
}

/// Returns the last path segment of a product URL, slug-style
///
/// "https://site/products/dental-mirror/" yields "dental-mirror".
/// Returns an empty string when the URL has no usable path segment.
pub fn url_slug(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Reduces a vendor name to filename-safe characters
fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }

    out
}
