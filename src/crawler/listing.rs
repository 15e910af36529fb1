//! Listing page parser
//!
//! Listing pages are paginated catalogs of product links. This module
//! extracts the product URLs from one page and works out how many pages
//! the listing has, so the crawler can walk all of them.

use crate::text::clean_text;
use crate::url::absolutize;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Result of parsing one listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Absolute product URLs found on the page, query strings stripped,
    /// first-seen order, deduplicated
    pub product_urls: Vec<String>,

    /// Highest page number advertised by the page (at least 1)
    pub total_pages: u32,
}

/// Parses a listing page into product URLs and a total page count
pub fn parse_listing(html: &str, origin: &Url, product_prefix: &str) -> ListingPage {
    let document = Html::parse_document(html);

    ListingPage {
        product_urls: extract_product_urls(&document, origin, product_prefix),
        total_pages: detect_total_pages(&document),
    }
}

/// Extracts product detail URLs from anchors matching the product prefix
fn extract_product_urls(document: &Html, origin: &Url, product_prefix: &str) -> Vec<String> {
    let mut urls = Vec::new();

    let selector = match Selector::parse(&format!("a[href^=\"{}\"]", product_prefix)) {
        Ok(s) => s,
        Err(_) => return urls,
    };

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        // Strip tracking query parameters; the path identifies the product
        let path = href.split('?').next().unwrap_or(href);
        if !path.starts_with(product_prefix) {
            continue;
        }

        if let Some(absolute) = absolutize(path, origin) {
            if !urls.contains(&absolute) {
                urls.push(absolute);
            }
        }
    }

    urls
}

/// Detects the total number of listing pages
///
/// Two sources are combined: numeric anchor text inside common pagination
/// widgets, and `?page=N` / `&page=N` fragments in any href on the page.
/// The maximum wins; a page with no pagination markers counts as 1.
fn detect_total_pages(document: &Html) -> u32 {
    let mut max_page: u32 = 1;

    let widget_selectors = [
        ".pagination a",
        "nav[aria-label*='pagination'] a",
        "ul.pagination a",
        "a.page-link",
        "a[rel='next'], a[rel='prev']",
    ];

    for sel in widget_selectors {
        if let Ok(selector) = Selector::parse(sel) {
            for element in document.select(&selector) {
                let text = clean_text(&element.text().collect::<String>());
                if let Ok(n) = text.parse::<u32>() {
                    max_page = max_page.max(n);
                }
            }
        }
    }

    if let (Ok(selector), Ok(re)) = (Selector::parse("a[href]"), Regex::new(r"[?&]page=(\d+)")) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                for caps in re.captures_iter(href) {
                    if let Ok(n) = caps[1].parse::<u32>() {
                        max_page = max_page.max(n);
                    }
                }
            }
        }
    }

    max_page
}
