//! Product detail page extractor
//!
//! Detail pages carry product data in two layers: an embedded JSON-LD
//! structured-data block (when the site bothered to emit one), and the
//! rendered HTML itself. This module reads the JSON-LD block first and
//! fills every remaining gap through a cascade of CSS-selector fallbacks,
//! producing a best-effort [`RawProduct`] that is never an error: a page
//! with nothing recognizable yields a mostly-empty record.

use crate::text::{clean_lines, clean_text, parse_price, title_case};
use crate::url::absolutize;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Raw extracted fields from one product detail page
///
/// Serialized as-is (snake_case) into the raw output file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    pub url: String,
    pub title: String,
    pub brand: String,
    pub sku: String,
    pub mpn: String,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub currency: String,
    pub availability: String,
    pub rating_value: String,
    pub rating_count: String,
    pub category_path: String,
    pub description: String,
    pub short_description: String,
    pub images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub features: Vec<String>,
    pub variants: Vec<Value>,
}

/// Extracts product fields from a detail page
///
/// JSON-LD wins where present; HTML heuristics fill in the rest.
/// Image URLs are resolved against `origin`.
pub fn parse_detail(html: &str, url: &str, origin: &Url) -> RawProduct {
    let document = Html::parse_document(html);

    let mut raw = RawProduct {
        url: url.to_string(),
        ..Default::default()
    };

    if let Some(product) = find_json_ld_product(&document) {
        apply_json_ld(&mut raw, &product, origin);
    }

    // HTML fallbacks for anything the structured data did not provide
    if raw.title.is_empty() {
        raw.title = first_text(&document, "h1")
            .or_else(|| first_text(&document, ".product-title, .title, .product_name"))
            .unwrap_or_default();
    }

    if raw.price.is_none() {
        raw.price = first_text(
            &document,
            ".price, .product-price, .money, .amount, [class*='price']",
        )
        .and_then(|t| parse_price(&t));
    }

    if raw.original_price.is_none() {
        raw.original_price =
            first_text(&document, "del, .old-price, .compare-at").and_then(|t| parse_price(&t));
    }

    if raw.currency.is_empty() {
        raw.currency = extract_currency(&document);
    }

    if raw.availability.is_empty() {
        raw.availability = extract_availability(&document);
    }

    raw.short_description =
        first_text(&document, ".short-description, .summary, .product-excerpt")
            .unwrap_or_default();

    if raw.description.is_empty() {
        raw.description = first_text_lines(
            &document,
            ".description, .product-description, #description, [itemprop='description']",
        )
        .unwrap_or_default();
    }

    if raw.images.is_empty() {
        raw.images = extract_images(&document, origin);
    }

    raw.category_path = extract_breadcrumbs(&document);
    raw.specifications = extract_specs_table(&document);

    if raw.features.is_empty() && !raw.description.is_empty() {
        raw.features = extract_feature_bullets(&raw.description);
    }

    raw
}

/// Finds the first JSON-LD object on the page whose @type is Product
fn find_json_ld_product(document: &Html) -> Option<Value> {
    let selector = Selector::parse("script[type=\"application/ld+json\"]").ok()?;

    for element in document.select(&selector) {
        let content = element.text().collect::<String>();
        let data: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(_) => continue,
        };

        let candidates: Vec<&Value> = match &data {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for candidate in candidates {
            if is_product_type(candidate.get("@type")) {
                return Some(candidate.clone());
            }
        }
    }

    None
}

fn is_product_type(type_field: Option<&Value>) -> bool {
    match type_field {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("product"),
        Some(Value::Array(items)) => items
            .iter()
            .any(|t| t.as_str().is_some_and(|s| s.eq_ignore_ascii_case("product"))),
        _ => false,
    }
}

/// Copies fields from a JSON-LD Product object into the raw record
fn apply_json_ld(raw: &mut RawProduct, product: &Value, origin: &Url) {
    raw.title = json_text(product.get("name"));

    raw.brand = match product.get("brand") {
        Some(Value::Object(brand)) => json_text(brand.get("name")),
        Some(Value::String(brand)) => clean_text(brand),
        _ => String::new(),
    };

    raw.sku = json_text(product.get("sku"));
    raw.mpn = match product.get("mpn") {
        Some(v) if !json_text(Some(v)).is_empty() => json_text(Some(v)),
        _ => json_text(product.get("gtin")),
    };

    // Offers may be a single object or a list; take the first
    let offers = match product.get("offers") {
        Some(Value::Array(items)) => items.first(),
        Some(other) => Some(other),
        None => None,
    };

    if let Some(offers) = offers.and_then(Value::as_object) {
        let spec = offers
            .get("priceSpecification")
            .and_then(Value::as_object);

        raw.price = offers
            .get("price")
            .or_else(|| spec.and_then(|s| s.get("price")))
            .and_then(json_price);

        raw.currency = offers
            .get("priceCurrency")
            .or_else(|| spec.and_then(|s| s.get("priceCurrency")))
            .map(|v| json_text(Some(v)))
            .unwrap_or_default();

        // Original price is sometimes encoded as a range or list price
        for key in ["highPrice", "lowPrice", "listPrice", "msrp"] {
            if let Some(candidate) = offers.get(key).and_then(json_price) {
                if raw.original_price.map_or(true, |cur| candidate > cur) {
                    raw.original_price = Some(candidate);
                }
            }
        }

        let availability = json_text(offers.get("availability"));
        raw.availability = if availability.to_lowercase().starts_with("http") {
            availability
                .rsplit('/')
                .next()
                .unwrap_or(&availability)
                .to_string()
        } else {
            availability
        };
    }

    if let Some(agg) = product.get("aggregateRating").and_then(Value::as_object) {
        raw.rating_value = json_text(agg.get("ratingValue"));
        raw.rating_count = match agg.get("reviewCount") {
            Some(v) if !json_text(Some(v)).is_empty() => json_text(Some(v)),
            _ => json_text(agg.get("ratingCount")),
        };
    }

    let images: Vec<String> = match product.get("image") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => vec![],
    };
    raw.images = images
        .iter()
        .filter_map(|src| absolutize(src, origin))
        .collect();

    // Descriptions keep their line breaks so bullet lists can be mined later
    raw.description = match product.get("description") {
        Some(Value::String(s)) => clean_lines(s),
        other => json_text(other),
    };
}

/// Renders a JSON value as cleaned text (strings and numbers only)
fn json_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => clean_text(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parses a JSON price value, numeric or string-encoded
fn json_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

/// Returns the cleaned text of the first element matching `selectors`
fn first_text(document: &Html, selectors: &str) -> Option<String> {
    let selector = Selector::parse(selectors).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Like [`first_text`] but preserves line breaks in the matched element
fn first_text_lines(document: &Html, selectors: &str) -> Option<String> {
    let selector = Selector::parse(selectors).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| clean_lines(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts the currency code from meta tags, else from page text
fn extract_currency(document: &Html) -> String {
    let meta_selectors = [
        "meta[itemprop='priceCurrency']",
        "meta[property='product:price:currency']",
    ];

    for sel in meta_selectors {
        if let Ok(selector) = Selector::parse(sel) {
            if let Some(content) = document
                .select(&selector)
                .next()
                .and_then(|e| e.value().attr("content"))
            {
                let content = clean_text(content);
                if !content.is_empty() {
                    return content;
                }
            }
        }
    }

    // Last resort: the vendor trades in EGP or SAR
    let body = document.root_element().text().collect::<String>();
    if body.contains("EGP") {
        "EGP".to_string()
    } else if body.contains("SAR") {
        "SAR".to_string()
    } else {
        String::new()
    }
}

/// Scans the page text for a recognizable stock phrase
fn extract_availability(document: &Html) -> String {
    let re = match Regex::new(r"(?i)(In Stock|Out of Stock|Unavailable|Preorder|Pre-order)") {
        Ok(re) => re,
        Err(_) => return String::new(),
    };

    let body = document.root_element().text().collect::<String>();
    re.captures(&body)
        .map(|caps| title_case(&caps[1]))
        .unwrap_or_default()
}

/// Collects product image URLs from the gallery and common CDN patterns
///
/// First-seen order is preserved and duplicates dropped, so the leading
/// image stays stable for primary-image selection downstream.
fn extract_images(document: &Html, origin: &Url) -> Vec<String> {
    let mut images = Vec::new();

    let selectors = [
        "img[src*=\"/products/\"]",
        ".product-gallery img",
        "img[data-zoom-image]",
        "img[src*=\"/uploads/\"]",
        "img[src*=\"cdn\"]",
    ];

    for sel in selectors {
        if let Ok(selector) = Selector::parse(sel) {
            for element in document.select(&selector) {
                let src = element
                    .value()
                    .attr("src")
                    .or_else(|| element.value().attr("data-src"))
                    .or_else(|| element.value().attr("data-zoom-image"));

                if let Some(absolute) = src.and_then(|s| absolutize(s, origin)) {
                    if !images.contains(&absolute) {
                        images.push(absolute);
                    }
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("meta[property='og:image']") {
        if let Some(content) = document
            .select(&selector)
            .next()
            .and_then(|e| e.value().attr("content"))
        {
            if let Some(absolute) = absolutize(content, origin) {
                if !images.contains(&absolute) {
                    images.push(absolute);
                }
            }
        }
    }

    images
}

/// Extracts the breadcrumb trail as "A > B > C", with "Home" removed
fn extract_breadcrumbs(document: &Html) -> String {
    let selector_groups = [
        "nav.breadcrumb a, .breadcrumb a, ul.breadcrumbs a, .breadcrumbs a",
        "[aria-label=\"breadcrumb\"] a",
    ];

    for group in selector_groups {
        let selector = match Selector::parse(group) {
            Ok(s) => s,
            Err(_) => continue,
        };

        let crumbs: Vec<String> = document
            .select(&selector)
            .map(|e| clean_text(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("home"))
            .collect();

        if !crumbs.is_empty() {
            return crumbs.join(" > ");
        }
    }

    String::new()
}

/// Returns key/value pairs from the first table that looks like a spec table
///
/// A table qualifies when at least two of its rows produce a usable pair:
/// first two cells non-empty and the key at most 40 characters.
fn extract_specs_table(document: &Html) -> BTreeMap<String, String> {
    let (table_sel, row_sel, cell_sel) = match (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("th, td"),
    ) {
        (Ok(t), Ok(r), Ok(c)) => (t, r, c),
        _ => return BTreeMap::new(),
    };

    for table in document.select(&table_sel) {
        let mut specs = BTreeMap::new();

        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .take(2)
                .map(|c| clean_text(&c.text().collect::<String>()))
                .collect();

            if let [key, value] = cells.as_slice() {
                if !key.is_empty() && key.len() <= 40 && !value.is_empty() {
                    specs.insert(key.clone(), value.clone());
                }
            }
        }

        if specs.len() >= 2 {
            return specs;
        }
    }

    BTreeMap::new()
}

/// Mines bullet lines from a description ("- foo", "• bar", "* baz")
fn extract_feature_bullets(description: &str) -> Vec<String> {
    let re = match Regex::new(r"(?:^|\n)[\-\u{2022}\*]\s*(.+)") {
        Ok(re) => re,
        Err(_) => return vec![],
    };

    re.captures_iter(description)
        .map(|caps| clean_text(&caps[1]))
        .filter(|t| !t.is_empty())
        .take(10)
        .collect()
}
