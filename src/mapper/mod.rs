//! Schema mapper: raw extracted records to catalog documents
//!
//! This module is a pure transformation. One [`RawProduct`] in, one
//! [`ProductDoc`] out, with all the defaulting and derived-field rules the
//! downstream catalog system expects: stable synthesized SKUs, category
//! mapping from breadcrumb paths, sale percentage, SEO fields, and search
//! keywords.

use crate::crawler::RawProduct;
use crate::text::{slugify, truncate_chars};
use crate::url::url_slug;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// One product image entry in the target schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub alt: String,
    pub is_primary: bool,
    pub order: usize,
}

/// Physical weight; the source pages carry no reliable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: Option<f64>,
    pub unit: String,
}

/// Physical dimensions; the source pages carry no reliable values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: String,
}

/// Provenance block linking a document back to the scraped page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorData {
    pub source_url: String,
    pub last_scraped: String,
    pub scraped_data: BTreeMap<String, Value>,
}

/// Target catalog document shape
///
/// Field names and defaults match what the catalog import expects; this
/// crate only produces the documents, it does not validate uniqueness or
/// persist them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    // Basic product information
    pub name: String,
    pub name_ar: String,
    pub description: String,
    pub short_description: String,

    // Pricing
    pub price: f64,
    pub original_price: Option<f64>,
    pub currency: String,

    // Product identification
    pub sku: String,
    pub vendor_sku: String,
    pub brand: String,
    pub model: String,

    // Relationships (catalog document references)
    pub category_id: String,
    pub vendor_id: String,

    // Inventory
    pub stock: u32,
    pub min_stock_level: u32,
    pub max_stock_level: u32,

    // Media
    pub images: Vec<ProductImage>,

    // Product details
    pub specifications: BTreeMap<String, String>,
    pub features: Vec<String>,
    pub tags: Vec<String>,

    // Physical properties
    pub weight: Weight,
    pub dimensions: Dimensions,

    // Product status
    pub is_active: bool,
    pub is_featured: bool,
    pub is_on_sale: bool,
    pub sale_percentage: Option<f64>,

    // SEO & marketing
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,

    // Analytics & performance
    pub average_rating: f64,
    pub total_reviews: u32,
    pub total_sold: u32,
    pub views: u32,

    // Search & discovery
    pub search_keywords: Vec<String>,

    // Vendor-specific data
    pub vendor_data: VendorData,

    // Variants and bundles
    pub variants: Vec<Value>,
    pub is_bundle: bool,
    pub bundle_items: Vec<Value>,

    // Timestamps
    pub created_at: String,
    pub updated_at: String,
    pub last_scraped_at: String,
}

/// Converts one raw extracted record into a catalog document
///
/// `now` is taken once per document so every timestamp field agrees.
pub fn to_catalog_doc(
    raw: &RawProduct,
    vendor_id: &str,
    category_map: &BTreeMap<String, String>,
    default_category_id: &str,
    now: DateTime<Utc>,
) -> ProductDoc {
    let now_str = now.to_rfc3339_opts(SecondsFormat::Micros, true);

    let name = if raw.title.is_empty() {
        "Unnamed Product".to_string()
    } else {
        raw.title.clone()
    };
    let slug = slugify(&name);

    // Some pages report the pair flipped; the higher value is the original
    let (mut price, mut original) = (raw.price, raw.original_price);
    if let (Some(p), Some(o)) = (price, original) {
        if o < p {
            (price, original) = (Some(o), Some(p));
        }
    }

    let sale_percentage = match (price, original) {
        (Some(p), Some(o)) if o > 0.0 && p < o => Some(((o - p) * 10_000.0 / o).round() / 100.0),
        _ => None,
    };

    let images: Vec<ProductImage> = raw
        .images
        .iter()
        .enumerate()
        .map(|(idx, url)| ProductImage {
            url: url.clone(),
            alt: name.clone(),
            is_primary: idx == 0,
            order: idx,
        })
        .collect();

    // Stock heuristic: explicit in-stock availability gets a nominal 10
    let availability = raw.availability.to_lowercase();
    let stock = if availability.contains("instock") || availability.contains("in stock") {
        10
    } else {
        0
    };

    let sku = ensure_sku(&raw.sku, &raw.url, vendor_id);
    let category_id = pick_category_id(&raw.category_path, category_map, default_category_id);

    let meta_title = truncate_chars(&name, 60);
    let meta_source = if !raw.short_description.is_empty() {
        &raw.short_description
    } else if !raw.description.is_empty() {
        &raw.description
    } else {
        &name
    };
    let meta_description = truncate_chars(meta_source, 160);

    let mut description = raw.description.clone();
    if description.is_empty() {
        description = if raw.short_description.is_empty() {
            name.clone()
        } else {
            raw.short_description.clone()
        };
    }

    let average_rating = raw.rating_value.trim().parse::<f64>().unwrap_or(0.0);
    let total_reviews = raw.rating_count.trim().parse::<u32>().unwrap_or(0);

    ProductDoc {
        name: name.clone(),
        name_ar: String::new(),
        description,
        short_description: raw.short_description.clone(),

        price: price.unwrap_or(0.0),
        original_price: original,
        currency: if raw.currency.is_empty() {
            "EGP".to_string()
        } else {
            raw.currency.clone()
        },

        sku,
        vendor_sku: raw.sku.clone(),
        brand: raw.brand.clone(),
        model: raw.mpn.clone(),

        category_id,
        vendor_id: vendor_id.to_string(),

        stock,
        min_stock_level: 5,
        max_stock_level: 1000,

        images,

        specifications: raw.specifications.clone(),
        features: raw.features.clone(),
        tags: vec![],

        weight: Weight {
            value: None,
            unit: "g".to_string(),
        },
        dimensions: Dimensions {
            length: None,
            width: None,
            height: None,
            unit: "cm".to_string(),
        },

        is_active: true,
        is_featured: false,
        is_on_sale: sale_percentage.is_some_and(|p| p > 0.0),
        sale_percentage,

        slug: slug.clone(),
        meta_title,
        meta_description,

        average_rating,
        total_reviews,
        total_sold: 0,
        views: 0,

        search_keywords: search_keywords(&slug),

        vendor_data: VendorData {
            source_url: raw.url.clone(),
            last_scraped: now_str.clone(),
            scraped_data: BTreeMap::new(),
        },

        variants: raw.variants.clone(),
        is_bundle: false,
        bundle_items: vec![],

        created_at: now_str.clone(),
        updated_at: now_str.clone(),
        last_scraped_at: now_str,
    }
}

/// Returns the site SKU, or synthesizes a stable one
///
/// The catalog schema requires a unique SKU. When the site has none, we
/// derive one from the vendor id leaf, the product URL slug, and the first
/// six hex digits of SHA-256(url), so re-harvesting the same page always
/// produces the same SKU.
pub fn ensure_sku(raw_sku: &str, url: &str, vendor_id: &str) -> String {
    if !raw_sku.is_empty() {
        return raw_sku.to_string();
    }

    let slug = url_slug(url);
    let slug = if slug.is_empty() { "item" } else { slug.as_str() };

    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let vendor_leaf = vendor_id.rsplit('/').next().unwrap_or(vendor_id);

    format!("{}-{}-{}", vendor_leaf, slug, &digest[..6]).to_lowercase()
}

/// Maps a breadcrumb path to a catalog category id
///
/// Exact path match first; otherwise the first map entry (in sorted key
/// order) whose key ends with the leaf segment; otherwise the default.
pub fn pick_category_id(
    category_path: &str,
    category_map: &BTreeMap<String, String>,
    default_category_id: &str,
) -> String {
    if category_path.is_empty() {
        return default_category_id.to_string();
    }

    if let Some(id) = category_map.get(category_path) {
        return id.clone();
    }

    if let Some(leaf) = category_path
        .split('>')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .last()
    {
        for (key, id) in category_map {
            if key.ends_with(leaf) {
                return id.clone();
            }
        }
    }

    default_category_id.to_string()
}

/// Derives search keywords from a slug: unique segments, at most 15
fn search_keywords(slug: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    for segment in slug.split('-') {
        if !segment.is_empty() && !keywords.iter().any(|k| k == segment) {
            keywords.push(segment.to_string());
        }
        if keywords.len() == 15 {
            break;
        }
    }
    keywords
}
