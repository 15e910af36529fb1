//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the vendor site and run the
//! full listing-crawl, detail-extraction, and schema-mapping cycle
//! end-to-end against temporary output directories.

use shelf_harvest::config::{Config, HttpConfig, ListingConfig, OutputConfig};
use shelf_harvest::crawler::{Harvester, RawProduct};
use shelf_harvest::HarvestError;
use std::collections::BTreeMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at a mock server
fn create_test_config(base_url: &str, out_dir: &str) -> Config {
    Config {
        listing: ListingConfig {
            url: format!("{}/products?vendors=61&vendorName=Test+Vendor", base_url),
            vendor_id: "vendors/Test-Vendor".to_string(),
            default_category_id: "categories/uncategorized".to_string(),
            product_path_prefix: "/products/".to_string(),
        },
        http: HttpConfig {
            max_workers: 3,
            max_retries: 3,
            timeout_secs: 5,
            backoff_ms: 10,
            page_delay_ms: 0,
            detail_delay_ms: 0,
            ..HttpConfig::default()
        },
        output: OutputConfig {
            directory: out_dir.to_string(),
        },
        category_map: BTreeMap::from([(
            "Dental > Instruments".to_string(),
            "categories/instruments".to_string(),
        )]),
    }
}

const MIRROR_PAGE: &str = r#"<html><head>
<script type="application/ld+json">
{
    "@type": "Product",
    "name": "Dental Mirror",
    "brand": {"name": "ProDent"},
    "sku": "DM-005",
    "description": "A finely polished mirror.",
    "image": ["/uploads/mirror.jpg"],
    "offers": {
        "price": "450",
        "priceCurrency": "EGP",
        "highPrice": 600,
        "availability": "https://schema.org/InStock"
    },
    "aggregateRating": {"ratingValue": 4.5, "reviewCount": 12}
}
</script></head>
<body>
<nav class="breadcrumb">
    <a href="/">Home</a><a href="/dental">Dental</a><a href="/dental/instruments">Instruments</a>
</nav>
</body></html>"#;

const GLOVES_PAGE: &str = r#"<html><head></head><body>
<h1>Nitrile Gloves</h1>
<span class="price">EGP 120</span>
<del>EGP 150</del>
<p>In Stock</p>
<div class="summary">Powder free.</div>
<div class="product-gallery"><img src="/uploads/gloves.jpg"></div>
<table>
    <tr><th>Material</th><td>Nitrile</td></tr>
    <tr><th>Count</th><td>100</td></tr>
</table>
</body></html>"#;

fn listing_body() -> String {
    r#"<html><body>
        <a href="/products/gloves">Gloves</a>
        <a href="/products/mirror">Mirror</a>
        <ul class="pagination"><li><a href="/products?vendors=61&page=2">2</a></li></ul>
    </body></html>"#
        .to_string()
}

async fn mount_listing(server: &MockServer) {
    // Both listing pages serve the same body; the URL set deduplicates
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body()))
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, product_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(product_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_round_trip() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_product(&server, "/products/mirror", MIRROR_PAGE).await;
    mount_product(&server, "/products/gloves", GLOVES_PAGE).await;

    let out_dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), out_dir.path().to_str().unwrap());

    let report = Harvester::new(config)
        .expect("Failed to create harvester")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(report.total_pages, 2);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.urls_found, 2);
    assert_eq!(report.products, 2);
    assert!(report.failures.is_empty());

    // Raw file: both products, sorted by URL (gloves before mirror)
    assert_eq!(
        report.raw_path.file_name().unwrap().to_str().unwrap(),
        "raw_61_Test_Vendor.json"
    );
    let raw_content = std::fs::read_to_string(&report.raw_path).unwrap();
    let raw: Vec<RawProduct> = serde_json::from_str(&raw_content).unwrap();
    assert_eq!(raw.len(), 2);
    assert!(raw[0].url.ends_with("/products/gloves"));
    assert!(raw[1].url.ends_with("/products/mirror"));

    // Fallback-extracted product
    assert_eq!(raw[0].title, "Nitrile Gloves");
    assert_eq!(raw[0].price, Some(120.0));
    assert_eq!(raw[0].original_price, Some(150.0));
    assert_eq!(raw[0].currency, "EGP");
    assert_eq!(raw[0].availability, "In Stock");
    assert_eq!(raw[0].short_description, "Powder free.");
    assert_eq!(raw[0].specifications.get("Material").unwrap(), "Nitrile");

    // JSON-LD-extracted product
    assert_eq!(raw[1].title, "Dental Mirror");
    assert_eq!(raw[1].sku, "DM-005");
    assert_eq!(raw[1].price, Some(450.0));
    assert_eq!(raw[1].category_path, "Dental > Instruments");

    // Schema file: mapped documents in the target shape
    assert_eq!(
        report.schema_path.file_name().unwrap().to_str().unwrap(),
        "schema_61_Test_Vendor.json"
    );
    let schema_content = std::fs::read_to_string(&report.schema_path).unwrap();
    let docs: Vec<serde_json::Value> = serde_json::from_str(&schema_content).unwrap();
    assert_eq!(docs.len(), 2);

    let gloves = &docs[0];
    assert_eq!(gloves["name"], "Nitrile Gloves");
    assert_eq!(gloves["price"], 120.0);
    assert_eq!(gloves["originalPrice"], 150.0);
    assert_eq!(gloves["isOnSale"], true);
    assert_eq!(gloves["salePercentage"], 20.0);
    assert_eq!(gloves["stock"], 10);
    assert_eq!(gloves["categoryId"], "categories/uncategorized");
    assert_eq!(gloves["vendorId"], "vendors/Test-Vendor");
    // No site SKU: synthesized from vendor leaf, URL slug, and hash
    assert!(gloves["sku"]
        .as_str()
        .unwrap()
        .starts_with("test-vendor-gloves-"));

    let mirror = &docs[1];
    assert_eq!(mirror["sku"], "DM-005");
    assert_eq!(mirror["vendorSku"], "DM-005");
    assert_eq!(mirror["categoryId"], "categories/instruments");
    assert_eq!(mirror["averageRating"], 4.5);
    assert_eq!(mirror["totalReviews"], 12);
    assert_eq!(mirror["images"][0]["isPrimary"], true);
    assert_eq!(mirror["slug"], "dental-mirror");
    assert_eq!(mirror["searchKeywords"][0], "dental");
}

#[tokio::test]
async fn test_detail_failure_does_not_abort_batch() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_product(&server, "/products/mirror", MIRROR_PAGE).await;

    Mock::given(method("GET"))
        .and(path("/products/gloves"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out_dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), out_dir.path().to_str().unwrap());

    let report = Harvester::new(config)
        .expect("Failed to create harvester")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(report.urls_found, 2);
    assert_eq!(report.products, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].0.ends_with("/products/gloves"));
    assert!(report.failures[0].1.contains("404"));

    let raw: Vec<RawProduct> =
        serde_json::from_str(&std::fs::read_to_string(&report.raw_path).unwrap()).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].title, "Dental Mirror");
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_product(&server, "/products/gloves", GLOVES_PAGE).await;

    // First hit fails with 503; the retry gets the real page
    Mock::given(method("GET"))
        .and(path("/products/mirror"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_product(&server, "/products/mirror", MIRROR_PAGE).await;

    let out_dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), out_dir.path().to_str().unwrap());

    let report = Harvester::new(config)
        .expect("Failed to create harvester")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(report.products, 2);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_empty_listing_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No products here</p></body></html>"),
        )
        .mount(&server)
        .await;

    let out_dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), out_dir.path().to_str().unwrap());

    let result = Harvester::new(config)
        .expect("Failed to create harvester")
        .run()
        .await;

    assert!(matches!(result, Err(HarvestError::EmptyListing { .. })));
}

#[tokio::test]
async fn test_max_pages_caps_pagination() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_product(&server, "/products/mirror", MIRROR_PAGE).await;
    mount_product(&server, "/products/gloves", GLOVES_PAGE).await;

    let out_dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), out_dir.path().to_str().unwrap());

    let report = Harvester::new(config)
        .expect("Failed to create harvester")
        .with_max_pages(Some(1))
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(report.total_pages, 2);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.products, 2);
}
