//! Harvest coordinator - main orchestration logic
//!
//! This module sequences the whole harvest:
//! 1. Crawl the paginated listing and collect product URLs
//! 2. Fetch and extract every detail page through a fixed-size worker pool
//! 3. Write the raw extracted records
//! 4. Map every record to the target schema and write the schema file

use crate::config::Config;
use crate::crawler::detail::{parse_detail, RawProduct};
use crate::crawler::fetcher::{build_http_client, fetch_html, jitter_sleep};
use crate::crawler::listing::parse_listing;
use crate::mapper::{to_catalog_doc, ProductDoc};
use crate::output::{output_paths, print_report, write_json_array, HarvestReport};
use crate::url::{site_origin, vendor_from_url, with_page};
use crate::{HarvestError, Result};
use chrono::Utc;
use reqwest::Client;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Main harvest coordinator
pub struct Harvester {
    config: Arc<Config>,
    client: Client,
    max_pages: Option<u32>,
}

impl Harvester {
    /// Creates a new harvester from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.http)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            max_pages: None,
        })
    }

    /// Caps the number of listing pages fetched (None means all)
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Runs the full harvest and returns a summary report
    ///
    /// Individual detail-page failures are recorded in the report without
    /// aborting the batch; listing-phase failures are fatal.
    pub async fn run(&self) -> Result<HarvestReport> {
        let listing_url = Url::parse(&self.config.listing.url)?;
        let origin = site_origin(&listing_url)?;
        let vendor = vendor_from_url(&listing_url);

        // Phase 1: collect product URLs from the paginated listing
        let (product_urls, total_pages, pages_fetched) =
            self.gather_product_urls(&listing_url, &origin).await?;

        if product_urls.is_empty() {
            return Err(HarvestError::EmptyListing {
                url: listing_url.to_string(),
            });
        }

        tracing::info!("[LIST] Found {} unique product URLs", product_urls.len());

        // Phase 2: fetch and extract detail pages through the worker pool
        let (mut raw_results, failures) = self.fetch_details(&product_urls, &origin).await;

        // Collection order depends on task completion; sort for stable output
        raw_results.sort_by(|a, b| a.url.cmp(&b.url));

        // Phase 3: write raw extracted records
        std::fs::create_dir_all(&self.config.output.directory)?;
        let (raw_path, schema_path) = output_paths(&self.config.output.directory, &vendor);
        write_json_array(&raw_path, &raw_results)?;
        tracing::info!("Wrote {} raw records to {}", raw_results.len(), raw_path.display());

        // Phase 4: map to the target schema and write
        let now = Utc::now();
        let docs: Vec<ProductDoc> = raw_results
            .iter()
            .map(|raw| {
                to_catalog_doc(
                    raw,
                    &self.config.listing.vendor_id,
                    &self.config.category_map,
                    &self.config.listing.default_category_id,
                    now,
                )
            })
            .collect();
        write_json_array(&schema_path, &docs)?;
        tracing::info!("Wrote {} documents to {}", docs.len(), schema_path.display());

        Ok(HarvestReport {
            total_pages,
            pages_fetched,
            urls_found: product_urls.len(),
            products: docs.len(),
            failures,
            raw_path,
            schema_path,
        })
    }

    /// Crawls the listing pagination and returns sorted unique product URLs
    ///
    /// Returns (urls, total_pages advertised, pages actually fetched).
    async fn gather_product_urls(
        &self,
        listing_url: &Url,
        origin: &Url,
    ) -> Result<(Vec<String>, u32, u32)> {
        let http = &self.config.http;
        let prefix = &self.config.listing.product_path_prefix;

        let body = fetch_html(&self.client, listing_url.as_str(), http).await?;
        let first = parse_listing(&body, origin, prefix);

        let total_pages = first.total_pages;
        let last_page = match self.max_pages {
            Some(cap) => total_pages.min(cap.max(1)),
            None => total_pages,
        };
        tracing::info!("[LIST] Total pages: {} (fetching {})", total_pages, last_page);

        let mut urls: BTreeSet<String> = first.product_urls.into_iter().collect();

        for page in 2..=last_page {
            jitter_sleep(http.page_delay_ms).await;

            let page_url = with_page(listing_url, page);
            tracing::info!("[LIST] {}/{} -> {}", page, last_page, page_url);

            let body = fetch_html(&self.client, page_url.as_str(), http).await?;
            urls.extend(parse_listing(&body, origin, prefix).product_urls);
        }

        Ok((urls.into_iter().collect(), total_pages, last_page))
    }

    /// Fetches all detail pages through a fixed-size worker pool
    ///
    /// Results are collected as tasks complete, in no particular order.
    /// Failures are recorded per URL and never abort the batch.
    async fn fetch_details(
        &self,
        product_urls: &[String],
        origin: &Url,
    ) -> (Vec<RawProduct>, Vec<(String, String)>) {
        let semaphore = Arc::new(Semaphore::new(self.config.http.max_workers as usize));
        let mut tasks: JoinSet<(String, Result<RawProduct>)> = JoinSet::new();

        for url in product_urls {
            let url = url.clone();
            let client = self.client.clone();
            let http = self.config.http.clone();
            let origin = origin.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (url, Err(HarvestError::PoolClosed)),
                };

                jitter_sleep(http.detail_delay_ms).await;

                let result = fetch_html(&client, &url, &http)
                    .await
                    .map(|body| parse_detail(&body, &url, &origin));
                (url, result)
            });
        }

        let total = product_urls.len();
        let mut done = 0;
        let mut raw_results = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined {
                Ok((_, Ok(raw))) => {
                    tracing::info!("[DETAIL] {}/{} OK", done, total);
                    raw_results.push(raw);
                }
                Ok((url, Err(e))) => {
                    tracing::warn!("[DETAIL] {}/{} ERROR: {} => {}", done, total, url, e);
                    failures.push((url, e.to_string()));
                }
                Err(e) => {
                    tracing::error!("[DETAIL] {}/{} worker panicked: {}", done, total, e);
                    failures.push(("<worker>".to_string(), e.to_string()));
                }
            }
        }

        (raw_results, failures)
    }
}

/// Runs a complete harvest and prints the report
///
/// This is the main entry point used by the CLI.
pub async fn run_harvest(config: Config, max_pages: Option<u32>) -> Result<HarvestReport> {
    let harvester = Harvester::new(config)?.with_max_pages(max_pages);
    let report = harvester.run().await?;
    print_report(&report);
    Ok(report)
}
