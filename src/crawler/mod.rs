//! Crawler module for listing and detail page processing
//!
//! This module contains the harvesting logic, including:
//! - HTTP fetching with retry and politeness jitter
//! - Listing page parsing and pagination
//! - Detail page field extraction
//! - Overall harvest coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;

pub use coordinator::{run_harvest, Harvester};
pub use detail::{parse_detail, RawProduct};
pub use fetcher::{build_http_client, fetch_html, jitter_sleep};
pub use listing::{parse_listing, ListingPage};
