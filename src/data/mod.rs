//! Data retrieval
//!
//! Disk cache, request stats, HTTP fetching and the cached façade that ties
//! them together.

pub mod cache;
pub mod client;
pub mod fetcher;
pub mod scrapers;
pub mod stats;

pub use cache::{CacheKind, CacheLookup, CacheStore, Expiry};
pub use client::CachedClient;
pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use stats::{StatsEntry, StatsTracker};
