//! Cached retrieval façade
//!
//! Every call is counted in the stats sidecar. A fresh, readable cache entry
//! is served without touching the network; otherwise the fetcher runs, the
//! body is written back to the cache and the fetch is counted. Only fetch
//! failures reach the caller: cache and stats problems are logged and skipped.

use super::cache::{CacheKind, CacheLookup, CacheStore, Expiry};
use super::fetcher::{Fetcher, HttpFetcher};
use super::scrapers::prices;
use super::stats::StatsTracker;
use crate::{Config, FplError, PriceSnapshot, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Cache + fetcher + stats, bound to one cache directory
pub struct CachedClient<F: Fetcher = HttpFetcher> {
    fetcher: F,
    cache: CacheStore,
    stats: StatsTracker,
    json_expiry: Expiry,
    html_expiry: Expiry,
}

impl CachedClient<HttpFetcher> {
    /// Client talking to the network with the configured cache settings
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::with_user_agent(config.api.user_agent.as_deref())?;
        Ok(CachedClient::new(fetcher, &config.cache.dir).with_expiry(
            Expiry::Days(config.cache.expiry_days),
            Expiry::Hours(config.cache.expiry_hours),
        ))
    }
}

impl<F: Fetcher> CachedClient<F> {
    /// Client with the default windows: one calendar day for JSON, twelve
    /// hours for HTML
    pub fn new<P: AsRef<Path>>(fetcher: F, cache_dir: P) -> Self {
        let cache = CacheStore::new(cache_dir);
        let stats = StatsTracker::open(cache.dir());
        CachedClient {
            fetcher,
            cache,
            stats,
            json_expiry: Expiry::Days(1),
            html_expiry: Expiry::Hours(12),
        }
    }

    pub fn with_expiry(mut self, json: Expiry, html: Expiry) -> Self {
        self.json_expiry = json;
        self.html_expiry = html;
        self
    }

    /// Current JSON for `url`, cached under `cache_key`
    pub fn fetch_json(&mut self, url: &str, cache_key: &str, force_refresh: bool) -> Result<Value> {
        self.stats.record_request(url);

        if !force_refresh {
            let lookup = self
                .cache
                .lookup(cache_key, CacheKind::Json, self.json_expiry, |bytes| {
                    serde_json::from_slice::<Value>(&bytes).map_err(|e| e.to_string())
                });
            if let Some(value) = self.report_lookup(cache_key, lookup) {
                return Ok(value);
            }
        }

        let body = self
            .fetcher
            .fetch(url)
            .map_err(|e| e.tagged(cache_key, url))?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| FplError::Decode {
            cache_key: cache_key.to_string(),
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        match to_json_indented(&value) {
            Ok(pretty) => self.store(cache_key, CacheKind::Json, &pretty),
            Err(e) => log::warn!("Failed to serialize {} for caching: {}", cache_key, e),
        }
        self.stats.record_api_fetch(url);

        Ok(value)
    }

    /// Current price page for `url`, parsed. The raw markup is what gets
    /// cached, so a cache hit is re-parsed on every call.
    pub fn fetch_html_parsed(
        &mut self,
        url: &str,
        cache_key: &str,
        force_refresh: bool,
    ) -> Result<PriceSnapshot> {
        self.stats.record_request(url);

        if !force_refresh {
            let lookup = self
                .cache
                .lookup(cache_key, CacheKind::Html, self.html_expiry, |bytes| {
                    String::from_utf8(bytes).map_err(|e| e.to_string())
                });
            if let Some(html) = self.report_lookup(cache_key, lookup) {
                return Ok(prices::snapshot(&html));
            }
        }

        let body = self
            .fetcher
            .fetch(url)
            .map_err(|e| e.tagged(cache_key, url))?;
        let html = String::from_utf8_lossy(&body).into_owned();

        self.store(cache_key, CacheKind::Html, html.as_bytes());
        self.stats.record_api_fetch(url);

        Ok(prices::snapshot(&html))
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn report_lookup<T>(&self, cache_key: &str, lookup: CacheLookup<T>) -> Option<T> {
        match lookup {
            CacheLookup::Hit(value) => {
                log::debug!("Cache hit for {}", cache_key);
                Some(value)
            }
            CacheLookup::Corrupt(reason) => {
                log::warn!("Ignoring unreadable cache entry {}: {}", cache_key, reason);
                None
            }
            other => {
                log::debug!("Cache {} for {}", other.describe(), cache_key);
                None
            }
        }
    }

    fn store(&self, cache_key: &str, kind: CacheKind, payload: &[u8]) {
        if let Err(e) = self.cache.write(cache_key, kind, payload) {
            log::warn!("Failed to cache {}: {}", cache_key, e);
        }
    }
}

/// Pretty JSON with four-space indentation
fn to_json_indented(value: &Value) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
