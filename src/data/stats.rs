//! Per-URL request counters persisted next to the cache
//!
//! The sidecar is loaded once and rewritten in full after every increment.
//! URLs keep the order they were first seen in, and fields other than the two
//! counters survive the rewrite. There is no locking: two processes
//! incrementing at the same time can lose an update. The counters are
//! advisory telemetry, not a ledger.

use super::cache::CACHE_PREFIX;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

const REQUESTS: &str = "requests";
const API_FETCHES: &str = "api_fetches";

/// Counters for a single URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsEntry {
    /// Every façade call for this URL, cache hit or not
    pub requests: u64,
    /// Calls that went to the network and succeeded
    pub api_fetches: u64,
}

/// JSON-backed per-URL stats
#[derive(Debug)]
pub struct StatsTracker {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl StatsTracker {
    /// Default sidecar filename inside the cache directory
    pub fn default_filename() -> String {
        format!("{}_stats.json", CACHE_PREFIX)
    }

    /// Load the tracker stored in `cache_dir`
    pub fn open<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self::with_path(cache_dir.as_ref().join(Self::default_filename()))
    }

    /// Load the tracker from an explicit file. Missing or unparsable files
    /// start empty.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path);
        StatsTracker { path, entries }
    }

    fn load(path: &Path) -> Map<String, Value> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read stats {}: {}", path.display(), e);
                }
                return Map::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring unparsable stats {}: {}", path.display(), e);
            Map::new()
        })
    }

    fn save(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(std::io::Error::from)
            .and_then(|json| std::fs::write(&self.path, json));

        if let Err(e) = result {
            log::warn!("Failed to save stats {}: {}", self.path.display(), e);
        }
    }

    fn increment(&mut self, url: &str, field: &str) {
        let entry = self
            .entries
            .entry(url)
            .or_insert_with(empty_entry);
        if !entry.is_object() {
            *entry = empty_entry();
        }
        if let Value::Object(fields) = entry {
            let count = counter(fields, field);
            fields.insert(field.to_string(), Value::from(count + 1));
        }
        self.save();
    }

    /// Count a façade call for `url`
    pub fn record_request(&mut self, url: &str) {
        self.increment(url, REQUESTS);
    }

    /// Count a successful remote fetch for `url`
    pub fn record_api_fetch(&mut self, url: &str) {
        self.increment(url, API_FETCHES);
    }

    pub fn get(&self, url: &str) -> Option<StatsEntry> {
        match self.entries.get(url)? {
            Value::Object(fields) => Some(StatsEntry {
                requests: counter(fields, REQUESTS),
                api_fetches: counter(fields, API_FETCHES),
            }),
            _ => Some(StatsEntry::default()),
        }
    }

    /// All tracked URLs in first-seen order, as stored
    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn empty_entry() -> Value {
    json!({ "requests": 0, "api_fetches": 0 })
}

/// A missing or non-numeric counter reads as zero
fn counter(fields: &Map<String, Value>, field: &str) -> u64 {
    fields.get(field).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.livefpl.net/prices";

    #[test]
    fn test_counters_persist_across_loads() {
        let dir = tempfile::tempdir().unwrap();

        let mut stats = StatsTracker::open(dir.path());
        stats.record_request(URL);
        stats.record_request(URL);
        stats.record_api_fetch(URL);

        let reloaded = StatsTracker::open(dir.path());
        assert_eq!(
            reloaded.get(URL),
            Some(StatsEntry {
                requests: 2,
                api_fetches: 1
            })
        );
        assert!(dir.path().join("fpl_cache_stats.json").exists());
    }

    #[test]
    fn test_corrupt_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(StatsTracker::default_filename());
        std::fs::write(&path, "{not json").unwrap();

        let mut stats = StatsTracker::open(dir.path());
        assert!(stats.entries().is_empty());

        stats.record_request(URL);
        let reloaded = StatsTracker::open(dir.path());
        assert_eq!(reloaded.get(URL).unwrap().requests, 1);
    }

    #[test]
    fn test_missing_counter_fields_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(StatsTracker::default_filename());
        std::fs::write(&path, format!(r#"{{"{}": {{"requests": 4}}}}"#, URL)).unwrap();

        let mut stats = StatsTracker::open(dir.path());
        stats.record_api_fetch(URL);
        assert_eq!(
            stats.get(URL),
            Some(StatsEntry {
                requests: 4,
                api_fetches: 1
            })
        );
    }

    #[test]
    fn test_rewrite_keeps_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = StatsTracker::open(dir.path());
        stats.record_request("https://z.example/");
        stats.record_request("https://a.example/");
        stats.record_request("https://z.example/");

        let content = std::fs::read_to_string(stats.path()).unwrap();
        let z = content.find("https://z.example/").unwrap();
        let a = content.find("https://a.example/").unwrap();
        assert!(z < a, "{}", content);

        let reloaded = StatsTracker::open(dir.path());
        let urls: Vec<&String> = reloaded.entries().keys().collect();
        assert_eq!(urls, vec!["https://z.example/", "https://a.example/"]);
    }

    #[test]
    fn test_unknown_fields_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(StatsTracker::default_filename());
        std::fs::write(
            &path,
            format!(r#"{{"{}": {{"requests": 1, "api_fetches": 1, "note": "seeded"}}}}"#, URL),
        )
        .unwrap();

        let mut stats = StatsTracker::open(dir.path());
        stats.record_request(URL);

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            saved[URL],
            json!({"requests": 2, "api_fetches": 1, "note": "seeded"})
        );
    }

    #[test]
    fn test_unwritable_location_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every save fail
        let path = dir.path().join("stats.json");
        std::fs::create_dir(&path).unwrap();

        let mut stats = StatsTracker::with_path(&path);
        stats.record_request(URL);
        stats.record_api_fetch(URL);
        assert_eq!(stats.get(URL).unwrap().requests, 1);
    }
}
