//! On-disk response cache
//!
//! One flat directory; each key maps to `fpl_cache_<key>.<ext>`. Freshness is
//! derived from the file modification time and never stored. Writes are plain
//! overwrites, so a torn file is possible under a crash or a concurrent
//! writer; readers treat anything they cannot decode as a miss.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Filename prefix shared by every cache entry and the stats sidecar
pub const CACHE_PREFIX: &str = "fpl_cache";

/// Payload flavour stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Json,
    Html,
}

impl CacheKind {
    pub fn extension(&self) -> &'static str {
        match self {
            CacheKind::Json => "json",
            CacheKind::Html => "html",
        }
    }
}

/// How long an entry stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Calendar days in local time: an entry written yesterday has age 1
    /// regardless of the hour it was written.
    Days(u32),
    /// Elapsed wall-clock hours
    Hours(u32),
}

impl Expiry {
    /// Decide whether a file modified at `modified` is still fresh at `now`
    pub fn is_fresh(&self, modified: SystemTime, now: SystemTime) -> bool {
        match *self {
            Expiry::Days(days) => {
                let modified_date = DateTime::<Local>::from(modified).date_naive();
                let today = DateTime::<Local>::from(now).date_naive();
                (today - modified_date).num_days() < i64::from(days)
            }
            Expiry::Hours(hours) => {
                // An mtime in the future counts as age zero
                let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
                age < Duration::from_secs(u64::from(hours) * 3600)
            }
        }
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Days(d) => write!(f, "{} day(s)", d),
            Expiry::Hours(h) => write!(f, "{} hour(s)", h),
        }
    }
}

/// Outcome of a cache read
#[derive(Debug)]
pub enum CacheLookup<T> {
    /// Fresh and decodable
    Hit(T),
    /// No file for this key
    Missing,
    /// File exists but is older than the expiry window
    Stale,
    /// File exists and is fresh but could not be read or decoded
    Corrupt(String),
}

impl<T> CacheLookup<T> {
    pub fn hit(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            _ => None,
        }
    }

    /// Short label for log lines
    pub fn describe(&self) -> &'static str {
        match self {
            CacheLookup::Hit(_) => "hit",
            CacheLookup::Missing => "missing",
            CacheLookup::Stale => "stale",
            CacheLookup::Corrupt(_) => "corrupt",
        }
    }
}

/// Cache directory handle
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open a cache rooted at `dir`, creating it if needed.
    ///
    /// A directory that cannot be created is logged, not returned: every later
    /// write then fails and is skipped the same way.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            log::warn!("Failed to create cache directory {}: {}", dir.display(), e);
        }
        CacheStore { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. The JSON key `stats` would collide with the stats
    /// sidecar, so no endpoint uses it.
    pub fn path_for(&self, key: &str, kind: CacheKind) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{}", CACHE_PREFIX, key, kind.extension()))
    }

    /// Check whether the entry for `key` exists and is within `expiry`
    pub fn is_fresh(&self, key: &str, kind: CacheKind, expiry: Expiry) -> bool {
        std::fs::metadata(self.path_for(key, kind))
            .and_then(|meta| meta.modified())
            .map(|modified| expiry.is_fresh(modified, SystemTime::now()))
            .unwrap_or(false)
    }

    /// Read the entry for `key` if fresh, decoding it with `decode`
    pub fn lookup<T, F>(&self, key: &str, kind: CacheKind, expiry: Expiry, decode: F) -> CacheLookup<T>
    where
        F: FnOnce(Vec<u8>) -> std::result::Result<T, String>,
    {
        let path = self.path_for(key, kind);

        let modified = match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheLookup::Missing,
            Err(e) => return CacheLookup::Corrupt(e.to_string()),
        };

        if !expiry.is_fresh(modified, SystemTime::now()) {
            return CacheLookup::Stale;
        }

        match std::fs::read(&path) {
            Ok(bytes) => match decode(bytes) {
                Ok(value) => CacheLookup::Hit(value),
                Err(e) => CacheLookup::Corrupt(e),
            },
            Err(e) => CacheLookup::Corrupt(e.to_string()),
        }
    }

    /// Overwrite the entry for `key`
    pub fn write(&self, key: &str, kind: CacheKind, payload: &[u8]) -> std::io::Result<()> {
        let path = self.path_for(key, kind);
        std::fs::write(&path, payload)?;
        log::debug!("Saved to cache: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> SystemTime {
        Local
            .with_ymd_and_hms(y, m, d, h, min, s)
            .earliest()
            .unwrap()
            .into()
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    fn utf8(bytes: Vec<u8>) -> std::result::Result<String, String> {
        String::from_utf8(bytes).map_err(|e| e.to_string())
    }

    #[test]
    fn test_path_derivation() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        assert_eq!(
            store.path_for("bootstrap_static", CacheKind::Json),
            dir.path().join("fpl_cache_bootstrap_static.json")
        );
        assert_eq!(
            store.path_for("prices", CacheKind::Html),
            dir.path().join("fpl_cache_prices.html")
        );
        assert_ne!(
            store.path_for("entry_1_details", CacheKind::Json),
            store.path_for("entry_11_details", CacheKind::Json)
        );
    }

    #[test]
    fn test_stats_key_shares_the_sidecar_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        assert_eq!(
            store.path_for("stats", CacheKind::Json),
            dir.path().join(crate::data::StatsTracker::default_filename())
        );
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = CacheStore::new(&nested);
        assert!(nested.is_dir());

        // Second open of the same directory is harmless
        let again = CacheStore::new(&nested);
        assert_eq!(store.dir(), again.dir());
    }

    #[test]
    fn test_hours_expiry_boundary() {
        let expiry = Expiry::Hours(12);
        let modified = local(2026, 10, 15, 8, 0, 0);
        let window = Duration::from_secs(12 * 3600);

        assert!(expiry.is_fresh(modified, modified + window - Duration::from_secs(1)));
        assert!(!expiry.is_fresh(modified, modified + window + Duration::from_secs(1)));
        assert!(!expiry.is_fresh(modified, modified + window));
    }

    #[test]
    fn test_future_mtime_is_fresh() {
        let now = local(2026, 10, 15, 8, 0, 0);
        assert!(Expiry::Hours(1).is_fresh(now + Duration::from_secs(60), now));
    }

    #[test]
    fn test_days_expiry_uses_calendar_dates() {
        let expiry = Expiry::Days(1);

        // Same local day, nearly 24 hours apart: still fresh
        assert!(expiry.is_fresh(local(2026, 10, 15, 0, 0, 1), local(2026, 10, 15, 23, 59, 59)));
        // Across midnight, two minutes apart: stale
        assert!(!expiry.is_fresh(local(2026, 10, 14, 23, 59, 0), local(2026, 10, 15, 0, 1, 0)));

        let two_days = Expiry::Days(2);
        assert!(two_days.is_fresh(local(2026, 10, 14, 12, 0, 0), local(2026, 10, 15, 12, 0, 0)));
        assert!(!two_days.is_fresh(local(2026, 10, 13, 12, 0, 0), local(2026, 10, 15, 12, 0, 0)));
    }

    #[test]
    fn test_zero_expiry_is_never_fresh() {
        let now = SystemTime::now();
        assert!(!Expiry::Days(0).is_fresh(now, now));
        assert!(!Expiry::Hours(0).is_fresh(now, now));
    }

    #[test]
    fn test_lookup_states() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let expiry = Expiry::Hours(12);

        assert!(matches!(
            store.lookup("prices", CacheKind::Html, expiry, utf8),
            CacheLookup::Missing
        ));

        store.write("prices", CacheKind::Html, b"<div></div>").unwrap();
        assert!(store.is_fresh("prices", CacheKind::Html, expiry));
        let hit = store.lookup("prices", CacheKind::Html, expiry, utf8).hit();
        assert_eq!(hit.as_deref(), Some("<div></div>"));

        let path = store.path_for("prices", CacheKind::Html);
        set_mtime(&path, SystemTime::now() - Duration::from_secs(13 * 3600));
        assert!(!store.is_fresh("prices", CacheKind::Html, expiry));
        assert!(matches!(
            store.lookup("prices", CacheKind::Html, expiry, utf8),
            CacheLookup::Stale
        ));
    }

    #[test]
    fn test_undecodable_entry_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        store.write("prices", CacheKind::Html, &[0xff, 0xfe, 0x00]).unwrap();
        let lookup = store.lookup("prices", CacheKind::Html, Expiry::Hours(12), utf8);
        assert_eq!(lookup.describe(), "corrupt");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        store.write("x", CacheKind::Json, br#"{"a":1}"#).unwrap();
        store.write("x", CacheKind::Json, br#"{"a":2}"#).unwrap();
        let content = std::fs::read_to_string(store.path_for("x", CacheKind::Json)).unwrap();
        assert_eq!(content, r#"{"a":2}"#);
    }
}
