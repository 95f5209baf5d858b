//! Fantasy Premier League data retrieval
//!
//! Cached fetching of the FPL JSON API and the LiveFPL price-change page,
//! shaped into flat JSON records for downstream tools.

pub mod data;
pub mod endpoints;
pub mod output;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// FPL element (player) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// Price-change progress for a single player, as scraped from LiveFPL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: PlayerId,
    pub pct_now: Option<f64>,
    pub pct_tonight: Option<f64>,
}

impl PriceRecord {
    /// Check whether either metric selected by `now`/`tonight` satisfies `pred`
    pub fn any_metric(&self, now: bool, tonight: bool, pred: impl Fn(f64) -> bool) -> bool {
        (now && self.pct_now.is_some_and(&pred)) || (tonight && self.pct_tonight.is_some_and(&pred))
    }
}

/// Parsed price page plus the instant it was parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub players: Vec<PriceRecord>,
    pub fetched_at: String,
}

/// Application-wide errors
///
/// The fetch-path variants keep the cache key and URL so the message alone
/// identifies the failing request.
#[derive(Debug, Error)]
pub enum FplError {
    #[error("Network Error fetching {cache_key} from {url}: {reason}")]
    Network {
        cache_key: String,
        url: String,
        reason: String,
    },

    #[error("API Error fetching {cache_key} from {url}: Status {status}, Reason {reason}")]
    Api {
        cache_key: String,
        url: String,
        status: u16,
        reason: String,
    },

    #[error(
        "Data Parsing Error fetching {cache_key} from {url}: Failed to decode JSON. Error: {detail}"
    )]
    Decode {
        cache_key: String,
        url: String,
        detail: String,
    },

    #[error("An unexpected error occurred during {cache_key} fetch from {url}: {detail}")]
    Unexpected {
        cache_key: String,
        url: String,
        detail: String,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<FplError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidArgs(String),

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FplError {
    /// Prefix the message with what the caller was doing
    pub fn context(self, context: impl Into<String>) -> Self {
        FplError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FplError>;

/// Application configuration loaded from fpl.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cache: CacheConfig,
    pub api: ApiConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub dir: PathBuf,
    /// Calendar days a cached API response stays fresh
    pub expiry_days: u32,
    /// Hours a cached price page stays fresh
    pub expiry_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub prices_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Cap on players returned by the prices tool
    pub max_players: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache: CacheConfig {
                dir: PathBuf::from("cache"),
                expiry_days: 1,
                expiry_hours: 12,
            },
            api: ApiConfig {
                base_url: "https://fantasy.premierleague.com/api".to_string(),
                prices_url: "https://www.livefpl.net/prices".to_string(),
                user_agent: None,
            },
            output: OutputConfig { max_players: 100 },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FplError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FplError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Replace the cache directory when one was given on the command line
    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.cache.dir = dir;
        }
        self
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FplError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
