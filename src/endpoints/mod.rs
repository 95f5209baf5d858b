//! FPL API endpoints
//!
//! URL and cache-key construction for each endpoint, plus pure shaping
//! functions that flatten the raw responses into the records the CLI prints.

pub mod bootstrap;
pub mod entry;
pub mod fixtures;
pub mod league;
pub mod live;
pub mod prices;

use crate::data::{CachedClient, Fetcher};
use crate::Result;
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A URL plus the cache key its response is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub cache_key: String,
}

impl ApiRequest {
    /// Fetch through the cache
    pub fn fetch<F: Fetcher>(&self, client: &mut CachedClient<F>, force_refresh: bool) -> Result<Value> {
        client.fetch_json(&self.url, &self.cache_key, force_refresh)
    }
}

/// Builds requests against one API root
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Endpoints {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, path: &str, cache_key: String) -> ApiRequest {
        ApiRequest {
            url: format!("{}/{}", self.base_url, path),
            cache_key,
        }
    }

    /// Players, teams, gameweeks and positions
    pub fn bootstrap(&self) -> ApiRequest {
        self.request("bootstrap-static/", "bootstrap_static".to_string())
    }

    pub fn entry_details(&self, entry_id: u64) -> ApiRequest {
        self.request(
            &format!("entry/{}/", entry_id),
            format!("entry_{}_details", entry_id),
        )
    }

    pub fn entry_history(&self, entry_id: u64) -> ApiRequest {
        self.request(
            &format!("entry/{}/history/", entry_id),
            format!("entry_{}_history", entry_id),
        )
    }

    pub fn entry_transfers(&self, entry_id: u64) -> ApiRequest {
        self.request(
            &format!("entry/{}/transfers/", entry_id),
            format!("entry_{}_transfers", entry_id),
        )
    }

    pub fn entry_picks(&self, entry_id: u64, gameweek: u32) -> ApiRequest {
        self.request(
            &format!("entry/{}/event/{}/picks/", entry_id, gameweek),
            format!("entry_{}_picks_gw{}", entry_id, gameweek),
        )
    }

    /// All fixtures, or one gameweek's
    pub fn fixtures(&self, gameweek: Option<u32>) -> ApiRequest {
        match gameweek {
            Some(gw) => self.request(
                &format!("fixtures/?event={}", gw),
                format!("fixtures_event_{}", gw),
            ),
            None => self.request("fixtures/", "fixtures".to_string()),
        }
    }

    pub fn league_standings(&self, league_id: u64, page: u32) -> ApiRequest {
        self.request(
            &format!(
                "leagues-classic/{}/standings/?page_standings={}",
                league_id, page
            ),
            format!("league_{}_standings_p{}", league_id, page),
        )
    }

    pub fn live_gameweek(&self, gameweek: u32) -> ApiRequest {
        self.request(
            &format!("event/{}/live/", gameweek),
            format!("live_event_{}", gameweek),
        )
    }
}

/// Lower-cased, accent-stripped form of `s` for fuzzy name matching
pub fn normalize_str(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Price stored in tenths (e.g. `now_cost: 55`) as a decimal amount
pub(crate) fn tenths(value: Option<i64>) -> Option<f64> {
    value.map(|v| v as f64 / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_and_cache_keys() {
        let api = Endpoints::new("https://fantasy.premierleague.com/api/");

        let req = api.bootstrap();
        assert_eq!(req.url, "https://fantasy.premierleague.com/api/bootstrap-static/");
        assert_eq!(req.cache_key, "bootstrap_static");

        let req = api.entry_picks(123, 7);
        assert_eq!(req.url, "https://fantasy.premierleague.com/api/entry/123/event/7/picks/");
        assert_eq!(req.cache_key, "entry_123_picks_gw7");

        let req = api.fixtures(Some(3));
        assert_eq!(req.url, "https://fantasy.premierleague.com/api/fixtures/?event=3");
        assert_eq!(req.cache_key, "fixtures_event_3");
        assert_eq!(api.fixtures(None).cache_key, "fixtures");

        let req = api.league_standings(314, 2);
        assert_eq!(
            req.url,
            "https://fantasy.premierleague.com/api/leagues-classic/314/standings/?page_standings=2"
        );
        assert_eq!(req.cache_key, "league_314_standings_p2");

        assert_eq!(api.live_gameweek(5).cache_key, "live_event_5");
        assert_eq!(api.entry_history(9).cache_key, "entry_9_history");
        assert_eq!(api.entry_transfers(9).cache_key, "entry_9_transfers");
        assert_eq!(api.entry_details(9).cache_key, "entry_9_details");
    }

    #[test]
    fn test_normalize_str() {
        assert_eq!(normalize_str("Ødegaard"), "ødegaard");
        assert_eq!(normalize_str("Fernandes"), "fernandes");
        assert_eq!(normalize_str("Gabriel Martinelli Silva"), "gabriel martinelli silva");
        assert_eq!(normalize_str("Raúl Jiménez"), "raul jimenez");
        assert!(normalize_str("Mbeumo Bryan").contains(&normalize_str("MBEUMO")));
    }

    #[test]
    fn test_tenths() {
        assert_eq!(tenths(Some(55)), Some(5.5));
        assert_eq!(tenths(None), None);
    }
}
