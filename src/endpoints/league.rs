//! `leagues-classic/{id}/standings/`: one page of classic league standings

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
struct RawStanding {
    rank: Option<i64>,
    entry: Option<i64>,
    player_name: Option<String>,
    entry_name: Option<String>,
    total: Option<i64>,
    event_total: Option<i64>,
    last_rank: Option<i64>,
    movement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub rank: Option<i64>,
    pub entry: Option<i64>,
    pub player_name: Option<String>,
    pub entry_name: Option<String>,
    pub total: Option<i64>,
    pub event_total: Option<i64>,
    pub last_rank: Option<i64>,
    pub movement: Option<String>,
}

impl From<RawStanding> for Standing {
    fn from(r: RawStanding) -> Self {
        Standing {
            rank: r.rank,
            entry: r.entry,
            player_name: r.player_name,
            entry_name: r.entry_name,
            total: r.total,
            event_total: r.event_total,
            last_rank: r.last_rank,
            movement: r.movement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    pub page: Option<i64>,
    pub results: usize,
    pub has_next: Option<bool>,
    pub has_previous: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueStandings {
    /// League metadata, passed through untouched
    pub league: Value,
    pub standings: Vec<Standing>,
    pub page: PageInfo,
}

/// Shape a standings page. `page` is the requested page number, reported
/// when the payload does not say which page it is.
pub fn standings(value: Value, page: u32) -> LeagueStandings {
    let requested = Some(i64::from(page));

    let Value::Object(mut data) = value else {
        return LeagueStandings {
            league: Value::Object(Map::new()),
            standings: Vec::new(),
            page: PageInfo {
                page: requested,
                results: 0,
                has_next: None,
                has_previous: None,
            },
        };
    };

    let league = data
        .remove("league")
        .unwrap_or_else(|| Value::Object(Map::new()));

    let (rows, page_info) = match data.remove("standings") {
        Some(Value::Object(section)) => {
            let rows = match section.get("results") {
                Some(Value::Array(results)) => results
                    .iter()
                    .filter_map(|r| serde_json::from_value::<RawStanding>(r.clone()).ok())
                    .map(Standing::from)
                    .collect(),
                _ => Vec::new(),
            };
            let info = PageInfo {
                page: section.get("page").and_then(Value::as_i64),
                results: 0,
                has_next: section.get("has_next").and_then(Value::as_bool),
                has_previous: section.get("has_previous").and_then(Value::as_bool),
            };
            (rows, info)
        }
        _ => (
            Vec::new(),
            PageInfo {
                page: requested,
                results: 0,
                has_next: None,
                has_previous: None,
            },
        ),
    };

    LeagueStandings {
        league,
        page: PageInfo {
            results: rows.len(),
            ..page_info
        },
        standings: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standings_page() {
        let shaped = standings(
            json!({
                "league": {"id": 314, "name": "Overall"},
                "standings": {
                    "page": 2, "has_next": true, "has_previous": true,
                    "results": [
                        {"rank": 51, "entry": 7, "player_name": "Ada", "entry_name": "Engines",
                         "total": 900, "event_total": 60, "last_rank": 55, "movement": "up"},
                        {"rank": 52, "entry": 8, "player_name": "Alan", "entry_name": "Turings",
                         "total": 899, "event_total": 40, "last_rank": 40, "movement": "down"}
                    ]
                }
            }),
            2,
        );

        assert_eq!(shaped.league["name"], "Overall");
        assert_eq!(shaped.standings.len(), 2);
        assert_eq!(shaped.standings[1].movement.as_deref(), Some("down"));
        assert_eq!(
            shaped.page,
            PageInfo {
                page: Some(2),
                results: 2,
                has_next: Some(true),
                has_previous: Some(true)
            }
        );
    }

    #[test]
    fn test_non_object_payload() {
        let shaped = standings(json!([1, 2, 3]), 4);
        assert!(shaped.standings.is_empty());
        assert_eq!(shaped.league, json!({}));
        assert_eq!(shaped.page.page, Some(4));
        assert_eq!(shaped.page.has_next, None);
    }

    #[test]
    fn test_missing_standings_section() {
        let shaped = standings(json!({"league": {"id": 1}}), 1);
        assert!(shaped.standings.is_empty());
        assert_eq!(shaped.page.page, Some(1));
        assert_eq!(shaped.page.results, 0);
    }
}
