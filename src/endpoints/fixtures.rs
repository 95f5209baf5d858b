//! `fixtures/`: all fixtures or one gameweek's

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct RawFixture {
    id: Option<i64>,
    event: Option<i64>,
    team_h: Option<i64>,
    team_a: Option<i64>,
    team_h_difficulty: Option<i64>,
    team_a_difficulty: Option<i64>,
    minutes: Option<i64>,
    started: Option<bool>,
    finished: Option<bool>,
    kickoff_time: Option<String>,
    team_h_score: Option<i64>,
    team_a_score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub id: Option<i64>,
    pub event: Option<i64>,
    pub team_h: Option<i64>,
    pub team_a: Option<i64>,
    pub team_h_difficulty: Option<i64>,
    pub team_a_difficulty: Option<i64>,
    pub minutes: Option<i64>,
    pub started: Option<bool>,
    pub finished: Option<bool>,
    pub kickoff_time: Option<String>,
    pub team_h_score: Option<i64>,
    pub team_a_score: Option<i64>,
    /// `"home-away"` once both scores are known
    pub score: Option<String>,
}

impl From<RawFixture> for Fixture {
    fn from(f: RawFixture) -> Self {
        let score = match (f.team_h_score, f.team_a_score) {
            (Some(h), Some(a)) => Some(format!("{}-{}", h, a)),
            _ => None,
        };
        Fixture {
            id: f.id,
            event: f.event,
            team_h: f.team_h,
            team_a: f.team_a,
            team_h_difficulty: f.team_h_difficulty,
            team_a_difficulty: f.team_a_difficulty,
            minutes: f.minutes,
            started: f.started,
            finished: f.finished,
            kickoff_time: f.kickoff_time,
            team_h_score: f.team_h_score,
            team_a_score: f.team_a_score,
            score,
        }
    }
}

/// Shape the fixtures array. Anything other than an array yields no
/// fixtures; individual entries that do not look like fixtures are skipped.
pub fn fixtures(value: Value) -> Vec<Fixture> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawFixture>(item) {
            Ok(raw) => Some(raw.into()),
            Err(e) => {
                log::warn!("Skipping malformed fixture: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_only_when_both_sides_known() {
        let shaped = fixtures(json!([
            {"id": 1, "event": 1, "team_h": 1, "team_a": 2, "team_h_score": 2, "team_a_score": 0,
             "finished": true, "started": true, "minutes": 90, "kickoff_time": "2025-08-15T19:00:00Z"},
            {"id": 2, "event": 1, "team_h": 3, "team_a": 4, "team_h_score": null, "team_a_score": null,
             "finished": false, "started": false, "minutes": 0}
        ]));

        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].score.as_deref(), Some("2-0"));
        assert_eq!(shaped[1].score, None);
        assert_eq!(shaped[1].kickoff_time, None);
    }

    #[test]
    fn test_non_array_payload() {
        assert!(fixtures(json!({"detail": "Not found."})).is_empty());
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let shaped = fixtures(json!([{"id": "x"}, {"id": 5}]));
        assert_eq!(shaped.len(), 1);
        assert_eq!(shaped[0].id, Some(5));
    }
}
