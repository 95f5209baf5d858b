//! `event/{gw}/live/`: live points and stats for a gameweek

use crate::PlayerId;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveElement {
    pub id: Option<PlayerId>,
    pub stats: Value,
    pub explain: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveEvent {
    pub id: Option<i64>,
    pub stats: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveGameweek {
    pub gameweek: u32,
    pub elements: Vec<LiveElement>,
    pub events: Vec<LiveEvent>,
}

fn field_or(item: &Value, key: &str, default: Value) -> Value {
    item.get(key).cloned().unwrap_or(default)
}

fn array(data: &Map<String, Value>, key: &str) -> Vec<Value> {
    match data.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Shape the live payload, keeping only `player_ids` when given
pub fn live_gameweek(value: Value, gameweek: u32, player_ids: Option<&[PlayerId]>) -> LiveGameweek {
    let Value::Object(data) = value else {
        return LiveGameweek {
            gameweek,
            elements: Vec::new(),
            events: Vec::new(),
        };
    };

    let elements = array(&data, "elements")
        .iter()
        .filter_map(|e| {
            let id = e.get("id").and_then(Value::as_u64).map(PlayerId);
            if let Some(wanted) = player_ids {
                if !id.is_some_and(|id| wanted.contains(&id)) {
                    return None;
                }
            }
            Some(LiveElement {
                id,
                stats: field_or(e, "stats", Value::Object(Map::new())),
                explain: field_or(e, "explain", Value::Array(Vec::new())),
            })
        })
        .collect();

    let events = array(&data, "events")
        .iter()
        .map(|ev| LiveEvent {
            id: ev.get("id").and_then(Value::as_i64),
            stats: field_or(ev, "stats", Value::Object(Map::new())),
        })
        .collect();

    LiveGameweek {
        gameweek,
        elements,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "elements": [
                {"id": 10, "stats": {"minutes": 90, "total_points": 12}, "explain": [{"fixture": 1}]},
                {"id": 11, "stats": {"minutes": 0, "total_points": 0}},
                {"id": 12}
            ]
        })
    }

    #[test]
    fn test_filter_by_player_ids() {
        let shaped = live_gameweek(payload(), 5, Some(&[PlayerId(10), PlayerId(12)]));
        assert_eq!(shaped.gameweek, 5);
        let ids: Vec<_> = shaped.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(PlayerId(10)), Some(PlayerId(12))]);
        assert_eq!(shaped.elements[0].stats["total_points"], 12);
        assert_eq!(shaped.elements[1].stats, json!({}));
        assert_eq!(shaped.elements[1].explain, json!([]));
        assert!(shaped.events.is_empty());
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let shaped = live_gameweek(payload(), 5, None);
        assert_eq!(shaped.elements.len(), 3);
    }

    #[test]
    fn test_non_object_payload() {
        let shaped = live_gameweek(json!("oops"), 9, None);
        assert_eq!(shaped.gameweek, 9);
        assert!(shaped.elements.is_empty());
    }
}
