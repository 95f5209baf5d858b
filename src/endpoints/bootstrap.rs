//! `bootstrap-static`: players, teams, gameweeks and positions

use super::{normalize_str, tenths};
use crate::{FplError, PlayerId, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawTeam {
    id: Option<i64>,
    name: Option<String>,
    short_name: Option<String>,
    strength: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawElement {
    id: Option<PlayerId>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    second_name: String,
    team: Option<i64>,
    element_type: Option<i64>,
    total_points: Option<i64>,
    event_points: Option<i64>,
    now_cost: Option<i64>,
    status: Option<String>,
    selected_by_percent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawTopElementInfo {
    points: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawEvent {
    id: Option<i64>,
    name: Option<String>,
    deadline_time: Option<String>,
    average_entry_score: Option<i64>,
    finished: Option<bool>,
    is_current: Option<bool>,
    is_next: Option<bool>,
    most_selected: Option<i64>,
    top_element: Option<i64>,
    top_element_info: Option<RawTopElementInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawElementType {
    id: Option<i64>,
    singular_name: Option<String>,
    singular_name_short: Option<String>,
    plural_name: Option<String>,
    plural_name_short: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawBootstrap {
    #[serde(default)]
    teams: Vec<RawTeam>,
    #[serde(default)]
    elements: Vec<RawElement>,
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    element_types: Vec<RawElementType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub strength: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gameweek {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub deadline_time: Option<String>,
    pub average_score: Option<i64>,
    pub finished: Option<bool>,
    pub is_current: Option<bool>,
    pub is_next: Option<bool>,
    pub most_selected_player_id: Option<i64>,
    pub top_element_id: Option<i64>,
    pub top_element_points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id: Option<PlayerId>,
    pub first_name: String,
    pub second_name: String,
    pub full_name: String,
    pub team_id: Option<i64>,
    pub team_name: String,
    pub total_points: Option<i64>,
    pub points_this_gameweek: Option<i64>,
    pub element_type: Option<i64>,
    pub position: String,
    pub now_cost: Option<f64>,
    pub status: Option<String>,
    pub selected_by_percent: Option<String>,
}

/// Player filters; every set field must match
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    /// Accent- and case-insensitive substring of the full name
    pub name: Option<String>,
    pub player_ids: Option<Vec<PlayerId>>,
    pub team_id: Option<i64>,
    /// Position name, e.g. `MID`, `Midfielder`, `mids`
    pub position: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Team filter resolved from `--team` / `--team-id`
#[derive(Debug, Clone, PartialEq)]
pub struct TeamFilter {
    pub team_id: Option<i64>,
    pub info: Option<String>,
}

/// Parsed bootstrap payload
#[derive(Debug, Clone)]
pub struct Bootstrap {
    raw: RawBootstrap,
    team_names: HashMap<i64, String>,
}

impl Bootstrap {
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawBootstrap = serde_json::from_value(value)?;
        let team_names = raw
            .teams
            .iter()
            .filter_map(|t| Some((t.id?, t.name.clone()?)))
            .collect();
        Ok(Bootstrap { raw, team_names })
    }

    pub fn teams(&self) -> Vec<TeamSummary> {
        self.raw
            .teams
            .iter()
            .map(|t| TeamSummary {
                id: t.id,
                name: t.name.clone(),
                short_name: t.short_name.clone(),
                strength: t.strength,
            })
            .collect()
    }

    pub fn gameweeks(&self) -> Vec<Gameweek> {
        self.raw
            .events
            .iter()
            .map(|e| Gameweek {
                id: e.id,
                name: e.name.clone(),
                deadline_time: e.deadline_time.clone(),
                average_score: e.average_entry_score,
                finished: e.finished,
                is_current: e.is_current,
                is_next: e.is_next,
                most_selected_player_id: e.most_selected,
                top_element_id: e.top_element,
                top_element_points: e.top_element_info.as_ref().and_then(|i| i.points),
            })
            .collect()
    }

    pub fn team_name(&self, team_id: i64) -> Option<&str> {
        self.team_names.get(&team_id).map(String::as_str)
    }

    /// Short position name (`GKP`, `DEF`, …) for an element type
    fn position_short(&self, element_type: Option<i64>) -> Option<&str> {
        let element_type = element_type?;
        self.raw
            .element_types
            .iter()
            .find(|et| et.id == Some(element_type))
            .and_then(|et| et.singular_name_short.as_deref())
    }

    /// Element type id for a user-supplied position name
    pub fn position_id(&self, position: &str) -> Option<i64> {
        let wanted = position.trim().to_lowercase();
        self.raw.element_types.iter().find_map(|et| {
            let names = [
                &et.singular_name,
                &et.singular_name_short,
                &et.plural_name,
                &et.plural_name_short,
            ];
            names
                .into_iter()
                .flatten()
                .any(|n| n.to_lowercase() == wanted)
                .then_some(et.id)
                .flatten()
        })
    }

    /// Players passing `filter`, in API order
    pub fn players(&self, filter: &PlayerFilter) -> Vec<PlayerSummary> {
        let name_query = filter.name.as_deref().map(normalize_str);
        let position_id = filter.position.as_deref().map(|p| self.position_id(p));

        self.raw
            .elements
            .iter()
            .filter_map(|p| {
                let full_name = format!("{} {}", p.first_name, p.second_name)
                    .trim()
                    .to_string();
                let cost = tenths(p.now_cost);

                if let Some(query) = &name_query {
                    if !normalize_str(&full_name).contains(query.as_str()) {
                        return None;
                    }
                }
                if let Some(ids) = &filter.player_ids {
                    if !p.id.is_some_and(|id| ids.contains(&id)) {
                        return None;
                    }
                }
                if filter.team_id.is_some() && filter.team_id != p.team {
                    return None;
                }
                if let Some(target) = position_id {
                    // An unknown position name matches nobody
                    if target.is_none() || target != p.element_type {
                        return None;
                    }
                }
                if let Some(min) = filter.min_price {
                    if !cost.is_some_and(|c| c >= min) {
                        return None;
                    }
                }
                if let Some(max) = filter.max_price {
                    if !cost.is_some_and(|c| c <= max) {
                        return None;
                    }
                }

                Some(PlayerSummary {
                    id: p.id,
                    first_name: p.first_name.clone(),
                    second_name: p.second_name.clone(),
                    full_name,
                    team_id: p.team,
                    team_name: p
                        .team
                        .and_then(|t| self.team_name(t))
                        .unwrap_or("Unknown Team")
                        .to_string(),
                    total_points: p.total_points,
                    points_this_gameweek: p.event_points,
                    element_type: p.element_type,
                    position: self
                        .position_short(p.element_type)
                        .unwrap_or("Unknown")
                        .to_string(),
                    now_cost: cost,
                    status: p.status.clone(),
                    selected_by_percent: p.selected_by_percent.clone(),
                })
            })
            .collect()
    }

    /// Resolve `--team NAME` against the team list, reconciling it with an
    /// explicit `--team-id`. The explicit id wins on conflict.
    pub fn resolve_team_filter(&self, team: Option<&str>, team_id: Option<i64>) -> Result<TeamFilter> {
        let Some(team) = team else {
            return Ok(TeamFilter {
                team_id,
                info: team_id.map(|id| format!("Filtering by team ID: {}", id)),
            });
        };

        let search = normalize_str(team);
        let found: Vec<&RawTeam> = self
            .raw
            .teams
            .iter()
            .filter(|t| {
                let matches = |s: &Option<String>| {
                    s.as_deref()
                        .is_some_and(|s| normalize_str(s).contains(&search))
                };
                matches(&t.name) || matches(&t.short_name)
            })
            .collect();

        match found.as_slice() {
            [single] => {
                let resolved = single.id;
                match team_id {
                    Some(id) if Some(id) != resolved => Ok(TeamFilter {
                        team_id: Some(id),
                        info: Some(format!(
                            "Warning: Both --team '{}' (ID {}) and --team-id '{}' were provided and conflict. Using --team-id: {}.",
                            team,
                            display_id(resolved),
                            id,
                            id
                        )),
                    }),
                    _ => {
                        let id = team_id.or(resolved);
                        Ok(TeamFilter {
                            team_id: id,
                            info: Some(format!(
                                "Filtering by team name: '{}' (Resolved to ID: {})",
                                team,
                                display_id(id)
                            )),
                        })
                    }
                }
            }
            [] => match team_id {
                Some(id) => Ok(TeamFilter {
                    team_id: Some(id),
                    info: None,
                }),
                None => Err(FplError::NotFound(format!(
                    "No team found matching '{}'. Please check the name.",
                    team
                ))),
            },
            many => {
                let names: Vec<String> = many
                    .iter()
                    .map(|t| format!("'{}'", t.name.as_deref().unwrap_or("None")))
                    .collect();
                Err(FplError::InvalidArgs(format!(
                    "Multiple teams found for '{}': [{}]. Please be more specific or use the team ID with --team-id.",
                    team,
                    names.join(", ")
                )))
            }
        }
    }
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "None".to_string(), |id| id.to_string())
}
