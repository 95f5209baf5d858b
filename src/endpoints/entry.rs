//! `entry/{id}/…`: a manager's team, history, transfers and picks

use super::tenths;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct RawLeague {
    id: Option<i64>,
    name: Option<String>,
    entry_rank: Option<i64>,
    entry_last_rank: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLeagues {
    #[serde(default)]
    classic: Vec<RawLeague>,
    #[serde(default)]
    h2h: Vec<RawLeague>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDetails {
    id: Option<i64>,
    name: Option<String>,
    player_first_name: Option<String>,
    player_last_name: Option<String>,
    player_region_name: Option<String>,
    summary_overall_points: Option<i64>,
    summary_overall_rank: Option<i64>,
    summary_event_points: Option<i64>,
    summary_event_rank: Option<i64>,
    current_event: Option<i64>,
    #[serde(default)]
    leagues: RawLeagues,
    years_active: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueRank {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub entry_rank: Option<i64>,
    pub entry_last_rank: Option<i64>,
}

impl From<RawLeague> for LeagueRank {
    fn from(l: RawLeague) -> Self {
        LeagueRank {
            id: l.id,
            name: l.name,
            entry_rank: l.entry_rank,
            entry_last_rank: l.entry_last_rank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryLeagues {
    pub classic: Vec<LeagueRank>,
    pub h2h: Vec<LeagueRank>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDetails {
    pub id: Option<i64>,
    pub team_name: Option<String>,
    pub manager_first_name: Option<String>,
    pub manager_last_name: Option<String>,
    pub player_region_name: Option<String>,
    pub overall_points: Option<i64>,
    pub overall_rank: Option<i64>,
    pub event_points: Option<i64>,
    pub event_rank: Option<i64>,
    pub current_gameweek: Option<i64>,
    pub leagues: EntryLeagues,
    pub years_active: Option<i64>,
}

/// Shape `entry/{id}/`
pub fn details(value: Value) -> Result<EntryDetails> {
    let raw: RawDetails = serde_json::from_value(value)?;
    Ok(EntryDetails {
        id: raw.id,
        team_name: raw.name,
        manager_first_name: raw.player_first_name,
        manager_last_name: raw.player_last_name,
        player_region_name: raw.player_region_name,
        overall_points: raw.summary_overall_points,
        overall_rank: raw.summary_overall_rank,
        event_points: raw.summary_event_points,
        event_rank: raw.summary_event_rank,
        current_gameweek: raw.current_event,
        leagues: EntryLeagues {
            classic: raw.leagues.classic.into_iter().map(Into::into).collect(),
            h2h: raw.leagues.h2h.into_iter().map(Into::into).collect(),
        },
        years_active: raw.years_active,
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawGameweekHistory {
    event: Option<i64>,
    points: Option<i64>,
    total_points: Option<i64>,
    overall_rank: Option<i64>,
    rank: Option<i64>,
    event_transfers: Option<i64>,
    event_transfers_cost: Option<i64>,
    points_on_bench: Option<i64>,
    value: Option<i64>,
    bank: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPastSeason {
    season_name: Option<String>,
    total_points: Option<i64>,
    rank: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawChip {
    name: Option<String>,
    event: Option<i64>,
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHistory {
    #[serde(default)]
    current: Vec<RawGameweekHistory>,
    #[serde(default)]
    past: Vec<RawPastSeason>,
    #[serde(default)]
    chips: Vec<RawChip>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekHistory {
    pub gameweek: Option<i64>,
    pub points: Option<i64>,
    pub total_points: Option<i64>,
    pub overall_rank: Option<i64>,
    pub gameweek_rank: Option<i64>,
    pub transfers_made: Option<i64>,
    pub transfers_cost: Option<i64>,
    pub points_on_bench: Option<i64>,
    pub team_value: Option<f64>,
    pub bank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PastSeason {
    pub season_name: Option<String>,
    pub total_points: Option<i64>,
    pub overall_rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipPlayed {
    pub name: Option<String>,
    pub gameweek: Option<i64>,
    pub time_played: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryHistory {
    pub current_season_history: Vec<GameweekHistory>,
    pub past_seasons_history: Vec<PastSeason>,
    pub chips_played: Vec<ChipPlayed>,
}

/// Shape `entry/{id}/history/`
pub fn history(value: Value) -> Result<EntryHistory> {
    let raw: RawHistory = serde_json::from_value(value)?;
    Ok(EntryHistory {
        current_season_history: raw
            .current
            .into_iter()
            .map(|gw| GameweekHistory {
                gameweek: gw.event,
                points: gw.points,
                total_points: gw.total_points,
                overall_rank: gw.overall_rank,
                gameweek_rank: gw.rank,
                transfers_made: gw.event_transfers,
                transfers_cost: gw.event_transfers_cost,
                points_on_bench: gw.points_on_bench,
                team_value: tenths(gw.value),
                bank: tenths(gw.bank),
            })
            .collect(),
        past_seasons_history: raw
            .past
            .into_iter()
            .map(|s| PastSeason {
                season_name: s.season_name,
                total_points: s.total_points,
                overall_rank: s.rank,
            })
            .collect(),
        chips_played: raw
            .chips
            .into_iter()
            .map(|c| ChipPlayed {
                name: c.name,
                gameweek: c.event,
                time_played: c.time,
            })
            .collect(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawTransfer {
    event: Option<i64>,
    time: Option<String>,
    element_in: Option<i64>,
    element_in_cost: Option<i64>,
    element_out: Option<i64>,
    element_out_cost: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub gameweek: Option<i64>,
    pub time: Option<String>,
    pub element_in_id: Option<i64>,
    pub element_in_cost: Option<f64>,
    pub element_out_id: Option<i64>,
    pub element_out_cost: Option<f64>,
}

/// Shape `entry/{id}/transfers/`, a top-level array
pub fn transfers(value: Value) -> Result<Vec<Transfer>> {
    let raw: Vec<RawTransfer> = serde_json::from_value(value)?;
    Ok(raw
        .into_iter()
        .map(|t| Transfer {
            gameweek: t.event,
            time: t.time,
            element_in_id: t.element_in,
            element_in_cost: tenths(t.element_in_cost),
            element_out_id: t.element_out,
            element_out_cost: tenths(t.element_out_cost),
        })
        .collect())
}

#[derive(Debug, Default, Deserialize)]
struct RawPick {
    element: Option<i64>,
    position: Option<i64>,
    multiplier: Option<i64>,
    is_captain: Option<bool>,
    is_vice_captain: Option<bool>,
    element_type: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAutoSub {
    element_in: Option<i64>,
    element_out: Option<i64>,
    event: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntryHistory {
    points: Option<i64>,
    total_points: Option<i64>,
    overall_rank: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPicks {
    active_chip: Option<String>,
    #[serde(default)]
    entry_history: RawEntryHistory,
    #[serde(default)]
    picks: Vec<RawPick>,
    #[serde(default)]
    automatic_subs: Vec<RawAutoSub>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub element_id: Option<i64>,
    pub position: Option<i64>,
    pub multiplier: Option<i64>,
    pub is_captain: Option<bool>,
    pub is_vice_captain: Option<bool>,
    pub element_type: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomaticSub {
    pub element_in_id: Option<i64>,
    pub element_out_id: Option<i64>,
    pub gameweek: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryHistorySummary {
    pub event_points: Option<i64>,
    pub total_points: Option<i64>,
    pub overall_rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekPicks {
    pub gameweek: u32,
    pub active_chip: Option<String>,
    pub entry_history_summary: EntryHistorySummary,
    pub picks: Vec<Pick>,
    pub automatic_substitutions: Vec<AutomaticSub>,
}

/// Shape `entry/{id}/event/{gw}/picks/`
pub fn picks(value: Value, gameweek: u32) -> Result<GameweekPicks> {
    let raw: RawPicks = serde_json::from_value(value)?;
    Ok(GameweekPicks {
        gameweek,
        active_chip: raw.active_chip,
        entry_history_summary: EntryHistorySummary {
            event_points: raw.entry_history.points,
            total_points: raw.entry_history.total_points,
            overall_rank: raw.entry_history.overall_rank,
        },
        picks: raw
            .picks
            .into_iter()
            .map(|p| Pick {
                element_id: p.element,
                position: p.position,
                multiplier: p.multiplier,
                is_captain: p.is_captain,
                is_vice_captain: p.is_vice_captain,
                element_type: p.element_type,
            })
            .collect(),
        automatic_substitutions: raw
            .automatic_subs
            .into_iter()
            .map(|s| AutomaticSub {
                element_in_id: s.element_in,
                element_out_id: s.element_out,
                gameweek: s.event,
            })
            .collect(),
    })
}
