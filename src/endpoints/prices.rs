//! Price-change report built from a LiveFPL snapshot

use crate::{PlayerId, PriceRecord, PriceSnapshot};
use serde::Serialize;

/// Which records of a snapshot to report
#[derive(Debug, Clone, Default)]
pub struct PriceFilter {
    pub player_ids: Option<Vec<PlayerId>>,
    /// Keep a record whose metric is at least this
    pub gt: Option<f64>,
    /// Keep a record whose metric is at most this
    pub lt: Option<f64>,
    /// Apply thresholds to `pct_now`
    pub now: bool,
    /// Apply thresholds to `pct_tonight`
    pub tonight: bool,
}

impl PriceFilter {
    /// True when any threshold or metric flag was given
    pub fn has_threshold(&self) -> bool {
        self.now || self.tonight || self.gt.is_some() || self.lt.is_some()
    }

    /// Nothing to filter on at all
    pub fn is_empty(&self) -> bool {
        self.player_ids.as_ref().map_or(true, Vec::is_empty) && !self.has_threshold()
    }

    fn keeps(&self, record: &PriceRecord) -> bool {
        // Without a metric flag, thresholds apply to both metrics
        let (now, tonight) = if self.now || self.tonight {
            (self.now, self.tonight)
        } else {
            (true, true)
        };

        let above = self
            .gt
            .is_some_and(|gt| record.any_metric(now, tonight, |v| v >= gt));
        let below = self
            .lt
            .is_some_and(|lt| record.any_metric(now, tonight, |v| v <= lt));
        above || below
    }

    /// Apply the id filter, then the thresholds
    pub fn apply(&self, players: Vec<PriceRecord>) -> Vec<PriceRecord> {
        players
            .into_iter()
            .filter(|p| match &self.player_ids {
                Some(ids) if !ids.is_empty() => ids.contains(&p.id),
                _ => true,
            })
            .filter(|p| !self.has_threshold() || self.keeps(p))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub players: Vec<PriceRecord>,
    pub fetched_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_message: Option<String>,
    /// Matching players before the cap was applied
    pub player_count: usize,
}

/// Filter `snapshot` and cap the result at `max_players`
pub fn report(snapshot: PriceSnapshot, filter: &PriceFilter, max_players: usize) -> PriceReport {
    let mut players = filter.apply(snapshot.players);
    let player_count = players.len();

    let (limit_hit, limit_message) = if player_count > max_players {
        players.truncate(max_players);
        (
            Some(true),
            Some(format!(
                "Returned {} players which exceeds the limit of {}. Please narrow the results using \
                 --player-ids or the --filter-* options to reduce the number of players returned.",
                player_count, max_players
            )),
        )
    } else {
        (None, None)
    };

    PriceReport {
        players,
        fetched_at: snapshot.fetched_at,
        limit_hit,
        limit_message,
        player_count,
    }
}
