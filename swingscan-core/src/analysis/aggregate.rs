//! Ranking and top-N views over computed universe results.
//!
//! Pure functions: they re-fetch nothing and mutate nothing. Undefined
//! scores always order after defined ones, and ties keep input order
//! (stable sorts throughout), so repeated calls over the same results
//! render identically.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::{MomentumRecord, UniverseResult};

/// One row of the universe leaderboard.
#[derive(Debug, Clone)]
pub struct UniverseRank {
    pub universe: String,
    pub average_score: Option<f64>,
    pub scored: usize,
}

/// Descending comparison with `None` after any defined value.
fn desc_defined_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank universes by average momentum score, best first, undefined last.
pub fn rank_universes(results: &[UniverseResult]) -> Vec<UniverseRank> {
    let mut ranks: Vec<UniverseRank> = results
        .iter()
        .map(|r| UniverseRank {
            universe: r.universe.clone(),
            average_score: r.average_momentum_score,
            scored: r.scored_count(),
        })
        .collect();
    ranks.sort_by(|a, b| desc_defined_first(a.average_score, b.average_score));
    ranks
}

/// Best `n` symbols across all universes.
///
/// Undefined scores are dropped, the union is sorted best-first, and a
/// ticker appearing in several universes keeps only its highest-scoring
/// occurrence.
pub fn top_across(results: &[UniverseResult], n: usize) -> Vec<MomentumRecord> {
    let mut records: Vec<MomentumRecord> = results
        .iter()
        .flat_map(|r| r.records.iter())
        .filter(|r| r.momentum_score.is_some())
        .cloned()
        .collect();
    records.sort_by(|a, b| desc_defined_first(a.momentum_score, b.momentum_score));

    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.ticker.clone()));
    records.truncate(n);
    records
}

/// Best `k` rows of one universe, undefined scores last.
pub fn top_in_universe(result: &UniverseResult, k: usize) -> Vec<MomentumRecord> {
    let mut records = result.records.clone();
    records.sort_by(|a, b| desc_defined_first(a.momentum_score, b.momentum_score));
    records.truncate(k);
    records
}
