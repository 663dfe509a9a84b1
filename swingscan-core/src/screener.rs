//! Caller-facing facade over the analyzer and aggregation views.
//!
//! One `Screener` per process is the intended shape: it owns the analyzer
//! (and through it the worker pool, fetcher, and shared rate limiter), and
//! the presentation layer calls these four entry points. Multi-universe
//! views analyze each universe once per call; the fetcher's memo cache
//! makes repeated views cheap within a process.

use crate::analysis::{
    aggregate, UniverseAnalyzer, UniverseRank,
};
use crate::data::UniverseSet;
use crate::domain::{MomentumRecord, UniverseResult};

pub struct Screener {
    analyzer: UniverseAnalyzer,
}

impl Screener {
    pub fn new(analyzer: UniverseAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &UniverseAnalyzer {
        &self.analyzer
    }

    /// Fetch and score every symbol of one universe.
    pub fn analyze_universe(&self, name: &str, symbols: &[String]) -> UniverseResult {
        self.analyzer.analyze(name, symbols)
    }

    /// Analyze every universe in the set, in stable name order.
    pub fn analyze_all(&self, set: &UniverseSet) -> Vec<UniverseResult> {
        set.universes
            .iter()
            .map(|(name, symbols)| self.analyzer.analyze(name, symbols))
            .collect()
    }

    /// Leaderboard of universes by average momentum score.
    pub fn rank_universes(&self, set: &UniverseSet) -> Vec<UniverseRank> {
        aggregate::rank_universes(&self.analyze_all(set))
    }

    /// Best `n` symbols across every universe, deduplicated by ticker.
    pub fn top_symbols_across(&self, set: &UniverseSet, n: usize) -> Vec<MomentumRecord> {
        aggregate::top_across(&self.analyze_all(set), n)
    }

    /// Best `k` symbols within one universe.
    pub fn top_symbols_in(&self, name: &str, symbols: &[String], k: usize) -> Vec<MomentumRecord> {
        aggregate::top_in_universe(&self.analyzer.analyze(name, symbols), k)
    }
}
