//! Universe analysis — fan symbols out over a bounded worker pool.
//!
//! Each analyzer owns a fixed-size rayon pool; every worker fetches through
//! the same `ChunkFetcher` and therefore the same process-wide rate limiter,
//! so the outbound call rate is bounded no matter how wide the pool is or
//! how many universes are analyzed at once. Results come back in symbol
//! input order, which keeps output stable across runs regardless of which
//! worker finishes first.

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

use super::scorer::{score, ScoreConfig};
use crate::data::ChunkFetcher;
use crate::domain::{MomentumRecord, UniverseResult};

/// Default worker pool width per universe analysis.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default calendar-day span fetched per symbol (~400 days covers the
/// 63-trading-bar lookback with room for holidays and listing gaps).
pub const DEFAULT_LOOKBACK_DAYS: i64 = 400;

/// Runs the fetch-and-score pipeline over whole universes.
pub struct UniverseAnalyzer {
    fetcher: Arc<ChunkFetcher>,
    score_config: ScoreConfig,
    lookback_days: i64,
    pool: rayon::ThreadPool,
}

impl UniverseAnalyzer {
    pub fn new(fetcher: Arc<ChunkFetcher>, score_config: ScoreConfig) -> Self {
        Self::with_concurrency(fetcher, score_config, DEFAULT_CONCURRENCY)
    }

    pub fn with_concurrency(
        fetcher: Arc<ChunkFetcher>,
        score_config: ScoreConfig,
        concurrency: usize,
    ) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .build()
            .expect("failed to build worker pool");

        Self {
            fetcher,
            score_config,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            pool,
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn score_config(&self) -> &ScoreConfig {
        &self.score_config
    }

    /// Analyze a universe over the default trailing window ending today.
    pub fn analyze(&self, name: &str, symbols: &[String]) -> UniverseResult {
        let end = Local::now().date_naive();
        let start = end - ChronoDuration::days(self.lookback_days);
        self.analyze_range(name, symbols, start, end)
    }

    /// Analyze a universe over an explicit date range.
    ///
    /// Symbols that fetch no data or have too little history contribute no
    /// record; that is normal attrition, not an error. The average covers
    /// defined scores only and is `None` when there are none.
    pub fn analyze_range(
        &self,
        name: &str,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> UniverseResult {
        info!(universe = name, symbols = symbols.len(), "analyzing universe");

        let records: Vec<MomentumRecord> = self.pool.install(|| {
            symbols
                .par_iter()
                .filter_map(|symbol| {
                    let series = self.fetcher.fetch(symbol, start, end);
                    let record = score(symbol, &series, &self.score_config);
                    if record.is_none() {
                        debug!(
                            symbol,
                            points = series.len(),
                            "insufficient history, excluding from universe"
                        );
                    }
                    record
                })
                .collect()
        });

        let result = UniverseResult::new(name, records);
        info!(
            universe = name,
            rows = result.records.len(),
            scored = result.scored_count(),
            average = ?result.average_momentum_score,
            "universe analysis complete"
        );
        result
    }
}
