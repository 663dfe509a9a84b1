//! Scoring and aggregation: per-symbol momentum, per-universe analysis,
//! cross-universe ranking.

pub mod aggregate;
pub mod analyzer;
pub mod scorer;

pub use aggregate::{rank_universes, top_across, top_in_universe, UniverseRank};
pub use analyzer::UniverseAnalyzer;
pub use scorer::{score, MissingReturnPolicy, ScoreConfig};
