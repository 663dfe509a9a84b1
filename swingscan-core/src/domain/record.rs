//! Per-symbol and per-universe analysis results.

use serde::{Deserialize, Serialize};

/// Risk-adjusted momentum summary for a single symbol.
///
/// `momentum_score` is `None` when volatility is undefined/non-positive or
/// when the configured scoring policy cannot be satisfied (insufficient
/// lookback history under strict mode). Undefined is a normal outcome, not
/// an error. Percent fields are returns × 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumRecord {
    pub ticker: String,
    pub data_points: usize,
    pub momentum_score: Option<f64>,
    pub return_3m_pct: Option<f64>,
    pub return_1m_pct: Option<f64>,
    pub return_1w_pct: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub last_close: f64,
}

/// Result of analyzing one universe.
///
/// `average_momentum_score` is the mean over records with a defined score,
/// `None` when no record has one. Records appear in symbol input order;
/// symbols with no data contribute no record at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseResult {
    pub universe: String,
    pub records: Vec<MomentumRecord>,
    pub average_momentum_score: Option<f64>,
}

impl UniverseResult {
    /// Build a result, computing the average over defined scores only.
    pub fn new(universe: impl Into<String>, records: Vec<MomentumRecord>) -> Self {
        let scores: Vec<f64> = records.iter().filter_map(|r| r.momentum_score).collect();
        let average_momentum_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
        Self {
            universe: universe.into(),
            records,
            average_momentum_score,
        }
    }

    /// Number of records with a defined momentum score.
    pub fn scored_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.momentum_score.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, score: Option<f64>) -> MomentumRecord {
        MomentumRecord {
            ticker: ticker.into(),
            data_points: 70,
            momentum_score: score,
            return_3m_pct: Some(5.0),
            return_1m_pct: Some(2.0),
            return_1w_pct: Some(1.0),
            annualized_volatility: Some(0.2),
            last_close: 100.0,
        }
    }

    #[test]
    fn average_over_defined_scores_only() {
        let result = UniverseResult::new(
            "Tech",
            vec![record("A", Some(2.0)), record("B", None), record("C", Some(1.0))],
        );
        assert_eq!(result.average_momentum_score, Some(1.5));
        assert_eq!(result.scored_count(), 2);
    }

    #[test]
    fn average_undefined_when_no_scores() {
        let result = UniverseResult::new("Tech", vec![record("A", None)]);
        assert_eq!(result.average_momentum_score, None);
    }

    #[test]
    fn average_undefined_when_empty() {
        let result = UniverseResult::new("Tech", vec![]);
        assert!(result.average_momentum_score.is_none());
        assert!(result.records.is_empty());
    }

    #[test]
    fn record_serialization_roundtrip() {
        let r = record("INFY", Some(1.25));
        let json = serde_json::to_string(&r).unwrap();
        let back: MomentumRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ticker, "INFY");
        assert_eq!(back.momentum_score, Some(1.25));
    }
}
