//! Universe configuration — named ticker lists.
//!
//! Universes are stored as a TOML table of `name -> [tickers]`. A built-in
//! NSE sector set matches the screener's stock lists; callers can point at
//! their own file instead. A malformed definition is the one fatal input in
//! the pipeline — everything downstream absorbs failures per symbol.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("universe '{0}' has no tickers")]
    EmptyUniverse(String),

    #[error("universe '{universe}' lists ticker '{ticker}' more than once")]
    DuplicateTicker { universe: String, ticker: String },

    #[error("no universe named '{0}'")]
    UnknownUniverse(String),
}

/// The full set of named universes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseSet {
    pub universes: BTreeMap<String, Vec<String>>,
}

impl UniverseSet {
    /// Load and validate a universe set from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a universe set from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let set: Self = toml::from_str(content)?;
        set.validate()?;
        Ok(set)
    }

    /// Reject empty universes and in-universe duplicate tickers.
    pub fn validate(&self) -> Result<(), UniverseError> {
        for (name, tickers) in &self.universes {
            if tickers.is_empty() {
                return Err(UniverseError::EmptyUniverse(name.clone()));
            }
            let mut seen = BTreeSet::new();
            for ticker in tickers {
                if !seen.insert(ticker) {
                    return Err(UniverseError::DuplicateTicker {
                        universe: name.clone(),
                        ticker: ticker.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Tickers of one universe.
    pub fn tickers(&self, name: &str) -> Result<&[String], UniverseError> {
        self.universes
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| UniverseError::UnknownUniverse(name.to_string()))
    }

    /// Universe names in stable (sorted) order.
    pub fn names(&self) -> Vec<&str> {
        self.universes.keys().map(|s| s.as_str()).collect()
    }

    /// Total ticker count across universes (duplicates across universes
    /// count once per universe).
    pub fn ticker_count(&self) -> usize {
        self.universes.values().map(|v| v.len()).sum()
    }

    /// Built-in NSE sector universes.
    pub fn default_nse() -> Self {
        let mut universes = BTreeMap::new();

        universes.insert(
            "Banking".to_string(),
            to_strings(&[
                "HDFCBANK", "ICICIBANK", "SBIN", "KOTAKBANK", "AXISBANK", "INDUSINDBK",
                "BANKBARODA", "PNB", "FEDERALBNK", "IDFCFIRSTB",
            ]),
        );
        universes.insert(
            "IT".to_string(),
            to_strings(&[
                "TCS", "INFY", "HCLTECH", "WIPRO", "TECHM", "LTIM", "PERSISTENT", "COFORGE",
                "MPHASIS",
            ]),
        );
        universes.insert(
            "Pharma".to_string(),
            to_strings(&[
                "SUNPHARMA", "DRREDDY", "CIPLA", "DIVISLAB", "LUPIN", "AUROPHARMA", "BIOCON",
                "TORNTPHARM",
            ]),
        );
        universes.insert(
            "Auto".to_string(),
            to_strings(&[
                "MARUTI", "TATAMOTORS", "M&M", "BAJAJ-AUTO", "EICHERMOT", "HEROMOTOCO",
                "TVSMOTOR", "ASHOKLEY",
            ]),
        );
        universes.insert(
            "Energy".to_string(),
            to_strings(&[
                "RELIANCE", "ONGC", "NTPC", "POWERGRID", "TATAPOWER", "ADANIGREEN", "BPCL", "IOC",
            ]),
        );
        universes.insert(
            "FMCG".to_string(),
            to_strings(&[
                "HINDUNILVR", "ITC", "NESTLEIND", "BRITANNIA", "DABUR", "MARICO", "GODREJCP",
                "TATACONSUM",
            ]),
        );

        Self { universes }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn to_strings(tickers: &[&str]) -> Vec<String> {
    tickers.iter().map(|t| t.to_string()).collect()
}
