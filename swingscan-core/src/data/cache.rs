//! In-process memo cache for fetched price series.
//!
//! Keyed by `(ticker, start, end)` so repeated analyses within one process
//! (rank all universes, then view one) don't re-spend the rate budget.
//! Entries are whole `Arc<[Candle]>` values swapped in under the map lock,
//! so a reader either misses or sees a complete series — never a partial
//! write. Overwrites are idempotent. Nothing is persisted across runs.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::domain::Candle;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    ticker: String,
    start: NaiveDate,
    end: NaiveDate,
}

struct Entry {
    series: Arc<[Candle]>,
    inserted_at: Instant,
}

/// Concurrent memo cache for `(ticker, start, end)` fetch results.
pub struct HistoryCache {
    entries: Mutex<HashMap<FetchKey, Entry>>,
    ttl: Option<Duration>,
}

impl HistoryCache {
    /// Cache whose entries live for the whole process.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Cache whose entries expire `ttl` after insertion (checked on read).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Look up a series; expired entries are evicted and miss.
    pub fn get(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Option<Arc<[Candle]>> {
        let key = FetchKey {
            ticker: ticker.to_string(),
            start,
            end,
        };
        let mut entries = self.entries.lock().unwrap();
        if let Some(ttl) = self.ttl {
            if let Some(entry) = entries.get(&key) {
                if entry.inserted_at.elapsed() >= ttl {
                    entries.remove(&key);
                    return None;
                }
            }
        }
        entries.get(&key).map(|e| Arc::clone(&e.series))
    }

    /// Insert or overwrite a series. Empty series are cached too — an
    /// invalid symbol stays invalid for the life of the process.
    pub fn put(&self, ticker: &str, start: NaiveDate, end: NaiveDate, series: Vec<Candle>) {
        let key = FetchKey {
            ticker: ticker.to_string(),
            start,
            end,
        };
        let entry = Entry {
            series: series.into(),
            inserted_at: Instant::now(),
        };
        self.entries.lock().unwrap().insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series() -> Vec<Candle> {
        vec![Candle {
            date: d(2),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            volume: 1_000,
        }]
    }

    #[test]
    fn put_then_get() {
        let cache = HistoryCache::new();
        cache.put("SBIN", d(1), d(31), series());
        let hit = cache.get("SBIN", d(1), d(31)).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].close, 100.5);
    }

    #[test]
    fn distinct_ranges_are_distinct_keys() {
        let cache = HistoryCache::new();
        cache.put("SBIN", d(1), d(31), series());
        assert!(cache.get("SBIN", d(1), d(30)).is_none());
        assert!(cache.get("INFY", d(1), d(31)).is_none());
    }

    #[test]
    fn overwrite_is_idempotent() {
        let cache = HistoryCache::new();
        cache.put("SBIN", d(1), d(31), series());
        cache.put("SBIN", d(1), d(31), series());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_series_is_a_hit() {
        let cache = HistoryCache::new();
        cache.put("BOGUS", d(1), d(31), Vec::new());
        let hit = cache.get("BOGUS", d(1), d(31)).unwrap();
        assert!(hit.is_empty());
    }

    #[test]
    fn ttl_expires_entries() {
        let cache = HistoryCache::with_ttl(Duration::from_millis(10));
        cache.put("SBIN", d(1), d(31), series());
        assert!(cache.get("SBIN", d(1), d(31)).is_some());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cache.get("SBIN", d(1), d(31)).is_none());
    }
}
