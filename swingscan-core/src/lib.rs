//! Swingscan core — concurrent momentum screening over daily price history.
//!
//! The pipeline, outermost first:
//! - [`screener::Screener`] — the four caller-facing operations
//! - [`analysis::UniverseAnalyzer`] — bounded worker pool per universe
//! - [`data::ChunkFetcher`] — windowed, retrying history fetch per symbol
//! - [`data::RateLimiter`] — dual sliding-window budget shared by all workers
//! - [`analysis::scorer`] — returns, volatility, composite momentum score
//!
//! Per-symbol and per-window failures are absorbed inside the pipeline; the
//! only fatal input is a malformed universe definition.

pub mod analysis;
pub mod data;
pub mod domain;
pub mod screener;

pub use screener::Screener;
