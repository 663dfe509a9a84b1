//! Domain types: candles, price series, momentum records, universe results.

pub mod candle;
pub mod record;

pub use candle::{canonicalize, Candle};
pub use record::{MomentumRecord, UniverseResult};
