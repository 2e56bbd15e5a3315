// Candle intake: raw broker rows to a clean OHLCV series
pub mod normalizer;

pub use normalizer::{CandleNormalizer, RawCandleRow};
