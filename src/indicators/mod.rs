// Technical indicators module
// Implements EMA, RSI, MACD and volume spike detection over whole series

pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod series;
pub mod volume;

pub use macd::{macd_series, MacdPoint};
pub use moving_average::{ema_series, sma_series};
pub use rsi::rsi_series;
pub use series::{IndicatorConfig, IndicatorEngine, IndicatorRow, Series};
pub use volume::{average_volume_series, volume_spike_series};
