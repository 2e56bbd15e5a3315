use chrono::{DateTime, Utc};
use serde::Serialize;

use super::macd::{macd_series, MacdPoint};
use super::moving_average::ema_series;
use super::rsi::rsi_series;
use super::volume::{average_volume_series, volume_spike_series};
use crate::models::Candle;

/// Indicator periods and the volume spike multiplier
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ema_short_period: usize,
    pub ema_long_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_period: usize,
    pub volume_spike_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_short_period: 20,
            ema_long_period: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_period: 20,
            volume_spike_multiplier: 1.5,
        }
    }
}

/// A candle plus every indicator computed for it
///
/// `None` means the indicator is not defined for this row (not enough history).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdPoint>,
    pub avg_volume: Option<f64>,
    pub volume_spike: Option<bool>,
}

impl IndicatorRow {
    /// All decision-relevant columns are defined
    pub fn is_eligible(&self) -> bool {
        self.ema_short.is_some()
            && self.ema_long.is_some()
            && self.rsi.is_some()
            && self.close.is_finite()
            && self.volume_spike.is_some()
    }
}

/// Time-ordered candles with indicator columns attached
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    rows: Vec<IndicatorRow>,
    has_macd: bool,
}

impl Series {
    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// False when the series was too short for MACD; the column is absent
    pub fn has_macd(&self) -> bool {
        self.has_macd
    }

    pub fn eligible_rows(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.rows.iter().filter(|r| r.is_eligible())
    }

    /// Most recent row on which a decision can be made
    pub fn last_eligible(&self) -> Option<&IndicatorRow> {
        self.rows.iter().rev().find(|r| r.is_eligible())
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// The `n` most recent rows, oldest first
    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}

/// Computes the indicator columns over a normalized candle series
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    /// Attach indicators to a candle series; the input is not modified
    pub fn enrich(&self, candles: &[Candle]) -> Series {
        let cfg = &self.config;
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<Option<u64>> = candles.iter().map(|c| c.volume).collect();

        let ema_short = ema_series(&closes, cfg.ema_short_period);
        let ema_long = ema_series(&closes, cfg.ema_long_period);
        let rsi = rsi_series(&closes, cfg.rsi_period);
        let macd = macd_series(&closes, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        let avg_volume = average_volume_series(&volumes, cfg.volume_period);
        let volume_spike = volume_spike_series(
            &volumes,
            &avg_volume,
            cfg.volume_period,
            cfg.volume_spike_multiplier,
        );

        let rows = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| IndicatorRow {
                timestamp: candle.timestamp,
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
                ema_short: ema_short.get(i).copied(),
                ema_long: ema_long.get(i).copied(),
                rsi: rsi[i],
                macd: macd.as_ref().map(|m| m[i]),
                avg_volume: avg_volume[i],
                volume_spike: volume_spike[i],
            })
            .collect();

        let series = Series {
            rows,
            has_macd: macd.is_some(),
        };

        if let Some(last) = series.last() {
            tracing::debug!(
                "Indicators: rows={}, EMA{}={:?}, EMA{}={:?}, RSI={:?}, AvgVol={:?}, Spike={:?}, MACD={}",
                series.len(),
                cfg.ema_short_period,
                last.ema_short,
                cfg.ema_long_period,
                last.ema_long,
                last.rsi,
                last.avg_volume,
                last.volume_spike,
                series.has_macd
            );
        }

        series
    }
}
