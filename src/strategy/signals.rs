use crate::indicators::{IndicatorRow, Series};
use crate::models::Signal;

use super::position::Position;

/// Thresholds for signal generation
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub trailing_percent: f64, // Stop and target band around the entry
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            trailing_percent: 1.0,
        }
    }
}

/// Whether the engine could make a real decision this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Evaluated on an eligible row
    Ready,
    /// Candles exist but no row has every decision-relevant indicator
    IndicatorsNotReady,
    /// Empty series
    NoData,
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub signal: Signal,
    pub position: Position,
    pub pnl: Option<f64>,
    pub readiness: Readiness,
    /// Row the decision was made on
    pub row: Option<IndicatorRow>,
}

impl Evaluation {
    fn not_ready(position: Position, readiness: Readiness) -> Self {
        Self {
            signal: Signal::Hold,
            position,
            pnl: None,
            readiness,
            row: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }
}

/// Turns an enriched series and the current position into a signal
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Evaluate the latest eligible row
    ///
    /// Entry rules run first, then the stop/target band around the entry that
    /// was open *before* this cycle overrides them. P&L uses the entry after
    /// this cycle, so a fresh entry reports zero.
    pub fn evaluate(&self, series: &Series, mut position: Position) -> Evaluation {
        if series.is_empty() {
            return Evaluation::not_ready(position, Readiness::NoData);
        }

        let Some(last) = series.last_eligible() else {
            tracing::debug!(
                "Indicators not ready: {} candles, none with every indicator defined",
                series.len()
            );
            return Evaluation::not_ready(position, Readiness::IndicatorsNotReady);
        };

        let prior_entry = position.open_entry();
        let mut signal = self.entry_signal(last);

        if matches!(signal, Signal::Buy | Signal::Sell) {
            position.set_entry(last.close);
            tracing::info!("{} @ {:.2} ({})", signal, last.close, last.timestamp);
        }

        if let Some(exit) = prior_entry.and_then(|entry| self.exit_signal(entry, last.close)) {
            tracing::info!(
                "{} overrides {}: close {:.2}, entry {:.2}",
                exit,
                signal,
                last.close,
                prior_entry.unwrap_or_default()
            );
            signal = exit;
        }

        let pnl = position.unrealized_pnl(last.close);

        Evaluation {
            signal,
            position,
            pnl,
            readiness: Readiness::Ready,
            row: Some(last.clone()),
        }
    }

    fn entry_signal(&self, row: &IndicatorRow) -> Signal {
        let (Some(ema_short), Some(ema_long), Some(rsi), Some(spike)) =
            (row.ema_short, row.ema_long, row.rsi, row.volume_spike)
        else {
            return Signal::Hold;
        };

        let buy = ema_short > ema_long && rsi < self.config.rsi_overbought && spike;
        let sell = ema_short < ema_long && rsi > self.config.rsi_oversold && spike;

        tracing::debug!(
            "BUY conditions: EMA↑={}, RSI<{}={}, Vol↑={} | SELL conditions: EMA↓={}, RSI>{}={}",
            ema_short > ema_long,
            self.config.rsi_overbought,
            rsi < self.config.rsi_overbought,
            spike,
            ema_short < ema_long,
            self.config.rsi_oversold,
            rsi > self.config.rsi_oversold
        );

        if buy {
            Signal::Buy
        } else if sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    /// Stop-loss / take-profit band check against an open entry
    fn exit_signal(&self, entry: f64, close: f64) -> Option<Signal> {
        let band = self.config.trailing_percent / 100.0;
        let stop = entry * (1.0 - band);
        let target = entry * (1.0 + band);

        if close <= stop {
            Some(Signal::SellStopLoss)
        } else if close >= target {
            Some(Signal::SellTakeProfit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorEngine;
    use crate::models::Candle;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(closes: &[f64], volumes: &[u64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 3, 45, 0).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Candle {
                timestamp: start + Duration::minutes(i as i64 * 5),
                open: close,
                high: close,
                low: close,
                close,
                volume: Some(volume),
            })
            .collect()
    }

    /// 25 candles: a gentle zig-zag uptrend (RSI well inside 30..70),
    /// last volume 3x the others
    fn uptrend_with_spike(spike: bool) -> Series {
        let closes: Vec<f64> = (0..25)
            .map(|i| 100.0 + i as f64 * 0.1 - if i % 2 == 0 { 0.0 } else { 0.4 })
            .collect();
        let mut volumes = vec![1000; 25];
        if spike {
            volumes[24] = 3000;
        }
        IndicatorEngine::default().enrich(&candles(&closes, &volumes))
    }

    /// 25 candles ending at `close`, one early tick so RSI is defined
    fn steady_series(close: f64) -> Series {
        let mut closes = vec![close; 25];
        closes[1] = close + 0.05;
        IndicatorEngine::default().enrich(&candles(&closes, &vec![1000; 25]))
    }

    fn open_position(entry: f64) -> Position {
        let mut position = Position::default();
        position.set_entry(entry);
        position
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let engine = SignalEngine::default();
        let eval = engine.evaluate(&Series::default(), Position::default());

        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.readiness, Readiness::NoData);
        assert_eq!(eval.pnl, None);
    }

    #[test]
    fn test_short_series_not_ready() {
        let series = IndicatorEngine::default().enrich(&candles(&[100.0; 10], &[1000; 10]));
        let position = open_position(100.0);
        let eval = SignalEngine::default().evaluate(&series, position);

        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.readiness, Readiness::IndicatorsNotReady);
        assert_eq!(eval.position, position);
        assert_eq!(eval.pnl, None);
    }

    #[test]
    fn test_flat_prices_not_ready() {
        let series = IndicatorEngine::default().enrich(&candles(&[99.0; 25], &[1000; 25]));
        let position = open_position(100.0);
        let eval = SignalEngine::default().evaluate(&series, position);

        assert!(series.rows().iter().all(|r| r.rsi.is_none()));
        assert_eq!(eval.readiness, Readiness::IndicatorsNotReady);
        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.position, position);
        assert_eq!(eval.pnl, None);
    }

    #[test]
    fn test_buy_on_uptrend_with_spike() {
        let series = uptrend_with_spike(true);
        let last = series.last_eligible().unwrap();
        assert!(last.ema_short.unwrap() > last.ema_long.unwrap());
        let rsi = last.rsi.unwrap();
        assert!(rsi > 30.0 && rsi < 70.0);

        let eval = SignalEngine::default().evaluate(&series, Position::default());
        assert_eq!(eval.signal, Signal::Buy);
        assert_eq!(eval.position.entry_price(), Some(last.close));
        assert_eq!(eval.pnl, Some(0.0));
        assert!(eval.is_ready());
    }

    #[test]
    fn test_no_spike_holds_and_keeps_entry() {
        let series = uptrend_with_spike(false);
        let position = Position::default();
        let eval = SignalEngine::default().evaluate(&series, position);

        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.position.entry_price(), None);
        assert_eq!(eval.pnl, None);
    }

    #[test]
    fn test_sell_on_downtrend_with_spike() {
        let closes: Vec<f64> = (0..25)
            .map(|i| 100.0 - i as f64 * 0.1 + if i % 2 == 0 { 0.0 } else { 0.4 })
            .collect();
        let mut volumes = vec![1000; 25];
        volumes[24] = 3000;
        let series = IndicatorEngine::default().enrich(&candles(&closes, &volumes));

        let eval = SignalEngine::default().evaluate(&series, Position::default());
        assert_eq!(eval.signal, Signal::Sell);
        assert_eq!(eval.position.entry_price(), Some(closes[24]));
    }

    #[test]
    fn test_pnl_estimate() {
        let eval = SignalEngine::default().evaluate(&steady_series(102.0), open_position(100.0));
        assert_eq!(eval.pnl, Some(50.0));
    }

    #[test]
    fn test_stop_loss_hit() {
        let eval = SignalEngine::default().evaluate(&steady_series(99.0), open_position(100.0));
        assert_eq!(eval.signal, Signal::SellStopLoss);
        assert_eq!(eval.position.entry_price(), Some(100.0));
        assert_eq!(eval.pnl, Some(-25.0));
    }

    #[test]
    fn test_take_profit_hit() {
        let eval = SignalEngine::default().evaluate(&steady_series(101.0), open_position(100.0));
        assert_eq!(eval.signal, Signal::SellTakeProfit);
    }

    #[test]
    fn test_inside_band_holds() {
        let eval = SignalEngine::default().evaluate(&steady_series(100.5), open_position(100.0));
        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.pnl, Some(12.5));
    }

    #[test]
    fn test_stop_loss_overrides_fresh_buy() {
        // Prior entry far above the uptrend's close
        let series = uptrend_with_spike(true);
        let close = series.last_eligible().unwrap().close;

        let eval = SignalEngine::default().evaluate(&series, open_position(close * 1.10));
        assert_eq!(eval.signal, Signal::SellStopLoss);
        // The BUY still moved the entry
        assert_eq!(eval.position.entry_price(), Some(close));
        assert_eq!(eval.pnl, Some(0.0));
    }

    #[test]
    fn test_exit_keeps_firing_until_closed() {
        let engine = SignalEngine::default();
        let series = steady_series(99.0);

        let first = engine.evaluate(&series, open_position(100.0));
        let second = engine.evaluate(&series, first.position);
        assert_eq!(second.signal, Signal::SellStopLoss);

        let mut position = second.position;
        position.close();
        let third = engine.evaluate(&series, position);
        assert_eq!(third.signal, Signal::Hold);
        assert_eq!(third.pnl, None);
    }

    #[test]
    fn test_custom_band() {
        let engine = SignalEngine::new(SignalConfig {
            trailing_percent: 2.0,
            ..SignalConfig::default()
        });
        let eval = engine.evaluate(&steady_series(99.0), open_position(100.0));
        assert_eq!(eval.signal, Signal::Hold);
    }
}
