use serde::Serialize;

use super::moving_average::ema_series;

/// One MACD observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line, signal line and histogram for every input value
///
/// Returns `None` when there are fewer prices than the slow period; callers
/// treat that as "MACD unavailable" rather than a row of blanks.
pub fn macd_series(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Vec<MacdPoint>> {
    if prices.is_empty() || prices.len() < fast.max(slow).max(signal) {
        return None;
    }

    let fast_ema = ema_series(prices, fast);
    let slow_ema = ema_series(prices, slow);
    if fast_ema.is_empty() || slow_ema.is_empty() {
        return None;
    }

    let macd_line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_series(&macd_line, signal);
    if signal_line.is_empty() {
        return None;
    }

    Some(
        macd_line
            .iter()
            .zip(&signal_line)
            .map(|(&macd, &signal)| MacdPoint {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect(),
    )
}
