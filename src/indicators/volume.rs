use super::moving_average::sma_series;

/// Trailing average volume
///
/// Short-series guard: with fewer than `period` candles no rolling average is
/// attempted and every entry is `None`.
pub fn average_volume_series(volumes: &[Option<u64>], period: usize) -> Vec<Option<f64>> {
    if volumes.len() < period {
        return vec![None; volumes.len()];
    }

    let as_f64: Vec<Option<f64>> = volumes.iter().map(|v| v.map(|v| v as f64)).collect();
    sma_series(&as_f64, period)
}

/// Flag candles whose volume exceeds `multiplier` times the trailing average
///
/// Undefined wherever the average is undefined, except under the short-series
/// guard where every candle is flagged `Some(false)`.
pub fn volume_spike_series(
    volumes: &[Option<u64>],
    averages: &[Option<f64>],
    period: usize,
    multiplier: f64,
) -> Vec<Option<bool>> {
    if volumes.len() < period {
        return vec![Some(false); volumes.len()];
    }

    volumes
        .iter()
        .zip(averages)
        .map(|(volume, avg)| {
            let avg = (*avg)?;
            let volume = (*volume)? as f64;
            Some(volume > avg * multiplier)
        })
        .collect()
}
