/// Exponential Moving Average over a whole series
///
/// Seeded from the first value, so every index has a value:
/// `ema[0] = v[0]`, `ema[t] = v[t] * k + ema[t-1] * (1 - k)` with `k = 2 / (period + 1)`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &value in &values[1..] {
        ema = value * k + ema * (1.0 - k);
        out.push(ema);
    }

    out
}

/// Trailing Simple Moving Average
///
/// `None` until `period` values are available, and for any window that
/// contains a missing value.
pub fn sma_series(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let sum = window.iter().copied().sum::<Option<f64>>()?;
            Some(sum / period as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let values: Vec<Option<f64>> = [100.0, 102.0, 104.0, 106.0, 108.0]
            .into_iter()
            .map(Some)
            .collect();
        let sma = sma_series(&values, 5);
        assert_eq!(sma[4], Some(104.0));
        assert!(sma[..4].iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_sma_missing_value_poisons_window() {
        let values = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let sma = sma_series(&values, 2);
        assert_eq!(sma, vec![None, None, None, Some(3.5), Some(4.5)]);
    }

    #[test]
    fn test_ema_seeded_from_first_value() {
        let ema = ema_series(&[10.0, 20.0], 3);
        // k = 0.5
        assert_eq!(ema, vec![10.0, 15.0]);
    }

    #[test]
    fn test_ema_follows_recurrence() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = ema_series(&prices, 5);
        let k = 2.0 / 6.0;

        assert_eq!(ema.len(), prices.len());
        for t in 1..prices.len() {
            assert_eq!(ema[t], prices[t] * k + ema[t - 1] * (1.0 - k));
        }
        assert!(ema[5] < 110.0); // lags a rising series
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema_series(&[], 20).is_empty());
        assert!(ema_series(&[1.0], 0).is_empty());
    }
}
