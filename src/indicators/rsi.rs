/// Relative Strength Index with Wilder's smoothing, one value per input
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// The first `period` entries are `None`. The value at index `period` uses
/// the plain average of the first `period` changes; later values smooth as
/// `avg = (prev_avg * (period - 1) + current) / period`. While both averages
/// are zero (no price change yet) the value is also `None`.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_from_averages(avg_gain, avg_loss);

    let smoothing = (period - 1) as f64;
    for i in period + 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        avg_gain = (avg_gain * smoothing + gain) / period as f64;
        avg_loss = (avg_loss * smoothing + loss) / period as f64;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_gain + avg_loss == 0.0 {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_calculation() {
        // Test with known values
        let prices = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5, 46.0, 46.5, 46.25,
            46.0, 46.5,
        ];

        let rsi = rsi_series(&prices, 14);
        assert!(rsi[..14].iter().all(|v| v.is_none()));

        let rsi_value = rsi[14].unwrap();
        assert!(rsi_value > 0.0 && rsi_value < 100.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let prices: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let rsi = rsi_series(&prices, 14);
        assert_eq!(rsi.len(), 14);
        assert!(rsi.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_all_gains() {
        let prices = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let rsi = rsi_series(&prices, 5);
        assert_eq!(rsi[5], Some(100.0)); // All gains = RSI 100
    }

    #[test]
    fn test_rsi_all_losses() {
        let prices = vec![105.0, 104.0, 103.0, 102.0, 101.0, 100.0, 99.0];
        let rsi = rsi_series(&prices, 5);
        assert_eq!(rsi[5], Some(0.0));
        assert_eq!(rsi[6], Some(0.0));
    }

    #[test]
    fn test_rsi_flat_is_undefined() {
        let prices = vec![100.0; 20];
        let rsi = rsi_series(&prices, 14);
        assert!(rsi.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_defined_after_first_move() {
        let mut prices = vec![100.0; 20];
        prices[17] = 101.0;
        let rsi = rsi_series(&prices, 14);

        assert!(rsi[..17].iter().all(|v| v.is_none()));
        assert_eq!(rsi[17], Some(100.0));
        // Gain and loss both decay but stay non-zero
        let last = rsi[19].unwrap();
        assert!(last > 0.0 && last < 100.0);
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        // period 2: changes +2, -1 -> avg_gain 1.0, avg_loss 0.5
        // next change +1 -> avg_gain (1*1+1)/2 = 1.0, avg_loss (0.5*1+0)/2 = 0.25
        let prices = vec![10.0, 12.0, 11.0, 12.0];
        let rsi = rsi_series(&prices, 2);

        let first = 100.0 - 100.0 / (1.0 + 1.0 / 0.5);
        let second = 100.0 - 100.0 / (1.0 + 1.0 / 0.25);
        assert_eq!(rsi[2], Some(first));
        assert_eq!(rsi[3], Some(second));
    }
}
