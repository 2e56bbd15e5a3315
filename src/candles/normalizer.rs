use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::Candle;

/// One raw row from the candle source: `[timestamp, open, high, low, close, volume]`
pub type RawCandleRow = Vec<Value>;

const ROW_WIDTH: usize = 6;

/// Rows may omit the trailing volume field
const MIN_ROW_WIDTH: usize = ROW_WIDTH - 1;

/// Offset applied to timestamps that arrive without one (exchange local time)
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Converts raw candle rows into a clean, time-ordered OHLCV series
///
/// Two kinds of bad input are handled differently:
/// - a structurally malformed batch (wrong row width, unparseable timestamp)
///   yields an empty series
/// - a row whose open/high/low/close is not numeric is dropped on its own
///
/// A missing or non-numeric volume is kept as `None` and never drops the row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandleNormalizer;

impl CandleNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw rows; an empty result is the "no data" series
    pub fn normalize(&self, rows: &[RawCandleRow]) -> Vec<Candle> {
        if rows.is_empty() {
            return Vec::new();
        }

        let mut candles = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;

        for (index, row) in rows.iter().enumerate() {
            if !(MIN_ROW_WIDTH..=ROW_WIDTH).contains(&row.len()) {
                tracing::warn!(
                    "Malformed candle batch: row {} has {} fields (expected {})",
                    index,
                    row.len(),
                    ROW_WIDTH
                );
                return Vec::new();
            }

            let Some(timestamp) = parse_timestamp(&row[0]) else {
                tracing::warn!(
                    "Malformed candle batch: unparseable timestamp {} in row {}",
                    row[0],
                    index
                );
                return Vec::new();
            };

            let prices = (
                parse_number(&row[1]),
                parse_number(&row[2]),
                parse_number(&row[3]),
                parse_number(&row[4]),
            );

            match prices {
                (Some(open), Some(high), Some(low), Some(close)) => candles.push(Candle {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume: row.get(5).and_then(parse_volume),
                }),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!("Dropped {} candle rows with non-numeric prices", dropped);
        }

        // Stable: rows sharing a timestamp keep their arrival order
        candles.sort_by_key(|c| c.timestamp);

        let duplicates = candles
            .windows(2)
            .filter(|w| w[0].timestamp == w[1].timestamp)
            .count();
        if duplicates > 0 {
            tracing::debug!("{} duplicate candle timestamps kept as-is", duplicates);
        }

        candles
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let ist = FixedOffset::east_opt(IST_OFFSET_SECS)?;
    NAIVE_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(text, fmt).ok()?;
        ist.from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Numbers and numeric strings are accepted; NaN and infinities are not
fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

/// Volume as whole units
///
/// Fractional volumes are rounded to the nearest unit (0.4 becomes 0), which
/// can shift a spike comparison that sits right on the 1.5x threshold.
fn parse_volume(value: &Value) -> Option<u64> {
    if let Some(v) = value.as_u64() {
        return Some(v);
    }

    let v = parse_number(value)?;
    (v >= 0.0).then(|| v.round() as u64)
}
