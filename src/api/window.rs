use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

/// Format the historical candle endpoint expects for `fromdate` / `todate`
pub const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M";

const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

pub fn market_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default()
}

pub fn market_close() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default()
}

/// Current wall-clock time at the exchange
pub fn now_ist() -> NaiveDateTime {
    to_ist(Utc::now())
}

/// Exchange-local wall-clock time for an instant
pub fn to_ist(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::seconds(IST_OFFSET_SECS)
}

/// `[from, to]` range of exchange-local times to request candles for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandleWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl CandleWindow {
    /// Market open on `start` through market close on `end`
    ///
    /// When `end` is today the window stops at `now`, but never past close.
    pub fn for_dates(start: NaiveDate, end: NaiveDate, now: NaiveDateTime) -> Self {
        let from = start.and_time(market_open());
        let to = if end == now.date() {
            end.and_time(now.time().min(market_close()))
        } else {
            end.and_time(market_close())
        };

        Self { from, to }
    }

    /// Yesterday's open through today, as the settings panel defaults to
    pub fn default_for(now: NaiveDateTime) -> Self {
        let today = now.date();
        let yesterday = today.pred_opt().unwrap_or(today);
        Self::for_dates(yesterday, today, now)
    }

    pub fn from_param(&self) -> String {
        self.from.format(WINDOW_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(WINDOW_FORMAT).to_string()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.to - self.from).num_minutes().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_past_end_date_uses_close() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let window = CandleWindow::for_dates(start, end, at(2024, 1, 5, 11, 0));

        assert_eq!(window.from_param(), "2024-01-01 09:15");
        assert_eq!(window.to_param(), "2024-01-02 15:30");
    }

    #[test]
    fn test_today_capped_at_now() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let window = CandleWindow::for_dates(today, today, at(2024, 1, 2, 11, 42));

        assert_eq!(window.to_param(), "2024-01-02 11:42");
        assert_eq!(window.duration_minutes(), 147);
    }

    #[test]
    fn test_today_after_close_capped_at_close() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let window = CandleWindow::for_dates(today, today, at(2024, 1, 2, 20, 5));

        assert_eq!(window.to_param(), "2024-01-02 15:30");
    }

    #[test]
    fn test_to_ist() {
        let instant = DateTime::parse_from_rfc3339("2024-01-02T03:45:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(to_ist(instant), at(2024, 1, 2, 9, 15));
    }

    #[test]
    fn test_default_window() {
        let window = CandleWindow::default_for(at(2024, 3, 1, 10, 0));
        assert_eq!(window.from_param(), "2024-02-29 09:15");
        assert_eq!(window.to_param(), "2024-03-01 10:00");
    }
}
