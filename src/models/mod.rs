use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One OHLCV observation for a fixed time bucket
///
/// Volume is optional: brokers occasionally send a non-numeric volume and the
/// candle is still usable for price-based indicators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Trading signal emitted by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Hold,
    Buy,
    Sell,
    SellStopLoss,
    SellTakeProfit,
}

impl Signal {
    /// Anything other than HOLD is worth telling someone about
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::Hold => "HOLD",
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::SellStopLoss => "SELL (Stop Loss Hit)",
            Signal::SellTakeProfit => "SELL (Take Profit Hit)",
        };
        f.write_str(label)
    }
}

/// Index tracked by the app
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPERCASE")]
pub enum MarketIndex {
    Nifty,
    BankNifty,
}

impl MarketIndex {
    /// Broker symbol token for the index
    pub fn symbol_token(&self) -> &'static str {
        match self {
            MarketIndex::Nifty => "99926000",     // NIFTY 50
            MarketIndex::BankNifty => "99926009", // NIFTY BANK
        }
    }

    pub fn exchange(&self) -> &'static str {
        "NSE"
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MarketIndex::Nifty => "NIFTY",
            MarketIndex::BankNifty => "BANKNIFTY",
        }
    }
}

impl fmt::Display for MarketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Candle interval accepted by the historical candle endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interval {
    OneMinute,
    #[default]
    FiveMinute,
    FifteenMinute,
    ThirtyMinute,
    OneHour,
    OneDay,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::OneMinute,
        Interval::FiveMinute,
        Interval::FifteenMinute,
        Interval::ThirtyMinute,
        Interval::OneHour,
        Interval::OneDay,
    ];

    /// Wire name used in the candle request payload
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "ONE_MINUTE",
            Interval::FiveMinute => "FIVE_MINUTE",
            Interval::FifteenMinute => "FIFTEEN_MINUTE",
            Interval::ThirtyMinute => "THIRTY_MINUTE",
            Interval::OneHour => "ONE_HOUR",
            Interval::OneDay => "ONE_DAY",
        }
    }

    /// Human label shown in the settings panel
    pub fn label(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1 Minute",
            Interval::FiveMinute => "5 Minute",
            Interval::FifteenMinute => "15 Minute",
            Interval::ThirtyMinute => "30 Minute",
            Interval::OneHour => "1 Hour",
            Interval::OneDay => "1 Day",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Interval::OneMinute => 1,
            Interval::FiveMinute => 5,
            Interval::FifteenMinute => 15,
            Interval::ThirtyMinute => 30,
            Interval::OneHour => 60,
            Interval::OneDay => 24 * 60,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    /// Accepts either the wire name ("FIVE_MINUTE") or the label ("5 Minute")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_api_str().eq_ignore_ascii_case(s) || i.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown interval: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_labels() {
        assert_eq!(Signal::Hold.to_string(), "HOLD");
        assert_eq!(Signal::SellStopLoss.to_string(), "SELL (Stop Loss Hit)");
        assert_eq!(Signal::SellTakeProfit.to_string(), "SELL (Take Profit Hit)");
        assert!(!Signal::Hold.is_actionable());
        assert!(Signal::Sell.is_actionable());
    }

    #[test]
    fn test_signal_serializes_screaming_snake() {
        let json = serde_json::to_string(&Signal::SellTakeProfit).unwrap();
        assert_eq!(json, "\"SELL_TAKE_PROFIT\"");
    }

    #[test]
    fn test_index_tokens() {
        assert_eq!(MarketIndex::Nifty.symbol_token(), "99926000");
        assert_eq!(MarketIndex::BankNifty.symbol_token(), "99926009");
        assert_eq!(MarketIndex::BankNifty.to_string(), "BANKNIFTY");
    }

    #[test]
    fn test_interval_parsing() {
        assert_eq!("5 Minute".parse::<Interval>().unwrap(), Interval::FiveMinute);
        assert_eq!("one_hour".parse::<Interval>().unwrap(), Interval::OneHour);
        assert!("2 Minute".parse::<Interval>().is_err());
        assert_eq!(Interval::default().as_api_str(), "FIVE_MINUTE");
    }
}
