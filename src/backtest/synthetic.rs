use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::api::{CandleRequest, CandleSource};
use crate::candles::RawCandleRow;
use crate::models::MarketIndex;

/// Upper bound on generated candles per request
const MAX_CANDLES: usize = 2000;

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MarketScenario {
    /// Steady drift upwards with noise
    Uptrend,
    /// Steady drift downwards with noise
    Downtrend,
    /// Mean-reverting chop around the start price
    Sideways,
}

/// Generates synthetic index candles, reproducible from a seed
///
/// Roughly every `spike_every` candles the volume jumps well above the
/// trailing average so the volume-spike rules have something to fire on.
#[derive(Debug, Clone)]
pub struct SyntheticCandleSource {
    seed: u64,
    scenario: MarketScenario,
    base_price: f64,
    base_volume: f64,
    spike_every: usize,
}

impl SyntheticCandleSource {
    pub fn new(seed: u64, scenario: MarketScenario) -> Self {
        Self {
            seed,
            scenario,
            base_price: 21_700.0,
            base_volume: 100_000.0,
            spike_every: 17,
        }
    }

    /// Start the walk near the index's usual level
    pub fn for_index(seed: u64, scenario: MarketScenario, index: MarketIndex) -> Self {
        let base_price = match index {
            MarketIndex::Nifty => 21_700.0,
            MarketIndex::BankNifty => 47_500.0,
        };
        Self::new(seed, scenario).with_base_price(base_price)
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate `num_candles` rows starting at `start`, `interval_minutes` apart
    ///
    /// Timestamps are exchange-local with an explicit +05:30 offset, the way
    /// the broker sends them.
    pub fn generate(&self, start: NaiveDateTime, num_candles: usize, interval_minutes: i64) -> Vec<RawCandleRow> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut rows = Vec::with_capacity(num_candles);
        let mut price = self.base_price;

        for i in 0..num_candles {
            let timestamp = start + Duration::minutes(i as i64 * interval_minutes);

            let drift = match self.scenario {
                MarketScenario::Uptrend => price * 0.0004,
                MarketScenario::Downtrend => -price * 0.0004,
                MarketScenario::Sideways => (self.base_price - price) * 0.1,
            };
            let noise = price * rng.gen_range(-0.001..0.001); // ±0.1% noise

            let open = price;
            let close = (price + drift + noise).max(1.0);
            let wick = close * rng.gen_range(0.0..0.0005);
            let high = open.max(close) + wick;
            let low = open.min(close) - wick;

            let mut volume = self.base_volume * rng.gen_range(0.8..1.2);
            if self.spike_every > 0 && i > 0 && i % self.spike_every == 0 {
                volume *= 3.0;
            }

            rows.push(vec![
                json!(format!("{}+05:30", timestamp.format("%Y-%m-%dT%H:%M:%S"))),
                json!(round2(open)),
                json!(round2(high)),
                json!(round2(low)),
                json!(round2(close)),
                json!(volume.round() as u64),
            ]);

            price = close;
        }

        rows
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl CandleSource for SyntheticCandleSource {
    async fn fetch_candles(&self, request: &CandleRequest) -> Vec<RawCandleRow> {
        let step = request.interval.minutes();
        let count = (request.window.duration_minutes() / step + 1) as usize;
        let count = count.min(MAX_CANDLES);

        tracing::debug!(
            "Generating {} synthetic {:?} candles for {}",
            count,
            self.scenario,
            request.index
        );

        self.generate(request.window.from, count, step)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
