use std::sync::Arc;
use tokio::sync::Mutex;

use crate::candles::{CandleNormalizer, RawCandleRow};
use crate::indicators::{IndicatorConfig, IndicatorEngine, Series};
use crate::strategy::{Evaluation, Position, SignalConfig, SignalEngine};

/// Normalizer, indicators and signal engine run back to back
#[derive(Debug, Clone, Default)]
pub struct SignalPipeline {
    normalizer: CandleNormalizer,
    indicators: IndicatorEngine,
    engine: SignalEngine,
}

impl SignalPipeline {
    pub fn new(indicator_config: IndicatorConfig, signal_config: SignalConfig) -> Self {
        Self {
            normalizer: CandleNormalizer::new(),
            indicators: IndicatorEngine::new(indicator_config),
            engine: SignalEngine::new(signal_config),
        }
    }

    /// Raw rows in, enriched series and decision out
    pub fn run(&self, rows: &[RawCandleRow], position: Position) -> (Series, Evaluation) {
        let candles = self.normalizer.normalize(rows);
        let series = self.indicators.enrich(&candles);
        let evaluation = self.engine.evaluate(&series, position);
        (series, evaluation)
    }
}

/// Session-scoped owner of the position
///
/// Evaluations against the position are serialized: a tick that arrives while
/// another is still evaluating is dropped, never run concurrently.
#[derive(Clone)]
pub struct PositionTracker {
    position: Arc<Mutex<Position>>,
}

impl PositionTracker {
    pub fn new(position: Position) -> Self {
        Self {
            position: Arc::new(Mutex::new(position)),
        }
    }

    /// Run `pipeline` against the current position and store the update
    ///
    /// Returns `None` if another evaluation holds the position.
    pub fn try_evaluate(
        &self,
        pipeline: &SignalPipeline,
        rows: &[RawCandleRow],
    ) -> Option<(Series, Evaluation)> {
        let Ok(mut guard) = self.position.try_lock() else {
            tracing::warn!("Previous evaluation still running, dropping this tick");
            return None;
        };

        let (series, evaluation) = pipeline.run(rows, *guard);
        *guard = evaluation.position;
        Some((series, evaluation))
    }

    /// Current position, waiting for any in-flight evaluation
    pub async fn snapshot(&self) -> Position {
        *self.position.lock().await
    }

    /// Explicitly flatten the position
    pub async fn close_position(&self) {
        self.position.lock().await.close();
    }

    /// Replace the position wholesale (start of a new session)
    pub async fn reset(&self, position: Position) {
        *self.position.lock().await = position;
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(Position::default())
    }
}
