// Trading strategy module
pub mod position;
pub mod signals;

pub use position::{Position, PositionState, DEFAULT_QUANTITY};
pub use signals::{Evaluation, Readiness, SignalConfig, SignalEngine};
