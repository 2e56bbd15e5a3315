// Session wiring: pipeline and the caller-owned position
pub mod session;

pub use session::{PositionTracker, SignalPipeline};
