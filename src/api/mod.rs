pub mod error;
pub mod smartapi;
pub mod window;

pub use error::ApiError;
pub use smartapi::{CandleRequest, CandleSource, SmartApiClient};
pub use window::{now_ist, to_ist, CandleWindow};
