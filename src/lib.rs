// Core modules
pub mod api;
pub mod backtest;
pub mod candles;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod settings;
pub mod strategy;

// Re-export commonly used types
pub use models::*;
pub use strategy::{Evaluation, Position, Readiness, SignalEngine};

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
