use serde::{Deserialize, Serialize};

/// Fixed lot size used for P&L estimates
pub const DEFAULT_QUANTITY: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Open,
}

/// The simulated single open trade
///
/// Owned by the caller across refresh cycles. Only the signal engine sets the
/// entry price; the caller may reset it with [`Position::close`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    entry_price: Option<f64>,
    quantity: u32,
}

impl Position {
    pub fn new(quantity: u32) -> Self {
        Self {
            entry_price: None,
            quantity,
        }
    }

    /// Rebuild a position the caller saved from an earlier cycle
    pub fn restore(entry_price: Option<f64>, quantity: u32) -> Self {
        Self {
            entry_price,
            quantity,
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Open means an entry price above zero has been recorded
    pub fn is_open(&self) -> bool {
        self.open_entry().is_some()
    }

    pub fn state(&self) -> PositionState {
        if self.is_open() {
            PositionState::Open
        } else {
            PositionState::Flat
        }
    }

    /// Entry price, if the position is open
    pub fn open_entry(&self) -> Option<f64> {
        self.entry_price.filter(|p| *p > 0.0)
    }

    /// `(price - entry) * quantity`, only while open
    pub fn unrealized_pnl(&self, price: f64) -> Option<f64> {
        self.open_entry()
            .map(|entry| (price - entry) * self.quantity as f64)
    }

    pub(crate) fn set_entry(&mut self, price: f64) {
        self.entry_price = Some(price);
    }

    /// Return to FLAT
    ///
    /// The engine never calls this: a stop-loss or take-profit signal leaves
    /// the entry in place and keeps firing until the caller closes.
    pub fn close(&mut self) {
        if let Some(entry) = self.entry_price.take() {
            tracing::info!("Position closed (entry was {:.2})", entry);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTITY)
    }
}
