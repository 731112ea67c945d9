//! Holdings source port trait.

use crate::domain::error::PortlensError;

/// A `(ticker, value)` pair exactly as it was entered or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHolding {
    pub ticker: String,
    pub value: String,
}

impl RawHolding {
    pub fn new(ticker: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            value: value.into(),
        }
    }
}

pub trait HoldingsPort {
    /// Rows in source order, unvalidated.
    fn load_holdings(&self) -> Result<Vec<RawHolding>, PortlensError>;
}
