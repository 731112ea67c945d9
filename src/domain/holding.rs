//! Holdings entry and weight normalization.
//!
//! User input arrives as `(ticker, value)` string pairs. Pairs that fail
//! the input rules never enter the working set; the remaining holdings are
//! weighted by their share of the total value, in percent.

use serde::Serialize;

use super::error::{HoldingRejection, PortlensError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Holding {
    /// Validate a raw pair as typed by the user.
    ///
    /// The ticker is trimmed and upper-cased; the value must parse to a
    /// finite `f64`.
    pub fn parse(ticker: &str, value: &str) -> Result<Self, HoldingRejection> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(HoldingRejection::EmptyTicker);
        }

        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| HoldingRejection::InvalidValue {
                input: value.to_string(),
            })?;
        if !parsed.is_finite() {
            return Err(HoldingRejection::InvalidValue {
                input: value.to_string(),
            });
        }

        Ok(Holding {
            ticker: ticker.to_uppercase(),
            value: parsed,
            weight: None,
        })
    }
}

/// Split a `TICKER=VALUE` command-line argument into its two halves.
pub fn split_pair(arg: &str) -> Option<(&str, &str)> {
    arg.split_once('=').or_else(|| arg.split_once(':'))
}

/// The ordered working set of holdings for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user-entered pair. Rejected pairs leave the set untouched.
    pub fn add(&mut self, ticker: &str, value: &str) -> Result<&Holding, HoldingRejection> {
        let holding = Holding::parse(ticker, value)?;
        self.holdings.push(holding);
        Ok(&self.holdings[self.holdings.len() - 1])
    }

    pub fn remove(&mut self, index: usize) -> Option<Holding> {
        if index < self.holdings.len() {
            Some(self.holdings.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.holdings.clear();
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.value).sum()
    }

    /// Holdings with `weight = value / total * 100`, in insertion order.
    ///
    /// Weights are always recomputed from values, so calling this on an
    /// already weighted set yields the same result.
    pub fn weighted(&self) -> Result<Vec<Holding>, PortlensError> {
        if self.holdings.is_empty() {
            return Err(PortlensError::EmptyPortfolio);
        }

        let total = self.total_value();
        if total == 0.0 || !total.is_finite() {
            return Err(PortlensError::ZeroTotalValue);
        }

        Ok(self
            .holdings
            .iter()
            .map(|h| Holding {
                ticker: h.ticker.clone(),
                value: h.value,
                weight: Some(h.value / total * 100.0),
            })
            .collect())
    }

    /// Store computed weights on the working set itself.
    pub fn normalize(&mut self) -> Result<(), PortlensError> {
        self.holdings = self.weighted()?;
        Ok(())
    }
}

impl FromIterator<Holding> for Portfolio {
    fn from_iter<I: IntoIterator<Item = Holding>>(iter: I) -> Self {
        Portfolio {
            holdings: iter.into_iter().collect(),
        }
    }
}
