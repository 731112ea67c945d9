//! CSV holdings file adapter.
//!
//! Expects a header row naming a `ticker` and a `value` column (any case,
//! any order). Cells are handed over as raw text; acceptance of each pair
//! is decided by the domain.

use crate::domain::error::PortlensError;
use crate::ports::holdings_port::{HoldingsPort, RawHolding};
use std::fs;
use std::path::PathBuf;

pub struct CsvHoldingsAdapter {
    path: PathBuf,
}

impl CsvHoldingsAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn file_error(&self, reason: impl Into<String>) -> PortlensError {
        PortlensError::HoldingsFile {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl HoldingsPort for CsvHoldingsAdapter {
    fn load_holdings(&self) -> Result<Vec<RawHolding>, PortlensError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.file_error(format!("failed to read: {}", e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| self.file_error(format!("CSV parse error: {}", e)))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| self.file_error(format!("missing {} column", name)))
        };
        let ticker_col = column("ticker")?;
        let value_col = column("value")?;

        let mut holdings = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| self.file_error(format!("CSV parse error: {}", e)))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            holdings.push(RawHolding::new(
                record.get(ticker_col).unwrap_or_default(),
                record.get(value_col).unwrap_or_default(),
            ));
        }

        tracing::debug!(path = %self.path.display(), rows = holdings.len(), "holdings file loaded");
        Ok(holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holdings.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn pairs(rows: &[RawHolding]) -> Vec<(&str, &str)> {
        rows.iter()
            .map(|r| (r.ticker.as_str(), r.value.as_str()))
            .collect()
    }

    #[test]
    fn load_holdings_returns_rows_in_order() {
        let (_dir, path) = write_file("ticker,value\nAAPL,100\nMSFT,300\n");
        let rows = CsvHoldingsAdapter::new(path).load_holdings().unwrap();
        assert_eq!(pairs(&rows), vec![("AAPL", "100"), ("MSFT", "300")]);
    }

    #[test]
    fn columns_are_found_by_header_name() {
        let (_dir, path) = write_file("Value, Ticker ,note\n250,vti,core\n 50 , bnd ,\n");
        let rows = CsvHoldingsAdapter::new(path).load_holdings().unwrap();
        assert_eq!(pairs(&rows), vec![("vti", "250"), ("bnd", "50")]);
    }

    #[test]
    fn invalid_cells_are_passed_through() {
        let (_dir, path) = write_file("ticker,value\nAAPL,abc\n,10\nGOOG\n");
        let rows = CsvHoldingsAdapter::new(path).load_holdings().unwrap();
        assert_eq!(pairs(&rows), vec![("AAPL", "abc"), ("", "10"), ("GOOG", "")]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (_dir, path) = write_file("ticker,value\nAAPL,1\n,\nMSFT,2\n");
        let rows = CsvHoldingsAdapter::new(path).load_holdings().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_column_is_an_error() {
        let (_dir, path) = write_file("symbol,amount\nAAPL,1\n");
        let err = CsvHoldingsAdapter::new(path).load_holdings().unwrap_err();
        match err {
            PortlensError::HoldingsFile { reason, .. } => {
                assert!(reason.contains("ticker"), "{reason}")
            }
            other => panic!("expected HoldingsFile, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let adapter = CsvHoldingsAdapter::new(PathBuf::from("/nonexistent/holdings.csv"));
        assert!(matches!(
            adapter.load_holdings(),
            Err(PortlensError::HoldingsFile { .. })
        ));
    }
}
