//! Render-ready analysis report.

use chrono::NaiveDate;

use super::chart_data::{self, ChartSeries, PricePoint, ReturnPoint};
use super::holding::Holding;
use super::metrics::Metrics;
use super::spectral::{self, SpectralView};

/// One entry of the service's risk decomposition.
///
/// Entries are labelled with the holding's ticker when the decomposition
/// has one entry per holding, and by position otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskContribution {
    pub label: String,
    pub contribution: f64,
}

/// Everything the console summary and the report need, derived once.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Weighted holdings; empty when rendering a saved response.
    pub holdings: Vec<Holding>,
    pub metrics: Metrics,
    pub risk_contributions: Vec<RiskContribution>,
    pub spectral: SpectralView,
    pub prices: ChartSeries<PricePoint>,
    pub returns: ChartSeries<ReturnPoint>,
    pub generated_on: NaiveDate,
}

impl AnalysisReport {
    pub fn build(holdings: Vec<Holding>, metrics: Metrics, generated_on: NaiveDate) -> Self {
        let spectral = spectral::derive(
            &metrics.spectral.significant_periods,
            &metrics.spectral.power_spectrum,
        );
        let prices = chart_data::price_points(&metrics.historical.candlestick);
        let returns = chart_data::return_points(&metrics.historical.returns);
        let risk_contributions = pair_contributions(
            &holdings,
            metrics.historical.risk_metrics.risk_decomposition.as_deref(),
        );

        tracing::debug!(
            cycles = spectral.series.len(),
            price_points = prices.len(),
            return_points = returns.len(),
            "report data derived"
        );

        AnalysisReport {
            holdings,
            metrics,
            risk_contributions,
            spectral,
            prices,
            returns,
            generated_on,
        }
    }
}

fn pair_contributions(holdings: &[Holding], decomposition: Option<&[f64]>) -> Vec<RiskContribution> {
    let Some(decomposition) = decomposition else {
        return Vec::new();
    };
    let by_ticker = decomposition.len() == holdings.len();
    if !by_ticker && !holdings.is_empty() {
        tracing::debug!(
            holdings = holdings.len(),
            entries = decomposition.len(),
            "risk decomposition does not match holdings; labelling by position"
        );
    }
    decomposition
        .iter()
        .enumerate()
        .map(|(i, &contribution)| RiskContribution {
            label: if by_ticker {
                holdings[i].ticker.clone()
            } else {
                format!("Asset {}", i + 1)
            },
            contribution,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart_data::NoDataReason;
    use crate::domain::metrics::fixtures::sample_metrics;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn derives_spectral_view_from_metrics() {
        let report = AnalysisReport::build(vec![], sample_metrics(), day());
        assert_eq!(report.spectral.series.len(), 3);
        assert_eq!(report.spectral.ranking[0].period, 10);
        assert!(report.spectral.threshold.is_some());
    }

    #[test]
    fn empty_series_become_no_data() {
        let report = AnalysisReport::build(vec![], sample_metrics(), day());
        assert_eq!(report.prices, ChartSeries::NoData(NoDataReason::Empty));
        assert_eq!(report.returns, ChartSeries::NoData(NoDataReason::Empty));
    }

    #[test]
    fn filters_series_records() {
        let mut metrics = sample_metrics();
        metrics.historical.returns = vec![
            json!({ "date": "2024-01-02", "return": 0.01 }),
            json!({ "date": "2024-01-03", "return": null }),
            json!({ "date": "2024-01-04", "return": -0.02 }),
        ];
        let report = AnalysisReport::build(vec![], metrics, day());
        assert_eq!(report.returns.len(), 2);
    }

    #[test]
    fn risk_decomposition_is_labelled_by_ticker() {
        let mut metrics = sample_metrics();
        metrics.historical.risk_metrics.risk_decomposition = Some(vec![0.4, 0.6]);
        let holdings = vec![
            Holding::parse("AAPL", "100").unwrap(),
            Holding::parse("MSFT", "300").unwrap(),
        ];
        let report = AnalysisReport::build(holdings, metrics, day());

        let labels: Vec<&str> = report
            .risk_contributions
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, vec!["AAPL", "MSFT"]);
        assert_eq!(report.risk_contributions[1].contribution, 0.6);
    }

    #[test]
    fn mismatched_decomposition_is_labelled_by_position() {
        let mut metrics = sample_metrics();
        metrics.historical.risk_metrics.risk_decomposition = Some(vec![0.2, 0.3, 0.5]);
        let holdings = vec![Holding::parse("AAPL", "100").unwrap()];
        let report = AnalysisReport::build(holdings, metrics, day());

        assert_eq!(report.risk_contributions.len(), 3);
        assert_eq!(report.risk_contributions[2].label, "Asset 3");
    }

    #[test]
    fn absent_decomposition_yields_no_contributions() {
        let report = AnalysisReport::build(vec![], sample_metrics(), day());
        assert!(report.risk_contributions.is_empty());
    }
}
