//! Trusted analysis metrics and their display layout.
//!
//! Values of these types only come out of
//! [`validate`](crate::domain::validation::validate); every required field
//! is a real number by construction.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsMetrics {
    pub cagr: f64,
    pub annual_return: f64,
    pub best_year: f64,
    pub worst_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub standard_dev: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub var_five_percent: f64,
    pub cvar_five_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub alpha: f64,
    pub beta: f64,
    pub correlation: f64,
    pub up_capture: f64,
    pub down_capture: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionMetrics {
    pub skewness: f64,
    pub kurtosis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralMetrics {
    pub significant_periods: Vec<f64>,
    pub power_spectrum: Vec<f64>,
}

/// Risk figures computed over the portfolio's price history.
///
/// The five named ratios are required; the remaining fields are extras the
/// service may omit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRiskMetrics {
    pub diversification_effect: f64,
    pub treynor_ratio: f64,
    pub information_ratio: f64,
    #[serde(rename = "modifiedVaR")]
    pub modified_var: f64,
    pub omega_ratio: f64,
    pub risk_decomposition: Option<Vec<f64>>,
    #[serde(rename = "valueatrisk")]
    pub value_at_risk: Option<f64>,
    pub beta: Option<f64>,
}

/// Raw price and return series plus history-based risk.
///
/// Series entries stay untyped; they are filtered record by record by
/// [`chart_data`](crate::domain::chart_data) when charts are built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Historical {
    pub candlestick: Vec<Value>,
    pub returns: Vec<Value>,
    pub risk_metrics: HistoricalRiskMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub returns: ReturnsMetrics,
    pub risk: RiskMetrics,
    pub market: MarketMetrics,
    pub distribution: DistributionMetrics,
    pub spectral: SpectralMetrics,
    pub historical: Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    Percent,
    Decimal,
}

impl MetricFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            MetricFormat::Percent => format!("{:.2}%", value),
            MetricFormat::Decimal => format!("{:.2}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: f64,
    pub format: MetricFormat,
}

impl MetricRow {
    fn percent(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value,
            format: MetricFormat::Percent,
        }
    }

    fn decimal(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value,
            format: MetricFormat::Decimal,
        }
    }

    pub fn display_value(&self) -> String {
        self.format.format(self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub title: &'static str,
    pub rows: Vec<MetricRow>,
}

impl Metrics {
    /// Returns, risk, market and distribution cards in display order.
    pub fn cards(&self) -> Vec<MetricCard> {
        vec![
            MetricCard {
                title: "Returns",
                rows: vec![
                    MetricRow::percent("CAGR", self.returns.cagr),
                    MetricRow::percent("Annual Return", self.returns.annual_return),
                    MetricRow::percent("Best Year", self.returns.best_year),
                    MetricRow::percent("Worst Year", self.returns.worst_year),
                ],
            },
            MetricCard {
                title: "Risk Metrics",
                rows: vec![
                    MetricRow::percent("Standard Deviation", self.risk.standard_dev),
                    MetricRow::percent("Max Drawdown", self.risk.max_drawdown),
                    MetricRow::decimal("Sharpe Ratio", self.risk.sharpe_ratio),
                    MetricRow::percent("VaR (5%)", self.risk.var_five_percent),
                    MetricRow::percent("CVaR (5%)", self.risk.cvar_five_percent),
                ],
            },
            MetricCard {
                title: "Market Metrics",
                rows: vec![
                    MetricRow::percent("Alpha", self.market.alpha),
                    MetricRow::decimal("Beta", self.market.beta),
                    MetricRow::decimal("Correlation", self.market.correlation),
                    MetricRow::percent("Up Capture", self.market.up_capture),
                    MetricRow::percent("Down Capture", self.market.down_capture),
                ],
            },
            MetricCard {
                title: "Distribution Metrics",
                rows: vec![
                    MetricRow::decimal("Skewness", self.distribution.skewness),
                    MetricRow::decimal("Kurtosis", self.distribution.kurtosis),
                ],
            },
        ]
    }

    /// History-based risk ratios, extras included when present.
    pub fn historical_risk_rows(&self) -> Vec<MetricRow> {
        let risk = &self.historical.risk_metrics;
        let mut rows = vec![
            MetricRow::decimal("Diversification Effect", risk.diversification_effect),
            MetricRow::decimal("Treynor Ratio", risk.treynor_ratio),
            MetricRow::decimal("Information Ratio", risk.information_ratio),
            MetricRow::decimal("Modified VaR", risk.modified_var),
            MetricRow::decimal("Omega Ratio", risk.omega_ratio),
        ];
        if let Some(var) = risk.value_at_risk {
            rows.push(MetricRow::decimal("Value at Risk", var));
        }
        if let Some(beta) = risk.beta {
            rows.push(MetricRow::decimal("Historical Beta", beta));
        }
        rows
    }
}
