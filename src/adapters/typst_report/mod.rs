//! Typst report generation.
//!
//! Orchestrates placeholder resolution: reads a Typst template (either the
//! built-in default or a custom file via `template_path`), resolves all
//! `{{PLACEHOLDER}}` markers by calling helpers from `chart_svg` and `tables`,
//! and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::chart_data::{ChartSeries, NoDataReason};
use crate::domain::config_validation::DEFAULT_AXIS_TICKS;
use crate::domain::dashboard::AnalysisReport;
use crate::domain::error::PortlensError;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

/// Every marker the resolver understands.
pub const PLACEHOLDERS: [&str; 8] = [
    "HOLDINGS_TABLE",
    "METRIC_CARDS",
    "RISK_METRICS_TABLE",
    "PRICE_CHART",
    "RETURNS_CHART",
    "SPECTRAL_CHART",
    "SIGNIFICANT_CYCLES",
    "GENERATED_ON",
];

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub report: &'a AnalysisReport,
    pub axis_ticks: usize,
}

fn embed_svg(svg: &str) -> String {
    format!(
        "#image.decode(\n\"{}\",\n  width: 100%,\n)",
        svg.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

fn no_data_sentence(what: &str, reason: Option<NoDataReason>) -> String {
    match reason {
        Some(NoDataReason::AllInvalid { dropped }) => format!(
            "_No {what} data available ({dropped} record(s) were incomplete)._"
        ),
        _ => format!("_No {what} data available._"),
    }
}

fn series_reason<T>(series: &ChartSeries<T>) -> Option<NoDataReason> {
    match series {
        ChartSeries::NoData(reason) => Some(*reason),
        ChartSeries::Points(_) => None,
    }
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup ready to be written to a `.typ` file.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let report = ctx.report;
    let mut output = template.to_string();

    output = output.replace(
        "{{GENERATED_ON}}",
        &report.generated_on.format("%Y-%m-%d").to_string(),
    );

    let holdings = tables::format_holdings_table(&report.holdings);
    output = output.replace("{{HOLDINGS_TABLE}}", &holdings);

    let cards = tables::format_metric_cards(&report.metrics.cards());
    output = output.replace("{{METRIC_CARDS}}", &cards);

    let mut risk = tables::format_risk_metrics_table(&report.metrics.historical_risk_rows());
    risk.push_str(&tables::format_risk_contributions(&report.risk_contributions));
    output = output.replace("{{RISK_METRICS_TABLE}}", &risk);

    // Price candlesticks
    let price_svg = report
        .prices
        .points()
        .map(chart_svg::price_svg)
        .unwrap_or_default();
    let price_typst = if price_svg.is_empty() {
        no_data_sentence("price", series_reason(&report.prices))
    } else {
        embed_svg(&price_svg)
    };
    output = output.replace("{{PRICE_CHART}}", &price_typst);

    // Daily returns
    let returns_svg = report
        .returns
        .points()
        .map(chart_svg::returns_svg)
        .unwrap_or_default();
    let returns_typst = if returns_svg.is_empty() {
        no_data_sentence("return", series_reason(&report.returns))
    } else {
        embed_svg(&returns_svg)
    };
    output = output.replace("{{RETURNS_CHART}}", &returns_typst);

    // Power spectrum
    let spectral_svg = chart_svg::spectral_svg(&report.spectral, ctx.axis_ticks);
    let spectral_typst = if spectral_svg.is_empty() {
        no_data_sentence("spectral", None)
    } else {
        embed_svg(&spectral_svg)
    };
    output = output.replace("{{SPECTRAL_CHART}}", &spectral_typst);

    let cycles = tables::format_significant_cycles(&report.spectral);
    output = output.replace("{{SIGNIFICANT_CYCLES}}", &cycles);

    output
}

/// Writes resolved Typst markup to disk.
pub struct TypstReportAdapter {
    template_path: Option<PathBuf>,
    axis_ticks: usize,
}

impl TypstReportAdapter {
    pub fn new(template_path: Option<PathBuf>, axis_ticks: usize) -> Self {
        Self {
            template_path,
            axis_ticks,
        }
    }

    /// Build from `[report] template_path` and `[report] axis_ticks`.
    ///
    /// Expects the `[report]` section to have passed validation.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let template_path = config
            .get_string("report", "template_path")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let axis_ticks = config.get_int("report", "axis_ticks", DEFAULT_AXIS_TICKS);
        Self::new(template_path, usize::try_from(axis_ticks).unwrap_or(0))
    }

    fn load_template(&self) -> Result<String, PortlensError> {
        match &self.template_path {
            Some(path) => fs::read_to_string(path).map_err(|e| PortlensError::ConfigInvalid {
                section: "report".to_string(),
                key: "template_path".to_string(),
                reason: format!("cannot read {}: {}", path.display(), e),
            }),
            None => Ok(default_template::template().to_string()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), PortlensError> {
        let template = self.load_template()?;
        let ctx = ReportContext {
            report,
            axis_ticks: self.axis_ticks,
        };
        let content = resolve(&template, &ctx);

        if let Some(parent) = Path::new(output_path).parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, content)?;
        tracing::debug!(path = output_path, "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::holding::Portfolio;
    use crate::domain::metrics::fixtures::sample_metrics;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_report() -> AnalysisReport {
        let mut portfolio = Portfolio::new();
        portfolio.add("AAPL", "100").unwrap();
        portfolio.add("MSFT", "300").unwrap();
        AnalysisReport::build(
            portfolio.weighted().unwrap(),
            sample_metrics(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    fn ctx(report: &AnalysisReport) -> ReportContext<'_> {
        ReportContext {
            report,
            axis_ticks: 6,
        }
    }

    #[test]
    fn resolve_default_template_no_placeholders_remain() {
        let report = sample_report();
        let output = resolve(default_template::template(), &ctx(&report));
        assert!(
            !output.contains("{{"),
            "unresolved placeholder in output: {output}"
        );
    }

    #[test]
    fn resolve_produces_valid_typst() {
        let report = sample_report();
        let output = resolve(default_template::template(), &ctx(&report));
        assert!(output.contains("#set page("));
        assert!(output.contains("= Portfolio Analysis"));
        assert!(output.contains("Generated on 2024-06-01."));
        assert!(output.contains("[AAPL], [100.00], [25.00%]"));
        assert!(output.contains("#image.decode("));
    }

    #[test]
    fn empty_series_render_placeholder_sentences() {
        let report = sample_report();
        let output = resolve(default_template::template(), &ctx(&report));
        assert!(output.contains("_No price data available._"));
        assert!(output.contains("_No return data available._"));
    }

    #[test]
    fn all_invalid_series_mention_dropped_records() {
        let mut metrics = sample_metrics();
        metrics.historical.returns = vec![json!({ "date": "2024-01-02", "return": null })];
        let report = AnalysisReport::build(
            vec![],
            metrics,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        let output = resolve("{{RETURNS_CHART}}", &ctx(&report));
        assert_eq!(
            output,
            "_No return data available (1 record(s) were incomplete)._"
        );
    }

    #[test]
    fn populated_series_are_embedded() {
        let mut metrics = sample_metrics();
        metrics.historical.candlestick = vec![
            json!({ "date": "2024-01-02", "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5 }),
            json!({ "date": "2024-01-03", "open": 1.5, "high": 1.6, "low": 1.0, "close": 1.1 }),
        ];
        let report = AnalysisReport::build(
            vec![],
            metrics,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        let output = resolve("{{PRICE_CHART}}", &ctx(&report));
        assert!(output.starts_with("#image.decode("));
        assert!(output.contains("\\\"http://www.w3.org/2000/svg\\\""));
    }

    #[test]
    fn resolve_custom_template() {
        let report = sample_report();
        let custom = "= My Report\n{{HOLDINGS_TABLE}}\n{{SIGNIFICANT_CYCLES}}";
        let output = resolve(custom, &ctx(&report));
        assert!(output.contains("= My Report"));
        assert!(output.contains("#table("));
        assert!(!output.contains("{{"));
    }

    #[test]
    fn adapter_writes_report_and_creates_directories() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested/out/report.typ");
        let adapter = TypstReportAdapter::new(None, 6);

        adapter
            .write(&sample_report(), output.to_str().unwrap())
            .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("= Portfolio Analysis"));
    }

    #[test]
    fn adapter_uses_custom_template_file() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("custom.typ");
        fs::write(&template, "Custom {{GENERATED_ON}}").unwrap();
        let output = dir.path().join("report.typ");

        let adapter = TypstReportAdapter::new(Some(template), 6);
        adapter
            .write(&sample_report(), output.to_str().unwrap())
            .unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "Custom 2024-06-01");
    }

    #[test]
    fn missing_custom_template_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let adapter = TypstReportAdapter::new(Some(dir.path().join("missing.typ")), 6);
        let err = adapter
            .write(&sample_report(), dir.path().join("r.typ").to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, PortlensError::ConfigInvalid { ref key, .. } if key == "template_path"));
    }
}
