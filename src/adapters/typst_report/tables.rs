//! Table formatting for the report.
//!
//! Provides functions to generate Typst markup for:
//! - the weighted holdings table
//! - one metric card per metric group
//! - the historical risk metrics table
//! - the per-holding risk decomposition
//! - the ranked list of significant cycles

use crate::domain::dashboard::RiskContribution;
use crate::domain::holding::Holding;
use crate::domain::metrics::{MetricCard, MetricRow};
use crate::domain::spectral::SpectralView;

/// Escape characters that Typst treats as markup inside content blocks.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '#' | '$' | '*' | '_' | '@' | '<' | '>' | '[' | ']' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn format_holdings_table(holdings: &[Holding]) -> String {
    if holdings.is_empty() {
        return "_No holdings recorded for this analysis._\n".to_string();
    }

    let total: f64 = holdings.iter().map(|h| h.value).sum();
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 3,\n");
    output.push_str("  align: (left, right, right),\n");
    output.push_str("  [*Ticker*], [*Value*], [*Weight*],\n");

    for holding in holdings {
        let weight = holding
            .weight
            .map(|w| format!("{:.2}%", w))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "  [{}], [{:.2}], [{}],\n",
            escape(&holding.ticker),
            holding.value,
            weight
        ));
    }
    let total_weight = if holdings.iter().any(|h| h.weight.is_some()) {
        format!("{:.2}%", holdings.iter().filter_map(|h| h.weight).sum::<f64>())
    } else {
        "-".to_string()
    };
    output.push_str(&format!(
        "  [*Total*], [*{:.2}*], [*{}*],\n",
        total, total_weight
    ));

    output.push_str(")\n\n");
    output
}

/// Risk decomposition entries; empty when the service sent none.
pub fn format_risk_contributions(contributions: &[RiskContribution]) -> String {
    if contributions.is_empty() {
        return String::new();
    }
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 2,\n");
    output.push_str("  align: (left, right),\n");
    output.push_str("  [*Holding*], [*Risk Contribution*],\n");
    for entry in contributions {
        output.push_str(&format!(
            "  [{}], [{:.4}],\n",
            escape(&entry.label),
            entry.contribution
        ));
    }
    output.push_str(")\n\n");
    output
}

fn format_rows(rows: &[MetricRow]) -> String {
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 2,\n");
    output.push_str("  align: (left, right),\n");
    output.push_str("  stroke: none,\n");
    for row in rows {
        let cell = if row.value.is_finite() {
            row.display_value()
        } else {
            "-".to_string()
        };
        output.push_str(&format!("  [{}], [{}],\n", row.label, cell));
    }
    output.push_str(")\n");
    output
}

/// Metric groups laid out two per row, each in its own bordered block.
pub fn format_metric_cards(cards: &[MetricCard]) -> String {
    let mut output = String::new();
    output.push_str("#grid(\n");
    output.push_str("  columns: (1fr, 1fr),\n");
    output.push_str("  gutter: 12pt,\n");

    for card in cards {
        output.push_str("  block(\n");
        output.push_str("    stroke: 0.5pt + luma(200),\n");
        output.push_str("    inset: 8pt,\n");
        output.push_str("    radius: 4pt,\n");
        output.push_str("    width: 100%,\n");
        output.push_str("  )[\n");
        output.push_str(&format!("    *{}*\n\n", card.title));
        for line in format_rows(&card.rows).lines() {
            output.push_str("    ");
            output.push_str(line);
            output.push('\n');
        }
        output.push_str("  ],\n");
    }

    output.push_str(")\n\n");
    output
}

pub fn format_risk_metrics_table(rows: &[MetricRow]) -> String {
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 2,\n");
    output.push_str("  align: (left, right),\n");
    output.push_str("  [*Metric*], [*Value*],\n");
    for row in rows {
        output.push_str(&format!("  [{}], [{}],\n", row.label, row.display_value()));
    }
    output.push_str(")\n\n");
    output
}

/// Cycles ranked by power; those at or above the threshold are bold.
pub fn format_significant_cycles(view: &SpectralView) -> String {
    let Some(threshold) = view.threshold else {
        return "_No spectral data available._\n".to_string();
    };

    let mut output = format!(
        "Significance threshold: {:.2} (80% of peak power).\n\n",
        threshold
    );
    output.push_str("#table(\n");
    output.push_str("  columns: 4,\n");
    output.push_str("  align: (right, right, right, right),\n");
    output.push_str("  [*Rank*], [*Period (days)*], [*Power*], [*Relative Strength*],\n");

    for (i, cycle) in view.ranking.iter().enumerate() {
        let cells = [
            (i + 1).to_string(),
            cycle.period.to_string(),
            format!("{:.4}", cycle.power),
            format!("{:.1}%", cycle.relative_strength),
        ];
        let row: Vec<String> = cells
            .iter()
            .map(|c| {
                if cycle.significant {
                    format!("[*{}*]", c)
                } else {
                    format!("[{}]", c)
                }
            })
            .collect();
        output.push_str(&format!("  {},\n", row.join(", ")));
    }

    output.push_str(")\n\n");
    output
}
