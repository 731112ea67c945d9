//! Built-in Typst report template.
//!
//! Used when `[report] template_path` is not set. Custom templates may use
//! any subset of the same `{{PLACEHOLDER}}` markers.

const DEFAULT_TEMPLATE: &str = r#"#set page(paper: "a4", margin: (x: 2cm, y: 2cm), numbering: "1")
#set text(size: 10pt)
#show heading.where(level: 1): set text(size: 18pt)
#show heading.where(level: 2): set text(size: 13pt)

= Portfolio Analysis

Generated on {{GENERATED_ON}}.

== Holdings

{{HOLDINGS_TABLE}}

== Key Metrics

{{METRIC_CARDS}}

== Historical Risk

{{RISK_METRICS_TABLE}}

== Price History

{{PRICE_CHART}}

== Daily Returns

{{RETURNS_CHART}}

== Spectral Analysis

{{SPECTRAL_CHART}}

=== Significant Cycles

{{SIGNIFICANT_CYCLES}}
"#;

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}
