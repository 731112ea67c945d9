//! SVG chart rendering for the report.
//!
//! Every generator returns an empty string when it has nothing to draw so
//! the caller can substitute a placeholder sentence.

use crate::domain::chart_data::{date_label, PricePoint, ReturnPoint};
use crate::domain::spectral::SpectralView;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

const AXIS_COLOR: &str = "#ccc";
const LABEL_COLOR: &str = "#666";
const UP_COLOR: &str = "#16a34a";
const DOWN_COLOR: &str = "#dc2626";

fn plot_width() -> f64 {
    CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

/// Opening tag, background, title and both axes.
fn open_frame(title: &str) -> String {
    let mut svg = format!(
        r##"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"{}\">{}</text>\n",
        CHART_WIDTH, LABEL_COLOR, title
    ));
    svg.push_str(&line(
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        AXIS_COLOR,
        "",
    ));
    svg.push_str(&line(
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        AXIS_COLOR,
        "",
    ));
    svg
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, extra: &str) -> String {
    format!(
        "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"{}/>\n",
        x1, y1, x2, y2, stroke, extra
    )
}

fn y_label(y: f64, text: &str) -> String {
    format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"{}\">{}</text>\n",
        MARGIN_LEFT - 5.0,
        y,
        LABEL_COLOR,
        text
    )
}

/// Escape text for use inside an SVG element.
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn x_label(x: f64, text: &str) -> String {
    format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"{}\">{}</text>\n",
        x,
        CHART_HEIGHT - MARGIN_BOTTOM + 15.0,
        LABEL_COLOR,
        xml_escape(text)
    )
}

/// X position of the `i`-th of `n` evenly spaced samples.
fn x_at(i: usize, n: usize) -> f64 {
    MARGIN_LEFT + (i as f64 / (n - 1).max(1) as f64) * plot_width()
}

/// First, middle and last date labels of a series of length `n`.
fn date_labels<'a>(n: usize, date: impl Fn(usize) -> &'a str) -> String {
    let mut out = String::new();
    let mut indices = vec![0, n / 2, n - 1];
    indices.dedup();
    for i in indices {
        out.push_str(&x_label(x_at(i, n), &date_label(date(i))));
    }
    out
}

/// Power bars by period with the significance threshold as a dashed line.
pub fn spectral_svg(view: &SpectralView, max_ticks: usize) -> String {
    let Some(threshold) = view.threshold else {
        return String::new();
    };
    if view.is_empty() {
        return String::new();
    }

    let max_power = view
        .series
        .iter()
        .map(|p| p.power)
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);
    let n = view.series.len();
    let slot = plot_width() / n as f64;
    let bar_width = (slot * 0.7).max(1.0);
    let y_scale = |v: f64| MARGIN_TOP + plot_height() - (v / max_power) * plot_height();

    let mut svg = open_frame("Power by period");
    svg.push_str(&y_label(MARGIN_TOP + 5.0, &format!("{:.2}", max_power)));
    svg.push_str(&y_label(CHART_HEIGHT - MARGIN_BOTTOM - 5.0, "0"));

    for (i, point) in view.series.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + (slot - bar_width) / 2.0;
        let y = y_scale(point.power.max(0.0));
        let fill = if point.power >= threshold {
            "#2563eb"
        } else {
            "#93c5fd"
        };
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            x,
            y,
            bar_width,
            CHART_HEIGHT - MARGIN_BOTTOM - y,
            fill
        ));
    }

    let ticks = view.axis_ticks(max_ticks);
    for (i, point) in view.series.iter().enumerate() {
        // Duplicate periods would repeat a label; only the first one is drawn.
        let first_of_period = view.series[..i].iter().all(|p| p.period != point.period);
        if first_of_period && ticks.contains(&point.period) {
            let x = MARGIN_LEFT + (i as f64 + 0.5) * slot;
            svg.push_str(&x_label(x, &point.period.to_string()));
        }
    }

    let ty = y_scale(threshold);
    svg.push_str(&line(
        MARGIN_LEFT,
        ty,
        CHART_WIDTH - MARGIN_RIGHT,
        ty,
        DOWN_COLOR,
        " stroke-dasharray=\"6 4\"",
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"{}\">threshold {:.2}</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        ty - 4.0,
        DOWN_COLOR,
        threshold
    ));
    svg.push_str("</svg>");
    svg
}

/// Daily returns in percent as a line around a zero baseline.
pub fn returns_svg(points: &[ReturnPoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let values: Vec<f64> = points.iter().map(ReturnPoint::percent).collect();
    let min = values.iter().cloned().fold(0.0_f64, f64::min);
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    let range = (max - min).max(f64::EPSILON);
    let y_scale = |v: f64| MARGIN_TOP + plot_height() - ((v - min) / range) * plot_height();
    let n = values.len();

    let mut path_data = String::new();
    for (i, v) in values.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        path_data.push_str(&format!("{} {:.1} {:.1}", cmd, x_at(i, n), y_scale(*v)));
    }

    let mut svg = open_frame("Return (%)");
    svg.push_str(&y_label(MARGIN_TOP + 5.0, &format!("{:.2}%", max)));
    svg.push_str(&y_label(CHART_HEIGHT - MARGIN_BOTTOM - 5.0, &format!("{:.2}%", min)));
    svg.push_str(&line(
        MARGIN_LEFT,
        y_scale(0.0),
        CHART_WIDTH - MARGIN_RIGHT,
        y_scale(0.0),
        AXIS_COLOR,
        " stroke-dasharray=\"2 2\"",
    ));
    svg.push_str(&date_labels(n, |i| points[i].date.as_str()));
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"1.5\"/>\n",
        path_data
    ));
    svg.push_str("</svg>");
    svg
}

/// Candlesticks: a wick from low to high and a body from open to close.
pub fn price_svg(points: &[PricePoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let min = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(f64::EPSILON);
    let y_scale = |v: f64| MARGIN_TOP + plot_height() - ((v - min) / range) * plot_height();
    let n = points.len();
    let slot = plot_width() / n as f64;
    let body_width = (slot * 0.6).max(1.0);

    let mut svg = open_frame("Price");
    svg.push_str(&y_label(MARGIN_TOP + 5.0, &format!("{:.2}", max)));
    svg.push_str(&y_label(CHART_HEIGHT - MARGIN_BOTTOM - 5.0, &format!("{:.2}", min)));

    for (i, p) in points.iter().enumerate() {
        let cx = MARGIN_LEFT + (i as f64 + 0.5) * slot;
        let color = if p.close >= p.open { UP_COLOR } else { DOWN_COLOR };
        svg.push_str(&line(cx, y_scale(p.high), cx, y_scale(p.low), color, ""));
        let top = y_scale(p.open.max(p.close));
        let bottom = y_scale(p.open.min(p.close));
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            cx - body_width / 2.0,
            top,
            body_width,
            (bottom - top).max(1.0),
            color
        ));
    }

    let mut indices = vec![0, n / 2, n - 1];
    indices.dedup();
    for i in indices {
        let cx = MARGIN_LEFT + (i as f64 + 0.5) * slot;
        svg.push_str(&x_label(cx, &date_label(&points[i].date)));
    }
    svg.push_str("</svg>");
    svg
}
