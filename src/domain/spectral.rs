//! Spectral cycle views.
//!
//! The service returns two positionally paired arrays: cycle lengths in
//! days and the power found at each. [`derive`] turns them into a
//! period-ordered series for plotting and a power-ordered ranking for the
//! significant-cycles table.

use serde::Serialize;

/// Fraction of the peak power a cycle must reach to count as significant.
pub const SIGNIFICANCE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPoint {
    pub period: u32,
    pub power: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCycle {
    pub period: u32,
    pub power: f64,
    /// Power as a percentage of the strongest cycle.
    pub relative_strength: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpectralView {
    /// Ascending by period.
    pub series: Vec<SpectralPoint>,
    /// Descending by power.
    pub ranking: Vec<RankedCycle>,
    /// `None` when there are no points.
    pub threshold: Option<f64>,
}

fn round_period(period: f64) -> u32 {
    // `as` saturates: negatives and NaN land on 0.
    period.round() as u32
}

/// Pair periods with powers and build both views.
///
/// Extra trailing entries in the longer slice are ignored.
pub fn derive(periods: &[f64], powers: &[f64]) -> SpectralView {
    let points: Vec<SpectralPoint> = periods
        .iter()
        .zip(powers)
        .map(|(&period, &power)| SpectralPoint {
            period: round_period(period),
            power,
        })
        .collect();

    let Some(max_power) = points.iter().map(|p| p.power).reduce(f64::max) else {
        return SpectralView::default();
    };
    let threshold = max_power * SIGNIFICANCE_RATIO;

    let mut series = points.clone();
    series.sort_by_key(|p| p.period);

    let mut by_power = points;
    by_power.sort_by(|a, b| b.power.total_cmp(&a.power));
    let ranking = by_power
        .into_iter()
        .map(|p| RankedCycle {
            period: p.period,
            power: p.power,
            relative_strength: if max_power > 0.0 {
                p.power / max_power * 100.0
            } else {
                0.0
            },
            significant: p.power >= threshold,
        })
        .collect();

    SpectralView {
        series,
        ranking,
        threshold: Some(threshold),
    }
}

impl SpectralView {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn significant(&self) -> impl Iterator<Item = &RankedCycle> {
        self.ranking.iter().filter(|c| c.significant)
    }

    /// Evenly spaced period labels for the X axis, at most `max_ticks`.
    ///
    /// The first and last period are always included.
    pub fn axis_ticks(&self, max_ticks: usize) -> Vec<u32> {
        let n = self.series.len();
        if n == 0 || max_ticks == 0 {
            return Vec::new();
        }
        if n <= max_ticks {
            return self.series.iter().map(|p| p.period).collect();
        }
        if max_ticks == 1 {
            return vec![self.series[0].period];
        }

        let step = (n - 1) as f64 / (max_ticks - 1) as f64;
        let mut ticks: Vec<u32> = (0..max_ticks)
            .map(|i| {
                let index = ((i as f64 * step).round() as usize).min(n - 1);
                self.series[index].period
            })
            .collect();
        ticks.dedup();
        ticks
    }
}
