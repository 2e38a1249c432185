//! Chart configuration builder
//!
//! A [`ChartConfig`] (series + unit + axis options) is turned into:
//!
//! - axis bounds ([`nice_max_percent`], [`nice_bounds_gbp`]),
//! - a declarative bar-chart specification ([`spec::ChartSpec`]) that the
//!   page hands to Chart.js unchanged,
//! - end-of-bar labels positioned by [`overlay`].
//!
//! Ticks, tooltips and end labels all go through [`Unit::format`], so the
//! three always agree.

pub mod cards;
pub mod overlay;
pub mod spec;
pub mod surface;
pub mod svg;

use crate::error::{Error, Result};
use crate::evidence::format::{fmt_gbp, fmt_percent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Percent,
    Gbp,
}

impl Unit {
    /// Shared tick / tooltip / end-label formatter.
    pub fn format(self, value: f64) -> String {
        match self {
            Unit::Percent => fmt_percent(value, 1),
            Unit::Gbp => fmt_gbp(value),
        }
    }

    /// Signed difference, `pp` for percent and GBP otherwise.
    pub fn format_gap(self, delta: f64) -> String {
        // round first so a tiny delta never shows as "+0.0pp" or "-£0"
        let delta = match self {
            Unit::Percent => (delta * 10.0).round() / 10.0,
            Unit::Gbp => delta.round(),
        };
        let sign = if delta > 0.0 { "+" } else { "" };
        match self {
            Unit::Percent => format!("{}{:.1}pp", sign, if delta == 0.0 { 0.0 } else { delta }),
            Unit::Gbp => format!("{}{}", sign, fmt_gbp(delta)),
        }
    }
}

/// Labels and values for one chart. Checked at construction: same length,
/// unique labels, finite values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl ChartSeries {
    pub fn new(id: &str, labels: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if labels.len() != values.len() {
            return Err(Error::Series {
                id: id.to_string(),
                reason: format!("{} labels but {} values", labels.len(), values.len()),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(Error::Series {
                id: id.to_string(),
                reason: format!("duplicate label '{}'", dup),
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::Series {
                id: id.to_string(),
                reason: format!("value for '{}' is not a finite number", labels[pos]),
            });
        }
        Ok(Self { labels, values })
    }

    pub fn from_pairs(id: &str, pairs: &[(&str, f64)]) -> Result<Self> {
        Self::new(
            id,
            pairs.iter().map(|(l, _)| l.to_string()).collect(),
            pairs.iter().map(|(_, v)| *v).collect(),
        )
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reorder by value, largest first. Ties keep their order.
    pub fn sorted_descending(&self) -> Self {
        let mut pairs: Vec<(String, f64)> = self.labels.iter().cloned().zip(self.values.iter().copied()).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (labels, values) = pairs.into_iter().unzip();
        Self { labels, values }
    }

    /// Value for `subject` minus the mean of every other bar.
    pub fn gap_vs_average(&self, subject: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == subject)?;
        let others: Vec<f64> = self
            .values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, v)| *v)
            .collect();
        if others.is_empty() {
            return None;
        }
        let mean = others.iter().sum::<f64>() / others.len() as f64;
        Some(self.values[idx] - mean)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentAxis {
    pub headroom: f64,
    pub step: f64,
    pub min: f64,
}

impl Default for PercentAxis {
    fn default() -> Self {
        Self { headroom: 1.2, step: 0.5, min: 5.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyAxis {
    pub pad: f64,
    pub step: f64,
}

impl Default for CurrencyAxis {
    fn default() -> Self {
        Self { pad: 250.0, step: 250.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Upper bound for a percent axis. Never below the largest value.
pub fn nice_max_percent(values: &[f64], axis: &PercentAxis) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max = if max.is_finite() { max } else { 0.0 };
    let raw = axis.min.max(max * axis.headroom).max(max);
    let step = if axis.step > 0.0 { axis.step } else { 1.0 };
    let bound = if axis.step > 0.0 { (raw / step).ceil() * step } else { raw };
    // an all-zero series with no minimum still needs a non-empty axis
    if bound > 0.0 {
        bound
    } else {
        step
    }
}

/// Padded, step-aligned bounds for a GBP axis. `None` for an empty series.
pub fn nice_bounds_gbp(values: &[f64], axis: &CurrencyAxis) -> Option<Bounds> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    let step = if axis.step > 0.0 { axis.step } else { 1.0 };
    let lower = ((min - axis.pad) / step).floor() * step;
    let mut upper = ((max + axis.pad) / step).ceil() * step;
    if upper <= lower {
        upper = lower + step;
    }
    Some(Bounds { min: lower, max: upper })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum AxisOptions {
    Percent(PercentAxis),
    Gbp(CurrencyAxis),
}

impl AxisOptions {
    pub fn unit(&self) -> Unit {
        match self {
            AxisOptions::Percent(_) => Unit::Percent,
            AxisOptions::Gbp(_) => Unit::Gbp,
        }
    }

    /// Value-axis bounds for `values`; `None` leaves the axis to the library.
    pub fn bounds(&self, values: &[f64]) -> Option<Bounds> {
        match self {
            AxisOptions::Percent(p) => Some(Bounds { min: 0.0, max: nice_max_percent(values, p) }),
            AxisOptions::Gbp(c) => nice_bounds_gbp(values, c),
        }
    }

    pub fn step(&self) -> f64 {
        match self {
            AxisOptions::Percent(p) => p.step,
            AxisOptions::Gbp(c) => c.step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

pub const NHS_BLUE: &str = "#005EB8";
pub const PALETTE: [&str; 4] = [NHS_BLUE, "#0072CE", "#41B6E6", "#78BE20"];

/// Everything needed to build one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub series: ChartSeries,
    pub axis: AxisOptions,
    pub orientation: Orientation,
    pub colors: Vec<String>,
    pub bar_thickness: Option<u32>,
    pub border_radius: u32,
}

impl ChartConfig {
    pub fn new(id: &str, title: &str, series: ChartSeries, axis: AxisOptions) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            series,
            axis,
            orientation: Orientation::Horizontal,
            colors: PALETTE.iter().map(|c| c.to_string()).collect(),
            bar_thickness: None,
            border_radius: 6,
        }
    }

    pub fn unit(&self) -> Unit {
        self.axis.unit()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.axis.bounds(self.series.values())
    }

    /// One colour per bar, cycling the palette.
    pub fn bar_colors(&self) -> Vec<String> {
        if self.colors.is_empty() {
            return vec![NHS_BLUE.to_string(); self.series.len()];
        }
        (0..self.series.len())
            .map(|i| self.colors[i % self.colors.len()].clone())
            .collect()
    }

    pub fn build(&self) -> spec::ChartSpec {
        spec::ChartSpec::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PERCENT BOUNDS
    // ==========================================================================

    #[test]
    fn test_scenario_c_housing_bound() {
        let axis = PercentAxis { headroom: 1.35, step: 0.5, min: 5.0 };
        assert_eq!(nice_max_percent(&[2.5, 2.6, 3.0, 4.4], &axis), 6.0);
    }

    #[test]
    fn test_percent_minimum_applies() {
        assert_eq!(nice_max_percent(&[1.0, 2.0], &PercentAxis::default()), 5.0);
        assert_eq!(nice_max_percent(&[], &PercentAxis::default()), 5.0);
        let rent = PercentAxis { headroom: 1.15, step: 0.5, min: 10.0 };
        assert_eq!(nice_max_percent(&[13.1, 11.2, 9.1, 7.8], &rent), 15.5);
    }

    #[test]
    fn test_percent_bound_covers_data_with_low_headroom() {
        let axis = PercentAxis { headroom: 0.5, step: 0.5, min: 0.0 };
        assert!(nice_max_percent(&[7.3], &axis) >= 7.3);
    }

    #[test]
    fn test_percent_bound_monotonic() {
        let axis = PercentAxis::default();
        let mut prev = 0.0;
        for i in 0..200 {
            let v = i as f64 * 0.37;
            let bound = nice_max_percent(&[1.0, v], &axis);
            assert!(bound >= prev, "bound dropped at {}", v);
            assert!(bound >= v);
            prev = bound;
        }
    }

    // ==========================================================================
    // CURRENCY BOUNDS
    // ==========================================================================

    #[test]
    fn test_gbp_bounds_rail() {
        let axis = CurrencyAxis { pad: 300.0, step: 250.0 };
        let b = nice_bounds_gbp(&[6784.0, 6124.0, 6124.0, 3724.0], &axis).unwrap();
        assert_eq!(b, Bounds { min: 3250.0, max: 7250.0 });
    }

    #[test]
    fn test_gbp_bounds_council_tax() {
        let axis = CurrencyAxis { pad: 60.0, step: 10.0 };
        let b = nice_bounds_gbp(&[2103.76, 2077.98, 2008.56, 1898.91], &axis).unwrap();
        assert_eq!(b, Bounds { min: 1830.0, max: 2170.0 });
    }

    #[test]
    fn test_gbp_bounds_never_collapse_without_padding() {
        let axis = CurrencyAxis { pad: 0.0, step: 250.0 };
        let b = nice_bounds_gbp(&[1000.0], &axis).unwrap();
        assert_eq!(b, Bounds { min: 1000.0, max: 1250.0 });

        let b = nice_bounds_gbp(&[500.0, 500.0], &CurrencyAxis { pad: 0.0, step: 0.0 }).unwrap();
        assert!(b.min <= 500.0 && b.max >= 500.0 && b.max > b.min);
    }

    #[test]
    fn test_percent_bound_all_zero_series() {
        let axis = PercentAxis { headroom: 1.2, step: 0.5, min: 0.0 };
        assert_eq!(nice_max_percent(&[0.0, 0.0], &axis), 0.5);
    }

    #[test]
    fn test_gbp_bounds_empty_series() {
        assert_eq!(nice_bounds_gbp(&[], &CurrencyAxis::default()), None);
    }

    #[test]
    fn test_gbp_bounds_monotonic() {
        let axis = CurrencyAxis::default();
        let mut prev_max = f64::NEG_INFINITY;
        for i in 0..100 {
            let v = 1000.0 + i as f64 * 37.5;
            let b = nice_bounds_gbp(&[900.0, v], &axis).unwrap();
            assert!(b.max >= prev_max);
            assert!(b.min <= 900.0 && b.max >= v);
            prev_max = b.max;
        }
    }

    // ==========================================================================
    // SERIES CHECKS
    // ==========================================================================

    #[test]
    fn test_series_rejects_length_mismatch() {
        let err = ChartSeries::new("x", vec!["A".into()], vec![1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("1 labels but 2 values"));
    }

    #[test]
    fn test_series_rejects_duplicate_labels() {
        let err = ChartSeries::from_pairs("x", &[("A", 1.0), ("A", 2.0)]).unwrap_err();
        assert!(err.to_string().contains("duplicate label 'A'"));
    }

    #[test]
    fn test_series_rejects_nan() {
        assert!(ChartSeries::from_pairs("x", &[("A", f64::NAN)]).is_err());
    }

    #[test]
    fn test_sorted_descending() {
        let s = ChartSeries::from_pairs("ct", &[("Medway", 2008.56), ("Gravesham", 2103.76), ("Thurrock", 1898.91)])
            .unwrap()
            .sorted_descending();
        assert_eq!(s.labels(), &["Gravesham", "Medway", "Thurrock"]);
    }

    // ==========================================================================
    // GAP VS AVERAGE
    // ==========================================================================

    #[test]
    fn test_gap_vs_average() {
        let housing = ChartSeries::from_pairs(
            "h",
            &[("Medway", 2.5), ("Thurrock", 2.6), ("Dartford", 3.0), ("Gravesham", 4.4)],
        )
        .unwrap();
        let gap = housing.gap_vs_average("Medway").unwrap();
        assert_eq!(Unit::Percent.format_gap(gap), "-0.8pp");

        let rent = ChartSeries::from_pairs(
            "r",
            &[("Medway", 13.1), ("Dartford", 11.2), ("Gravesham", 9.1), ("Thurrock", 7.8)],
        )
        .unwrap();
        assert_eq!(Unit::Percent.format_gap(rent.gap_vs_average("Medway").unwrap()), "+3.7pp");

        assert_eq!(Unit::Gbp.format_gap(1459.0), "+£1,459");
        assert_eq!(Unit::Gbp.format_gap(-20.0), "-£20");
        assert_eq!(ChartSeries::from_pairs("one", &[("Medway", 1.0)]).unwrap().gap_vs_average("Medway"), None);
        assert_eq!(rent.gap_vs_average("Swale"), None);

        // subject need not be the first bar
        let ct = ChartSeries::from_pairs(
            "ct",
            &[("Gravesham", 2103.76), ("Dartford", 2077.98), ("Medway", 2008.56), ("Thurrock", 1898.91)],
        )
        .unwrap();
        assert_eq!(Unit::Gbp.format_gap(ct.gap_vs_average("Medway").unwrap()), "-£18");
    }

    #[test]
    fn test_unit_formatters() {
        assert_eq!(Unit::Percent.format(6.0), "6%");
        assert_eq!(Unit::Percent.format(4.4), "4.4%");
        assert_eq!(Unit::Gbp.format(6784.0), "£6,784");
    }
}
