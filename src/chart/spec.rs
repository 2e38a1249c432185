//! Declarative Chart.js bar-chart specification
//!
//! Serialises to the `{type, data, options}` shape Chart.js expects, plus a
//! few extra top-level keys the page bootstrap reads:
//!
//! - `unit`: which shared formatter to attach to the value-axis ticks
//! - `tooltips`: pre-formatted tooltip text, one per bar
//! - `endLabels`: pre-formatted end-of-bar labels and overlay settings
//!
//! Chart.js ignores keys it does not know, so the same object is passed
//! straight to `new Chart(canvas, spec)`.

use super::overlay::{LABEL_COLOR, LABEL_FONT, LABEL_PADDING};
use super::{ChartConfig, Orientation, Unit};
use crate::error::Result;
use serde::Serialize;

pub const GRID_COLOR: &str = "rgba(0,0,0,0.06)";
pub const TICK_COLOR: &str = "#111827";
pub const ANIMATION_MS: u32 = 450;

/// Most ticks the value axis should carry.
const MAX_TICKS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
    pub unit: Unit,
    pub tooltips: Vec<String>,
    pub end_labels: EndLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub border_radius: u32,
    pub border_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_thickness: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub index_axis: &'static str,
    pub layout: Layout,
    pub scales: Scales,
    pub plugins: Plugins,
    pub animation: Animation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Scale,
    pub y: Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub grid: Grid,
    pub ticks: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndLabels {
    pub enabled: bool,
    pub padding: f64,
    pub color: &'static str,
    pub font: &'static str,
    pub text: Vec<String>,
}

/// Step between value-axis ticks: a multiple of the configured step that
/// keeps the tick count at or under [`MAX_TICKS`].
pub fn tick_step(min: f64, max: f64, step: f64) -> Option<f64> {
    if step <= 0.0 || max <= min {
        return None;
    }
    let intervals = ((max - min) / step).round();
    let multiple = (intervals / MAX_TICKS).ceil().max(1.0);
    Some(step * multiple)
}

impl ChartSpec {
    pub fn from_config(config: &ChartConfig) -> Self {
        let unit = config.unit();
        let values = config.series.values().to_vec();
        let labels = config.series.labels().to_vec();
        let bounds = config.bounds();

        let value_scale = Scale {
            begin_at_zero: Some(unit == Unit::Percent),
            min: bounds.map(|b| b.min),
            max: bounds.map(|b| b.max),
            grid: Grid { display: true, color: Some(GRID_COLOR) },
            ticks: Ticks {
                color: TICK_COLOR,
                step_size: bounds.and_then(|b| tick_step(b.min, b.max, config.axis.step())),
            },
        };
        let category_scale = Scale {
            begin_at_zero: None,
            min: None,
            max: None,
            grid: Grid { display: false, color: None },
            ticks: Ticks { color: TICK_COLOR, step_size: None },
        };

        let horizontal = config.orientation == Orientation::Horizontal;
        let scales = if horizontal {
            Scales { x: value_scale, y: category_scale }
        } else {
            Scales { x: category_scale, y: value_scale }
        };

        let tooltips = labels
            .iter()
            .zip(&values)
            .map(|(label, v)| format!("{}: {}", label, unit.format(*v)))
            .collect();
        let end_text = values.iter().map(|v| unit.format(*v)).collect();

        tracing::debug!(
            chart = %config.id,
            bars = values.len(),
            max = ?bounds.map(|b| b.max),
            "built chart spec"
        );

        Self {
            id: config.id.clone(),
            title: config.title.clone(),
            kind: "bar",
            data: ChartData {
                labels,
                datasets: vec![Dataset {
                    label: config.title.clone(),
                    data: values,
                    background_color: config.bar_colors(),
                    border_radius: config.border_radius,
                    border_width: 0,
                    bar_thickness: config.bar_thickness,
                }],
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: false,
                index_axis: if horizontal { "y" } else { "x" },
                layout: Layout { padding: 8 },
                scales,
                plugins: Plugins {
                    legend: Legend { display: false },
                    tooltip: Tooltip { enabled: true },
                },
                animation: Animation { duration: ANIMATION_MS },
            },
            unit,
            tooltips,
            end_labels: EndLabels {
                // vertical charts read their values off the axis
                enabled: horizontal,
                padding: LABEL_PADDING,
                color: LABEL_COLOR,
                font: LABEL_FONT,
                text: end_text,
            },
        }
    }

    /// The value axis, whichever of x/y it is.
    pub fn value_scale(&self) -> &Scale {
        if self.options.index_axis == "y" {
            &self.options.scales.x
        } else {
            &self.options.scales.y
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.options.index_axis == "y"
    }

    pub fn values(&self) -> &[f64] {
        self.data.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[])
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AxisOptions, ChartSeries, CurrencyAxis, PercentAxis};

    fn housing() -> ChartConfig {
        let series = ChartSeries::from_pairs(
            "housing",
            &[("Medway", 2.5), ("Thurrock", 2.6), ("Dartford", 3.0), ("Gravesham", 4.4)],
        )
        .unwrap();
        ChartConfig::new(
            "housing",
            "YoY Growth (%)",
            series,
            AxisOptions::Percent(PercentAxis { headroom: 1.35, step: 0.5, min: 5.0 }),
        )
    }

    #[test]
    fn test_horizontal_percent_spec() {
        let spec = housing().build();
        assert_eq!(spec.kind, "bar");
        assert_eq!(spec.options.index_axis, "y");
        assert_eq!(spec.unit, Unit::Percent);
        assert_eq!(spec.value_scale().max, Some(6.0));
        assert_eq!(spec.value_scale().begin_at_zero, Some(true));
        assert_eq!(spec.value_scale().grid.color, Some(GRID_COLOR));
        assert!(!spec.options.scales.y.grid.display);
        assert!(!spec.options.plugins.legend.display);
        assert_eq!(spec.options.animation.duration, 450);
    }

    #[test]
    fn test_tooltips_and_end_labels_share_tick_format() {
        let spec = housing().build();
        assert_eq!(spec.tooltips[2], "Dartford: 3%");
        assert_eq!(spec.end_labels.text, vec!["2.5%", "2.6%", "3%", "4.4%"]);
        assert!(spec.end_labels.enabled);
        assert_eq!(spec.end_labels.padding, 8.0);
    }

    #[test]
    fn test_vertical_gbp_spec() {
        let series =
            ChartSeries::from_pairs("levels", &[("Medway", 321665.0), ("Dartford", 379675.0), ("Thurrock", 314000.0)])
                .unwrap();
        let mut config = ChartConfig::new("levels", "Average house price (£)", series, AxisOptions::Gbp(CurrencyAxis::default()));
        config.orientation = Orientation::Vertical;
        let spec = config.build();

        assert_eq!(spec.options.index_axis, "x");
        assert_eq!(spec.value_scale().min, Some(313750.0));
        assert_eq!(spec.value_scale().max, Some(380000.0));
        assert_eq!(spec.tooltips[0], "Medway: £321,665");
        assert!(!spec.end_labels.enabled);
    }

    #[test]
    fn test_tick_step_keeps_tick_count_small() {
        assert_eq!(tick_step(0.0, 6.0, 0.5), Some(1.0));
        assert_eq!(tick_step(0.0, 2.0, 0.5), Some(0.5));
        assert_eq!(tick_step(3250.0, 7250.0, 250.0), Some(750.0));
        assert_eq!(tick_step(0.0, 1.0, 0.0), None);
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&housing().build().to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["options"]["indexAxis"], "y");
        assert_eq!(json["options"]["maintainAspectRatio"], false);
        assert_eq!(json["options"]["scales"]["x"]["beginAtZero"], true);
        assert_eq!(json["data"]["datasets"][0]["backgroundColor"][0], "#005EB8");
        assert_eq!(json["endLabels"]["text"][3], "4.4%");
        assert!(json["data"]["datasets"][0].get("barThickness").is_none());
    }

    // ==========================================================================
    // IDEMPOTENT REBUILD
    // ==========================================================================

    #[test]
    fn test_same_config_builds_identical_spec() {
        let config = housing();
        assert_eq!(config.build(), config.build());
        assert_eq!(config.build().to_json().unwrap(), config.build().to_json().unwrap());
    }
}
