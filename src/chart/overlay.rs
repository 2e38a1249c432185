//! End-of-bar value labels
//!
//! Each label sits [`LABEL_PADDING`] past the end of its bar. When that would
//! run past the plot area it is shifted left until it ends [`EDGE_INSET`]
//! inside the right edge, and it never starts closer than [`EDGE_INSET`] to
//! the left edge. Labels are moved, never clipped or dropped.

pub const LABEL_PADDING: f64 = 8.0;
pub const EDGE_INSET: f64 = 2.0;
pub const LABEL_COLOR: &str = "#1f2937";
pub const LABEL_FONT: &str = "12px system-ui, -apple-system, Segoe UI, Roboto, Arial";

/// Text width in the same units as the plot area.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f64;
}

/// Fixed advance per character. Good enough for short numeric labels.
#[derive(Debug, Clone, Copy)]
pub struct CharWidth(pub f64);

impl Default for CharWidth {
    fn default() -> Self {
        // average advance of a 12px sans-serif digit
        CharWidth(7.0)
    }
}

impl TextMeasure for CharWidth {
    fn width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Left x of a label of `label_width` for a bar ending at `bar_end`.
pub fn place_end_label(bar_end: f64, label_width: f64, area: &PlotArea, padding: f64) -> f64 {
    let desired = bar_end + padding;
    let clamped = desired.min(area.right - label_width - EDGE_INSET);
    clamped.max(area.left + EDGE_INSET)
}

/// Where a horizontal bar ends and where its label's baseline centre goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarEnd {
    pub x: f64,
    pub center_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

pub fn layout_end_labels(
    bars: &[BarEnd],
    texts: &[String],
    area: &PlotArea,
    measure: &dyn TextMeasure,
    padding: f64,
) -> Vec<PlacedLabel> {
    bars.iter()
        .zip(texts)
        .map(|(bar, text)| {
            let width = measure.width(text);
            PlacedLabel {
                text: text.clone(),
                x: place_end_label(bar.x, width, area, padding),
                y: bar.center_y,
                width,
            }
        })
        .collect()
}
