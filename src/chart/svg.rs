//! Static SVG rendering of a chart spec
//!
//! Used for the `--svg` build output and as the no-JavaScript fallback on
//! the page. Bars, value-axis ticks and end labels come from the same spec
//! the browser gets.

use super::overlay::{self, BarEnd, PlotArea, TextMeasure};
use super::spec::ChartSpec;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgSize {
    pub width: f64,
    pub height: f64,
}

impl Default for SvgSize {
    fn default() -> Self {
        Self { width: 560.0, height: 300.0 }
    }
}

const CATEGORY_GUTTER: f64 = 150.0;
const TICK_GUTTER: f64 = 24.0;
const EDGE: f64 = 8.0;

pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn value_range(spec: &ChartSpec) -> (f64, f64) {
    let scale = spec.value_scale();
    let values = spec.values();
    let data_max = values.iter().copied().fold(0.0, f64::max);
    let min = scale.min.unwrap_or(0.0);
    let max = scale.max.unwrap_or(data_max);
    if max > min {
        (min, max)
    } else {
        (min, min + 1.0)
    }
}

fn ticks(spec: &ChartSpec, min: f64, max: f64) -> Vec<f64> {
    let step = spec
        .value_scale()
        .ticks
        .step_size
        .unwrap_or((max - min) / 5.0);
    if step <= 0.0 {
        return vec![min, max];
    }
    let mut out = Vec::new();
    let mut i = 0.0;
    loop {
        let v = min + step * i;
        if v > max + step * 1e-6 {
            break;
        }
        out.push(v);
        i += 1.0;
    }
    out
}

pub fn render(spec: &ChartSpec, size: SvgSize, measure: &dyn TextMeasure) -> String {
    let horizontal = spec.is_horizontal();
    let area = if horizontal {
        PlotArea {
            left: CATEGORY_GUTTER,
            top: EDGE,
            right: size.width - EDGE,
            bottom: size.height - TICK_GUTTER,
        }
    } else {
        PlotArea {
            left: 72.0,
            top: EDGE * 2.0,
            right: size.width - EDGE,
            bottom: size.height - TICK_GUTTER,
        }
    };

    let (min, max) = value_range(spec);
    let values = spec.values();
    let colors = spec
        .data
        .datasets
        .first()
        .map(|d| d.background_color.clone())
        .unwrap_or_default();
    let bar_thickness = spec.data.datasets.first().and_then(|d| d.bar_thickness);
    let radius = spec.data.datasets.first().map(|d| d.border_radius).unwrap_or(0);

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="{title}" font-family="system-ui, -apple-system, Segoe UI, Roboto, Arial" font-size="12">"#,
        w = size.width,
        h = size.height,
        title = escape(&spec.title),
    );
    let _ = write!(out, "<title>{}</title>", escape(&spec.title));

    // value-axis grid and ticks
    for tick in ticks(spec, min, max) {
        let label = escape(&spec.unit.format(tick));
        let frac = (tick - min) / (max - min);
        if horizontal {
            let x = area.left + frac * area.width();
            let _ = write!(
                out,
                r#"<line x1="{x:.1}" y1="{t:.1}" x2="{x:.1}" y2="{b:.1}" stroke="{grid}"/><text x="{x:.1}" y="{ty:.1}" text-anchor="middle" fill="{tc}">{label}</text>"#,
                t = area.top,
                b = area.bottom,
                ty = area.bottom + 16.0,
                grid = super::spec::GRID_COLOR,
                tc = super::spec::TICK_COLOR,
            );
        } else {
            let y = area.bottom - frac * area.height();
            let _ = write!(
                out,
                r#"<line x1="{l:.1}" y1="{y:.1}" x2="{r:.1}" y2="{y:.1}" stroke="{grid}"/><text x="{tx:.1}" y="{y:.1}" text-anchor="end" dominant-baseline="middle" fill="{tc}">{label}</text>"#,
                l = area.left,
                r = area.right,
                tx = area.left - 6.0,
                grid = super::spec::GRID_COLOR,
                tc = super::spec::TICK_COLOR,
            );
        }
    }

    let n = values.len().max(1) as f64;
    let mut ends = Vec::with_capacity(values.len());
    for (i, (label, value)) in spec.data.labels.iter().zip(values).enumerate() {
        let color = colors.get(i).map(String::as_str).unwrap_or(super::NHS_BLUE);
        let frac = ((value - min) / (max - min)).clamp(0.0, 1.0);

        if horizontal {
            let band = area.height() / n;
            let thick = bar_thickness.map(f64::from).unwrap_or(band * 0.6).min(band);
            let cy = area.top + band * (i as f64 + 0.5);
            let len = frac * area.width();
            let rx = f64::from(radius).min(thick / 2.0);
            let _ = write!(
                out,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{len:.1}" height="{thick:.1}" rx="{rx:.1}" fill="{color}"/><text x="{lx:.1}" y="{cy:.1}" text-anchor="end" dominant-baseline="middle" fill="{tc}">{label}</text>"#,
                x = area.left,
                y = cy - thick / 2.0,
                lx = area.left - 8.0,
                tc = super::spec::TICK_COLOR,
                label = escape(label),
            );
            ends.push(BarEnd { x: area.left + len, center_y: cy });
        } else {
            let band = area.width() / n;
            let thick = bar_thickness.map(f64::from).unwrap_or(band * 0.6).min(band);
            let cx = area.left + band * (i as f64 + 0.5);
            let len = frac * area.height();
            let rx = f64::from(radius).min(thick / 2.0);
            let _ = write!(
                out,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{thick:.1}" height="{len:.1}" rx="{rx:.1}" fill="{color}"/><text x="{cx:.1}" y="{ly:.1}" text-anchor="middle" fill="{tc}">{label}</text>"#,
                x = cx - thick / 2.0,
                y = area.bottom - len,
                ly = area.bottom + 16.0,
                tc = super::spec::TICK_COLOR,
                label = escape(label),
            );
        }
    }

    if spec.end_labels.enabled {
        let placed = overlay::layout_end_labels(&ends, &spec.end_labels.text, &area, measure, spec.end_labels.padding);
        for label in placed {
            let _ = write!(
                out,
                r#"<text class="end-label" x="{x:.1}" y="{y:.1}" dominant-baseline="middle" fill="{c}">{t}</text>"#,
                x = label.x,
                y = label.y,
                c = spec.end_labels.color,
                t = escape(&label.text),
            );
        }
    }

    out.push_str("</svg>");
    out
}
