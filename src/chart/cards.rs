//! Cost metric cards
//!
//! Each card pairs a chart config with the KPI header, the gap chip and the
//! narrative shown around it on the page.

use super::{AxisOptions, ChartConfig, ChartSeries, CurrencyAxis, Orientation, PercentAxis};
use crate::error::{Error, Result};
use crate::table::chips::Tone;
use serde::Serialize;

/// Locality every comparison is made against.
pub const SUBJECT: &str = "Medway";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapBadge {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    /// Bar the gap chip compares against the others.
    pub subject: &'static str,
    pub icon: &'static str,
    pub kpi_label: &'static str,
    pub kpi_value: &'static str,
    pub kpi_detail: &'static str,
    pub gap_prefix: &'static str,
    pub lead: &'static str,
    pub body: &'static str,
    /// Extra label/value lines shown in a collapsible block.
    pub details: Vec<(&'static str, &'static str)>,
    pub aria_label: &'static str,
    pub period_note: &'static str,
    pub sources: Vec<SourceLink>,
    pub config: ChartConfig,
}

impl MetricCard {
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// "Gap vs fringe avg: +3.7pp", computed from the chart series.
    pub fn gap(&self) -> Option<GapBadge> {
        let unit = self.config.unit();
        let delta = self.config.series.gap_vs_average(self.subject)?;
        let text = unit.format_gap(delta);
        let tone = if text.starts_with('+') {
            Tone::Up
        } else if text.starts_with('-') {
            Tone::Down
        } else {
            Tone::Steady
        };
        Some(GapBadge { text: format!("{}: {}", self.gap_prefix, text), tone })
    }

    pub fn with_axis(mut self, axis: AxisOptions) -> Result<Self> {
        if axis.unit() != self.config.unit() {
            return Err(Error::Series {
                id: self.config.id.clone(),
                reason: format!("axis override must stay {:?}", self.config.unit()),
            });
        }
        self.config.axis = axis;
        Ok(self)
    }
}

fn link(label: &str, url: &str) -> SourceLink {
    SourceLink { label: label.to_string(), url: url.to_string() }
}

fn config(id: &str, title: &str, rows: &[(&str, f64, &str)], axis: AxisOptions) -> Result<ChartConfig> {
    let series = ChartSeries::new(
        id,
        rows.iter().map(|(l, _, _)| l.to_string()).collect(),
        rows.iter().map(|(_, v, _)| *v).collect(),
    )?;
    let mut config = ChartConfig::new(id, title, series, axis);
    config.colors = rows.iter().map(|(_, _, c)| c.to_string()).collect();
    config.border_radius = 8;
    config.bar_thickness = Some(18);
    Ok(config)
}

pub fn housing() -> Result<MetricCard> {
    let config = config(
        "housing",
        "YoY Growth (%)",
        &[
            (SUBJECT, 2.5, super::NHS_BLUE),
            ("Thurrock", 2.6, "#0072CE"),
            ("Dartford", 3.0, "#41B6E6"),
            ("Gravesham", 4.4, "#78BE20"),
        ],
        AxisOptions::Percent(PercentAxis { headroom: 1.35, step: 0.5, min: 5.0 }),
    )?;
    Ok(MetricCard {
        subject: SUBJECT,
        icon: "🏠",
        kpi_label: "HOUSING YoY growth (to Dec 2024)",
        kpi_value: "+2.5%",
        kpi_detail: "Close to Thurrock (+2.6%); tracks Dartford/Gravesham trend",
        gap_prefix: "Gap vs fringe avg",
        lead: "Medway's average house price rose by 2.5% to Dec 2024,",
        body: "closely tracking fringe comparators (Thurrock 2.6%, Dartford 3.0%, Gravesham 4.4%). Staff face the same housing inflation trend even though Medway is not paid as a fringe trust.",
        details: Vec::new(),
        aria_label: "Year-on-year house price growth by area (%)",
        period_note: "Period: HPI to Dec-2024.",
        sources: vec![
            link("kent.gov.uk", "https://www.kent.gov.uk"),
            link(
                "UK HPI (ONS/Land Registry)",
                "https://www.gov.uk/government/collections/uk-house-price-index-reports",
            ),
        ],
        config,
    })
}

pub fn rent() -> Result<MetricCard> {
    let config = config(
        "rent",
        "YoY Rent Increase (%)",
        &[
            (SUBJECT, 13.1, super::NHS_BLUE),
            ("Dartford", 11.2, "#41B6E6"),
            ("Gravesham", 9.1, "#78BE20"),
            ("Thurrock", 7.8, "#0072CE"),
        ],
        AxisOptions::Percent(PercentAxis { headroom: 1.15, step: 0.5, min: 10.0 }),
    )?;
    Ok(MetricCard {
        subject: SUBJECT,
        icon: "📈",
        kpi_label: "MEDIAN private rent (Jan 2025)",
        kpi_value: "£1,165",
        kpi_detail: "+13.1% YoY, in fringe-level uplift range",
        gap_prefix: "Gap vs fringe avg",
        lead: "Medway's average monthly private rent rose to £1,165 in January 2025",
        body: "(up 13.1%), above Dartford (11.2%), Gravesham (9.1%), and Thurrock (7.8%). Faster rent growth puts Medway in fringe-level territory and erodes take-home pay without a 5% HCAS.",
        details: vec![
            ("Flats / Maisonettes", "~£959 / month"),
            ("Terraced", "~£1,179 / month"),
            ("Semi-Detached", "~£1,305 / month"),
            ("Detached", "~£1,578 / month"),
        ],
        aria_label: "Year-on-year rent increase by area (%)",
        period_note: "Period: Jan-2025 vs Jan-2024.",
        sources: vec![
            link("ONS Private Rental Market", "https://www.ons.gov.uk"),
            link("kent.gov.uk", "https://www.kent.gov.uk"),
            link("polimapper.co.uk", "https://polimapper.co.uk"),
        ],
        config,
    })
}

pub fn rail() -> Result<MetricCard> {
    let config = config(
        "rail",
        "Annual Season Cost (£)",
        &[
            ("Gillingham (SE)", 6784.0, super::NHS_BLUE),
            ("Dartford (SE)", 6124.0, "#41B6E6"),
            ("Gravesend (SE/HS1)", 6124.0, "#78BE20"),
            ("East Tilbury (c2c)", 3724.0, "#0072CE"),
        ],
        AxisOptions::Gbp(CurrencyAxis { pad: 300.0, step: 250.0 }),
    )?;
    Ok(MetricCard {
        subject: "Gillingham (SE)",
        icon: "🚆",
        kpi_label: "SEASON ticket (SE→London, 2025)",
        kpi_value: "£6,784",
        kpi_detail: "Gillingham to London Terminals, above Dartford/Gravesend and c2c",
        gap_prefix: "Gap vs fringe avg",
        lead: "Annual season ticket from Gillingham (SE) to London Terminals is £6,784,",
        body: "above Dartford/Gravesend (~£6,124) and East Tilbury (c2c ~£3,724). High commuting costs cut take-home competitiveness for Medway staff versus some fringe and Essex routes.",
        details: Vec::new(),
        aria_label: "Annual rail season ticket cost comparison (£)",
        period_note: "Period/prices: 2025 standard annual seasons.",
        sources: vec![
            link("Southeastern", "https://www.southeasternrailway.co.uk"),
            link("c2c", "https://www.c2c-online.co.uk"),
        ],
        config,
    })
}

pub fn council_tax() -> Result<MetricCard> {
    let mut config = config(
        "council-tax",
        "Band D (2023/24)",
        &[
            (SUBJECT, 2008.56, super::NHS_BLUE),
            ("Gravesham", 2103.76, "#78BE20"),
            ("Dartford", 2077.98, "#41B6E6"),
            ("Thurrock", 1898.91, "#0072CE"),
        ],
        AxisOptions::Gbp(CurrencyAxis { pad: 60.0, step: 10.0 }),
    )?;
    sort_bars_descending(&mut config);
    config.border_radius = 999;
    config.bar_thickness = Some(10);
    Ok(MetricCard {
        subject: SUBJECT,
        icon: "🪙",
        kpi_label: "Band D council tax (2023/24)",
        kpi_value: "£2,009",
        kpi_detail: "In line with fringe comparators (Dartford £2,078; Gravesham £2,104)",
        gap_prefix: "Medway vs fringe avg",
        lead: "Council tax adds a fixed cost pressure comparable to nearby fringe authorities.",
        body: "Day-to-day expenses such as groceries and utilities in Medway are broadly in line with national averages. The chart compares Band D Council Tax (2023/24) across Medway and three neighbouring authorities; Band D is a common benchmark for a mid-range home.",
        details: Vec::new(),
        aria_label: "Council Tax Band D comparison across Medway, Dartford, Gravesham and Thurrock (£)",
        period_note: "Period: 2023/24 Band D schedules.",
        sources: vec![link("local.gov.uk", "https://www.local.gov.uk")],
        config,
    })
}

pub fn house_price_levels() -> Result<MetricCard> {
    const EMPHASIS: &str = "rgba(0, 94, 184, 0.85)";
    const MUTED: &str = "rgba(0, 169, 206, 0.7)";
    let mut config = config(
        "house-prices",
        "Average house price (£)",
        &[(SUBJECT, 321665.0, EMPHASIS), ("Dartford", 379675.0, MUTED), ("Thurrock", 314000.0, MUTED)],
        AxisOptions::Gbp(CurrencyAxis::default()),
    )?;
    config.orientation = Orientation::Vertical;
    config.border_radius = 6;
    config.bar_thickness = None;
    Ok(MetricCard {
        subject: SUBJECT,
        icon: "🏘️",
        kpi_label: "Cost comparison: Medway vs fringe comparators",
        kpi_value: "£321,665",
        kpi_detail: "Illustrative values; update with latest validated figures for HPI, rent or other cost indicators.",
        gap_prefix: "Gap vs fringe avg",
        lead: "Average house prices sit between the fringe comparators.",
        body: "Medway is below Dartford and slightly above Thurrock.",
        details: Vec::new(),
        aria_label: "Average house price by area (£)",
        period_note: "HPI, year to Dec 2024.",
        sources: vec![link(
            "ONS UK House Price Index",
            "https://www.gov.uk/government/collections/uk-house-price-index-reports",
        )],
        config,
    })
}

// Colours travel with their bar.
fn sort_bars_descending(config: &mut ChartConfig) {
    let mut bars: Vec<(String, f64, String)> = config
        .series
        .labels()
        .iter()
        .cloned()
        .zip(config.series.values().iter().copied())
        .zip(config.bar_colors())
        .map(|((l, v), c)| (l, v, c))
        .collect();
    bars.sort_by(|a, b| b.1.total_cmp(&a.1));
    config.series = config.series.sorted_descending();
    config.colors = bars.into_iter().map(|(_, _, c)| c).collect();
}

/// Every card, in page order.
pub fn all() -> Result<Vec<MetricCard>> {
    Ok(vec![housing()?, rent()?, rail()?, council_tax()?, house_price_levels()?])
}

pub fn find(id: &str) -> Result<MetricCard> {
    all()?
        .into_iter()
        .find(|c| c.id() == id)
        .ok_or_else(|| Error::UnknownChart(id.to_string()))
}
