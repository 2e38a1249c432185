//! Evidence data model
//!
//! Two shapes of the same data live here:
//!
//! - [`EvidenceItem`]: the structured, numeric-friendly form authored in
//!   [`data`]. Measures carry real numbers, units and period tags.
//! - [`EvidenceRecord`]: the flat, display-ready row consumed by the table
//!   renderer and the CSV export. Built from an item by [`format`].
//!
//! Both are immutable once constructed; sorting and filtering only ever
//! produce views over them.

pub mod data;
pub mod format;

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Visual grouping of a record. Display order is fixed: cost, workforce,
/// supporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Cost,
    Workforce,
    Supporting,
}

impl Group {
    pub const ORDER: [Group; 3] = [Group::Cost, Group::Workforce, Group::Supporting];

    /// Bucket position used by the table sort.
    pub fn index(self) -> usize {
        match self {
            Group::Cost => 0,
            Group::Workforce => 1,
            Group::Supporting => 2,
        }
    }

    /// Heading shown above the first row of the group.
    pub fn label(self) -> &'static str {
        match self {
            Group::Cost => "Cost pressures (housing, rent, tax, travel)",
            Group::Workforce => "Workforce pressures (turnover, vacancy)",
            Group::Supporting => "Supporting evidence (catchment, policy, context)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Cost => "cost",
            Group::Workforce => "workforce",
            Group::Supporting => "supporting",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author-supplied display tag. Carries no numeric meaning beyond the
/// ordering rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Improving,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Improving => "improving",
        }
    }
}

/// Ranking used when the table is sorted by domain. Unknown sorts last.
pub fn severity_rank(severity: Option<Severity>) -> i8 {
    match severity {
        Some(Severity::High) => 3,
        Some(Severity::Medium) => 2,
        Some(Severity::Improving) => 1,
        Some(Severity::Low) => 0,
        None => -1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Steady,
}

/// Reporting periods shared by the cost and workforce indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Hpi,
    RentYoy,
    Fares2025,
    CouncilTax2324,
    Workforce12m,
}

impl Period {
    pub fn short(self) -> &'static str {
        match self {
            Period::Hpi => "Dec 2024",
            Period::RentYoy => "Jan 2025 vs Jan 2024",
            Period::Fares2025 => "2025 standard annual",
            Period::CouncilTax2324 => "2023/24",
            Period::Workforce12m => "Latest 12m",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Hpi => "to Dec-2024",
            Period::RentYoy => "Jan-2025 vs Jan-2024",
            Period::Fares2025 => "Checked 2025 standard annual",
            Period::CouncilTax2324 => "2023/24",
            Period::Workforce12m => "Most recent 12 months",
        }
    }
}

/// Subject-locality measure, tagged by how it is displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measure {
    Percent {
        value: f64,
        #[serde(default)]
        approx: bool,
        period: Option<Period>,
    },
    /// Year-on-year percent plus a GBP level.
    Mixed {
        yoy: f64,
        level: f64,
        period: Option<Period>,
    },
    Currency {
        value: f64,
        route: Option<String>,
        period: Option<Period>,
    },
    RangePercent {
        from: f64,
        to: f64,
    },
}

impl Measure {
    /// Percent-typed measures format comparators as percentages.
    pub fn is_percent_like(&self) -> bool {
        !matches!(self, Measure::Currency { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparator {
    pub area: String,
    pub value: f64,
    /// Pre-formatted range used verbatim in place of `value`, e.g. "10–12%".
    #[serde(default)]
    pub approx_range: Option<String>,
}

impl Comparator {
    pub fn new(area: &str, value: f64) -> Self {
        Self { area: area.to_string(), value, approx_range: None }
    }
}

/// Structured evidence datapoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub key: String,
    pub group: Group,
    pub severity: Severity,
    pub domain: String,
    pub medway: Measure,
    pub trend: Trend,
    pub comparators: Vec<Comparator>,
    pub why: String,
}

/// Flat display row. `group` and `severity` are optional: rows authored
/// without them (or with unknown tags) still render, in the supporting
/// bucket and with the lowest severity rank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub key: String,
    pub domain: String,
    #[serde(default, deserialize_with = "lenient_tag")]
    pub group: Option<Group>,
    #[serde(default, deserialize_with = "lenient_tag")]
    pub severity: Option<Severity>,
    pub medway: String,
    pub comparators: String,
    pub why: String,
    /// Authored direction hint, used when severity does not decide the pill.
    #[serde(default, deserialize_with = "lenient_tag")]
    pub trend: Option<Trend>,
}

impl EvidenceRecord {
    /// Group used for bucketing; unrecognised groups fall into supporting.
    pub fn resolved_group(&self) -> Group {
        self.group.unwrap_or(Group::Supporting)
    }
}

impl From<&EvidenceItem> for EvidenceRecord {
    fn from(item: &EvidenceItem) -> Self {
        Self {
            key: item.key.clone(),
            domain: item.domain.clone(),
            group: Some(item.group),
            severity: Some(item.severity),
            medway: format::medway_for_table(&item.medway),
            comparators: format::comparators_for_table(item),
            why: item.why.clone(),
            trend: Some(item.trend),
        }
    }
}

/// Flatten structured items into table rows, preserving order.
pub fn records_from_items(items: &[EvidenceItem]) -> Vec<EvidenceRecord> {
    items.iter().map(EvidenceRecord::from).collect()
}

/// Read display rows from a JSON array, keeping file order.
pub fn load_records(path: &Path) -> Result<Vec<EvidenceRecord>> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<EvidenceRecord> = serde_json::from_str(&contents)?;
    tracing::info!(count = records.len(), path = %path.display(), "loaded evidence rows");
    Ok(records)
}

// Unknown strings become `None` instead of failing the whole document.
fn lenient_tag<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}
