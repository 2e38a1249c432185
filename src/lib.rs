//! hcas-evidence - Render the Medway HCAS evidence site
//!
//! Builds a self-contained page arguing for a High Cost Area Supplement for
//! Medway: a side-by-side evidence table against the fringe comparators,
//! bar charts of the cost indicators, and the sources behind every figure.
//!
//! # Overview
//!
//! Everything on the page is derived from literal datasets in
//! [`evidence::data`]. Two renderers do the work:
//!
//! 1. **Evidence table** ([`table`]): sorts records within fixed groups
//!    (cost, workforce, supporting), filters on free text, derives gap and
//!    trend chips, and exports the visible view as CSV with a BOM.
//!
//! 2. **Chart builder** ([`chart`]): turns labels and values into a
//!    declarative Chart.js bar spec with rounded axis bounds, unit-aware
//!    formatters and an end-of-bar label overlay that stays in the plot area.
//!
//! # Quick Start
//!
//! ```no_run
//! use hcas_evidence::{Config, Site};
//!
//! let config = Config::load(None)?;
//! let site = Site::from_config(&config)?;
//! let summary = hcas_evidence::report::build(&site, &config.output.dir, false)?;
//! println!("wrote {} files", summary.files.len());
//! # Ok::<(), hcas_evidence::Error>(())
//! ```
//!
//! # Axis bounds
//!
//! | Unit | Rule |
//! |------|------|
//! | Percent | `max(min, max_value * headroom)` rounded up to `step`, from 0 |
//! | GBP | `[min - pad, max + pad]` widened outwards to `step` |
//!
//! # Modules
//!
//! - [`evidence`]: data model, literal datasets and value formatting
//! - [`table`]: sort, filter, chips and CSV export
//! - [`chart`]: axis bounds, chart specs, end labels, surfaces and SVG
//! - [`sources`]: sources & methods, verification checklist and copy flow
//! - [`report`]: HTML, JSON and CSV output
//! - [`serve`]: local preview server

pub mod chart;
pub mod config;
pub mod error;
pub mod evidence;
pub mod report;
pub mod serve;
pub mod sources;
pub mod table;

pub use chart::spec::ChartSpec;
pub use chart::{ChartConfig, ChartSeries, Unit};
pub use config::Config;
pub use error::{Error, Result};
pub use evidence::{EvidenceRecord, Group, Severity};
pub use report::Site;
pub use table::{SortDir, SortKey, TableState};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is reachable from the crate
    // root.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        let _: Group = Group::Cost;
        let _: Severity = Severity::High;
        let state = TableState::default();
        assert_eq!(state.sort_by, SortKey::Domain);
        assert_eq!(state.sort_dir, SortDir::Asc);
    }

    #[test]
    fn test_site_builds_from_defaults() {
        let site = Site::from_config(&Config::default()).unwrap();
        let specs: Vec<ChartSpec> = site.chart_specs();
        assert_eq!(specs.len(), site.cards.len());
        assert!(specs.iter().all(|s| s.kind == "bar"));
    }

    #[test]
    fn test_unit_variants() {
        assert_eq!(Unit::Percent.format(3.0), "3%");
        assert_eq!(Unit::Gbp.format(7250.0), "£7,250");
    }
}
