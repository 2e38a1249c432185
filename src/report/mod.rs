//! Site generation
//!
//! Output formatters for the evidence site:
//!
//! - **HTML**: the full page, with sortable table, Chart.js cards and the
//!   sources section
//! - **JSON**: rows, chart specs, sources and checklist for programmatic use
//! - **CSV**: the table export, as downloaded from the page
//!
//! # Usage
//!
//! ```ignore
//! use hcas_evidence::report::{self, Site};
//!
//! let site = Site::from_config(&config)?;
//! // Automatically picks format based on extension
//! report::generate("index.html", &site)?;  // HTML
//! report::generate("site.json", &site)?;   // JSON
//! report::generate("table.csv", &site)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::chart::cards::{self, MetricCard};
use crate::chart::spec::ChartSpec;
use crate::chart::surface;
use crate::chart::svg::SvgSize;
use crate::config::Config;
use crate::error::Result;
use crate::evidence::{self, data, EvidenceRecord};
use crate::sources::{EvidencePackAction, Source, VerifyStep};
use crate::table::csv::CSV_FILENAME;
use crate::table::{GroupCounts, TableOptions, TableState};
use chrono::Local;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Everything one page render needs.
#[derive(Debug, Clone)]
pub struct Site {
    pub title: String,
    pub generated: String,
    pub records: Vec<EvidenceRecord>,
    pub table: TableOptions,
    pub cards: Vec<MetricCard>,
    pub sources: Vec<Source>,
    pub verify_steps: Vec<VerifyStep>,
    pub evidence_pack: EvidencePackAction,
}

impl Site {
    pub fn from_config(config: &Config) -> Result<Self> {
        let cards = config.apply_chart_overrides(cards::all()?)?;
        let records = match &config.site.evidence {
            Some(path) => evidence::load_records(path)?,
            None => data::evidence_rows(),
        };
        Ok(Self {
            title: config.site.title.clone(),
            generated: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            records,
            table: config.table.clone(),
            cards,
            sources: data::sources(),
            verify_steps: data::verify_steps(),
            evidence_pack: EvidencePackAction::from_url(config.site.evidence_pack_url.as_deref()),
        })
    }

    pub fn counts(&self) -> GroupCounts {
        GroupCounts::from_records(&self.records)
    }

    /// Initial table state; the page starts sorted by domain ascending.
    pub fn table_state(&self) -> TableState {
        TableState::new(self.table.sortable)
    }

    pub fn chart_specs(&self) -> Vec<ChartSpec> {
        self.cards.iter().map(|c| c.config.build()).collect()
    }
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, site: &Site) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = BufWriter::new(File::create(path)?);

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, site),
        "json" => json::write(&mut file, site),
        _ => csv::write(&mut file, site),
    }
}

/// Files written by [`build`].
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub files: Vec<PathBuf>,
    pub rows: usize,
    pub charts: usize,
}

/// Write `index.html`, the CSV export and `charts.json` into `out_dir`,
/// plus one `<chart-id>.svg` per chart when `svg` is set.
pub fn build(site: &Site, out_dir: &Path, svg: bool) -> Result<BuildSummary> {
    std::fs::create_dir_all(out_dir)?;
    let mut summary = BuildSummary {
        rows: site.records.len(),
        charts: site.cards.len(),
        ..Default::default()
    };

    for name in ["index.html", CSV_FILENAME] {
        let path = out_dir.join(name);
        generate(&path, site)?;
        tracing::info!(path = %path.display(), "wrote");
        summary.files.push(path);
    }

    let charts_path = out_dir.join("charts.json");
    let specs = site.chart_specs();
    std::fs::write(&charts_path, serde_json::to_string_pretty(&specs)?)?;
    tracing::info!(path = %charts_path.display(), charts = specs.len(), "wrote");
    summary.files.push(charts_path);

    if svg {
        for spec in &specs {
            let path = out_dir.join(format!("{}.svg", spec.id));
            std::fs::write(&path, surface::render_svg(spec, SvgSize::default())?)?;
            tracing::debug!(path = %path.display(), "wrote svg");
            summary.files.push(path);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site::from_config(&Config::default()).unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hcas-evidence-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    // ==========================================================================
    // SITE ASSEMBLY TESTS
    // ==========================================================================

    #[test]
    fn test_site_defaults() {
        let site = site();
        assert_eq!(site.records.len(), 6);
        assert_eq!(site.cards.len(), 5);
        assert_eq!(site.evidence_pack, EvidencePackAction::Disabled);
        assert!(site.table_state().sortable);
        assert_eq!(site.counts().cost, 4);
    }

    #[test]
    fn test_site_reads_evidence_rows_from_config_path() {
        let dir = temp_dir("rows");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rows.json");
        std::fs::write(
            &path,
            r#"[{"key": "flows", "domain": "Patient flows", "group": "catchment",
                 "medway": "", "comparators": "", "why": "Shared catchment"}]"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.site.evidence = Some(path);
        let site = Site::from_config(&config).unwrap();
        assert_eq!(site.records.len(), 1);
        assert_eq!(site.counts().supporting, 1);

        config.site.evidence = Some(dir.join("missing.json"));
        assert!(Site::from_config(&config).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_chart_specs_follow_card_order() {
        let ids: Vec<String> = site().chart_specs().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["housing", "rent", "rail", "council-tax", "house-prices"]);
    }

    // ==========================================================================
    // OUTPUT TESTS
    // ==========================================================================

    #[test]
    fn test_generate_picks_format_by_extension() {
        let dir = temp_dir("generate");
        std::fs::create_dir_all(&dir).unwrap();
        let site = site();

        generate(dir.join("page.html"), &site).unwrap();
        generate(dir.join("site.json"), &site).unwrap();
        generate(dir.join("table.csv"), &site).unwrap();

        let html = std::fs::read_to_string(dir.join("page.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("site.json")).unwrap()).unwrap();
        assert_eq!(json["rows"].as_array().unwrap().len(), 6);
        let csv = std::fs::read(dir.join("table.csv")).unwrap();
        assert!(csv.starts_with("\u{feff}Domain,".as_bytes()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_writes_all_outputs() {
        let dir = temp_dir("build");
        let summary = build(&site(), &dir, true).unwrap();

        assert_eq!(summary.files.len(), 3 + 5);
        assert!(dir.join("index.html").exists());
        assert!(dir.join("evidence_at_a_glance.csv").exists());
        assert!(dir.join("charts.json").exists());
        assert!(dir.join("council-tax.svg").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
