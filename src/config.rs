//! Site configuration
//!
//! Read from `hcas-evidence.toml` in the working directory, or the file
//! given with `--config`. Every key is optional; anything missing falls
//! back to the embedded defaults below.

use crate::chart::cards::MetricCard;
use crate::chart::AxisOptions;
use crate::error::{Error, Result};
use crate::table::TableOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "hcas-evidence.toml";

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[site]
title = "Medway HCAS evidence"

[table]
sortable = true
compact = false

[output]
dir = "dist"
"#;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub table: TableOptions,
    pub output: OutputConfig,
    /// Axis overrides keyed by chart id.
    pub charts: BTreeMap<String, AxisOptions>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub evidence_pack_url: Option<String>,
    /// JSON array of evidence rows replacing the built-in dataset.
    pub evidence: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Medway HCAS evidence".to_string(),
            evidence_pack_url: None,
            evidence: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Copied verbatim into the output directory when set.
    pub assets: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("dist"), assets: None }
    }
}

impl Config {
    pub fn from_toml(path: &Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| Error::Config { path: path.to_path_buf(), source })
    }

    /// Load `path`, or the default file when `None`. A missing default
    /// file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (candidate, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !candidate.exists() {
            tracing::debug!("no {} found, using embedded defaults", DEFAULT_CONFIG_FILE);
            return Self::from_toml(Path::new("<embedded>"), DEFAULT_CONFIG);
        }

        tracing::info!("Loading config from: {}", candidate.display());
        let contents = std::fs::read_to_string(&candidate)?;
        Self::from_toml(&candidate, &contents)
    }

    /// Apply `[charts.<id>]` overrides to the page's metric cards.
    pub fn apply_chart_overrides(&self, cards: Vec<MetricCard>) -> Result<Vec<MetricCard>> {
        for id in self.charts.keys() {
            if !cards.iter().any(|c| c.id() == id) {
                tracing::warn!(chart = %id, "config overrides an unknown chart, ignoring");
            }
        }
        cards
            .into_iter()
            .map(|card| match self.charts.get(card.id()) {
                Some(axis) => card.with_axis(*axis),
                None => Ok(card),
            })
            .collect()
    }
}
