//! JSON site export for programmatic consumption

use crate::chart::spec::ChartSpec;
use crate::error::Result;
use crate::evidence::EvidenceRecord;
use crate::report::Site;
use crate::sources::{group_sources, SourceGroup, VerifyStep};
use crate::table::{sort_records, GroupCounts};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonSite<'a> {
    title: &'a str,
    generated: &'a str,
    summary: GroupCounts,
    summary_line: &'static str,
    /// Rows in the page's initial order.
    rows: Vec<&'a EvidenceRecord>,
    charts: Vec<ChartSpec>,
    sources: Vec<SourceGroup>,
    checklist: &'a [VerifyStep],
}

pub fn write<W: Write>(writer: &mut W, site: &Site) -> Result<()> {
    let summary = site.counts();
    let report = JsonSite {
        title: &site.title,
        generated: &site.generated,
        summary,
        summary_line: summary.summary_line(),
        rows: sort_records(&site.records, &site.table_state()),
        charts: site.chart_specs(),
        sources: group_sources(&site.sources, ""),
        checklist: &site.verify_steps,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_json_report_shape() {
        let site = Site::from_config(&Config::default()).unwrap();
        let mut out = Vec::new();
        write(&mut out, &site).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(v["summary"]["total"], 6);
        assert_eq!(v["summary"]["workforce"], 2);
        assert_eq!(v["rows"][0]["group"], "cost");
        assert_eq!(v["charts"][0]["type"], "bar");
        assert!(v["sources"].as_array().unwrap().len() >= 2);
        assert!(!v["checklist"].as_array().unwrap().is_empty());
    }
}
