//! Sources & methods
//!
//! Reference list grouped by kind, a free-text filter over it, and the
//! verification checklist with its copy-to-clipboard flow.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Cost,
    Workforce,
    Policy,
    Other,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Cost => "Cost",
            SourceKind::Workforce => "Workforce",
            SourceKind::Policy => "Policy",
            SourceKind::Other => "Other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Cost => "Cost sources (housing, rent, council tax, rail)",
            SourceKind::Workforce => "Workforce sources (turnover, vacancy, agency)",
            SourceKind::Policy => "Policy sources (AfC, NHSPRB, DHSC statements)",
            SourceKind::Other => "Other sources",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SourceKind::Cost => "💷",
            SourceKind::Workforce => "👥",
            SourceKind::Policy => "📘",
            SourceKind::Other => "📁",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub key: String,
    pub tag: String,
    pub label: String,
    pub url: Option<String>,
    pub kind: SourceKind,
}

impl Source {
    /// An empty `url` means a local reference with no link.
    pub fn new(key: &str, tag: &str, label: &str, url: &str, kind: SourceKind) -> Self {
        Self {
            key: key.to_string(),
            tag: tag.to_string(),
            label: label.to_string(),
            url: (!url.trim().is_empty()).then(|| url.to_string()),
            kind,
        }
    }

    pub fn host(&self) -> Option<String> {
        self.url.as_deref().and_then(safe_host)
    }

    /// Linked sources are interactive cards; the rest are static.
    pub fn is_link(&self) -> bool {
        self.url.is_some()
    }

    pub fn reference_note(&self) -> &'static str {
        if self.is_link() {
            "External reference"
        } else {
            "Local reference"
        }
    }

    /// Lowercased text the sources filter searches, one field per line.
    pub fn search_text(&self) -> String {
        let mut parts = vec![self.key.to_lowercase(), self.tag.to_lowercase(), self.label.to_lowercase()];
        if let Some(url) = &self.url {
            parts.push(url.to_lowercase());
        }
        if let Some(host) = self.host() {
            parts.push(host);
        }
        parts.push(self.kind.as_str().to_string());
        parts.join("\n")
    }

    fn matches(&self, query: &str) -> bool {
        self.search_text().contains(query)
    }
}

/// Hostname without a leading `www.`, or `None` when the URL has no
/// `scheme://host` shape.
pub fn safe_host(url: &str) -> Option<String> {
    let (scheme, rest) = url.trim().split_once("://")?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
        return None;
    }
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = host_port.split(':').next()?.to_lowercase();
    if host.is_empty() || !host.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        return None;
    }
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceGroup {
    pub kind: SourceKind,
    pub label: &'static str,
    pub icon: &'static str,
    pub items: Vec<Source>,
}

/// Group by kind, groups in first-seen order. A non-empty query keeps only
/// matching sources and drops groups left empty.
pub fn group_sources(sources: &[Source], query: &str) -> Vec<SourceGroup> {
    let q = query.trim().to_lowercase();
    let mut groups: Vec<SourceGroup> = Vec::new();
    for source in sources {
        if !q.is_empty() && !source.matches(&q) {
            continue;
        }
        match groups.iter_mut().find(|g| g.kind == source.kind) {
            Some(group) => group.items.push(source.clone()),
            None => groups.push(SourceGroup {
                kind: source.kind,
                label: source.kind.label(),
                icon: source.kind.icon(),
                items: vec![source.clone()],
            }),
        }
    }
    groups
}

pub fn source_count(groups: &[SourceGroup]) -> usize {
    groups.iter().map(|g| g.items.len()).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChecklistCategory {
    Cost,
    Workforce,
    Catchment,
    Policy,
    General,
}

impl ChecklistCategory {
    pub fn from_domain(domain: &str) -> Self {
        let d = domain.trim().to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| d.contains(w));
        if any(&["house", "rent", "rail", "council", "tax", "cost"]) {
            ChecklistCategory::Cost
        } else if any(&["workforce", "vacancy", "turnover", "staff"]) {
            ChecklistCategory::Workforce
        } else if any(&["catchment", "flows", "patient", "referral"]) {
            ChecklistCategory::Catchment
        } else if any(&["policy", "hcas", "afc", "prb"]) {
            ChecklistCategory::Policy
        } else {
            ChecklistCategory::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChecklistCategory::Cost => "Cost",
            ChecklistCategory::Workforce => "Workforce",
            ChecklistCategory::Catchment => "Catchment",
            ChecklistCategory::Policy => "Policy",
            ChecklistCategory::General => "General",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ChecklistCategory::Cost => "💷",
            ChecklistCategory::Workforce => "👥",
            ChecklistCategory::Catchment => "🗺️",
            ChecklistCategory::Policy => "📜",
            ChecklistCategory::General => "✅",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyStep {
    pub key: String,
    pub domain: String,
    pub steps: Vec<String>,
}

impl VerifyStep {
    pub fn new(key: &str, domain: &str, steps: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            domain: domain.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn category(&self) -> ChecklistCategory {
        ChecklistCategory::from_domain(&self.domain)
    }

    pub fn is_cost(&self) -> bool {
        self.category() == ChecklistCategory::Cost
    }

    /// "3 steps" / "1 step"
    pub fn step_count_label(&self) -> String {
        let n = self.steps.len();
        format!("{} step{}", n, if n == 1 { "" } else { "s" })
    }
}

/// Checklists split into cost and everything else, each filtered by domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checklists<'a> {
    pub cost: Vec<&'a VerifyStep>,
    pub other: Vec<&'a VerifyStep>,
}

pub fn split_checklists<'a>(steps: &'a [VerifyStep], query: &str) -> Checklists<'a> {
    let q = query.trim().to_lowercase();
    let keep = |v: &&VerifyStep| q.is_empty() || v.domain.to_lowercase().contains(&q);
    let (cost, other): (Vec<&VerifyStep>, Vec<&VerifyStep>) = steps.iter().filter(keep).partition(|v| v.is_cost());
    Checklists { cost, other }
}

/// Plain text for pasting into email or a document: a header line per
/// domain, `- step` lines, blank line between domains.
pub fn checklist_text(steps: &[VerifyStep]) -> String {
    steps
        .iter()
        .map(|v| {
            let header = if v.domain.is_empty() { "Domain" } else { v.domain.as_str() };
            let items: Vec<String> = v.steps.iter().map(|s| format!("- {}", s)).collect();
            format!("{}\n{}", header, items.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Where copied text goes.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
    Failed,
}

impl CopyState {
    /// Live-region message; empty when idle.
    pub fn message(self) -> &'static str {
        match self {
            CopyState::Idle => "",
            CopyState::Copied => "Checklist copied to clipboard.",
            CopyState::Failed => "Copy failed. Select and copy manually.",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            CopyState::Idle => "Copy checklist",
            CopyState::Copied => "Copied",
            CopyState::Failed => "Copy failed",
        }
    }
}

/// How long a copy status stays up before resetting, in milliseconds.
pub const COPY_STATUS_MS: u64 = 2000;
pub const LIVE_MESSAGE_MS: u64 = 2500;

/// Result of one copy attempt. On failure the caller shows `fallback_text`
/// in a selectable block for manual copying.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOutcome {
    pub state: CopyState,
    pub fallback_text: Option<String>,
}

pub fn copy_checklist(clipboard: &mut dyn Clipboard, steps: &[VerifyStep]) -> CopyOutcome {
    let text = checklist_text(steps);
    match clipboard.write_text(&text) {
        Ok(()) => CopyOutcome { state: CopyState::Copied, fallback_text: None },
        Err(err) => {
            tracing::warn!(error = %err, "checklist copy failed, showing manual fallback");
            CopyOutcome { state: CopyState::Failed, fallback_text: Some(text) }
        }
    }
}

/// Evidence pack control: a link when a URL is configured, otherwise a
/// disabled button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum EvidencePackAction {
    Link(String),
    Disabled,
}

impl EvidencePackAction {
    pub fn from_url(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(u) if !u.is_empty() => EvidencePackAction::Link(u.to_string()),
            _ => EvidencePackAction::Disabled,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            EvidencePackAction::Link(_) => "Download evidence pack",
            EvidencePackAction::Disabled => "No download configured",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::data::{sources, verify_steps};

    // ==========================================================================
    // HOSTS
    // ==========================================================================

    #[test]
    fn test_safe_host() {
        assert_eq!(safe_host("https://www.ons.gov.uk").as_deref(), Some("ons.gov.uk"));
        assert_eq!(
            safe_host("https://www.gov.uk/government/collections/x?y=1").as_deref(),
            Some("gov.uk")
        );
        assert_eq!(safe_host("http://user@Example.com:8080/a").as_deref(), Some("example.com"));
        assert_eq!(safe_host("not a url"), None);
        assert_eq!(safe_host("https://"), None);
        assert_eq!(safe_host(""), None);
    }

    #[test]
    fn test_source_without_url_is_static() {
        let s = Source::new("Workforce", "Workforce", "Trust board papers", "", SourceKind::Workforce);
        assert!(!s.is_link());
        assert_eq!(s.host(), None);
        assert_eq!(s.reference_note(), "Local reference");
    }

    // ==========================================================================
    // GROUPING AND FILTER
    // ==========================================================================

    #[test]
    fn test_groups_in_first_seen_order() {
        let groups = group_sources(&sources(), "");
        let kinds: Vec<SourceKind> = groups.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![SourceKind::Cost, SourceKind::Workforce, SourceKind::Policy]);
        assert_eq!(groups[0].items.len(), 4);
        assert_eq!(source_count(&groups), 6);
    }

    #[test]
    fn test_filter_matches_key_alongside_other_fields() {
        let list = vec![
            Source::new("band-d", "CouncilTax", "Band D schedules", "https://www.local.gov.uk", SourceKind::Cost),
            Source::new("esr", "Workforce", "ESR KPIs", "", SourceKind::Workforce),
        ];
        let text = list[0].search_text();
        assert!(text.contains("band-d"));
        assert!(text.contains("local.gov.uk"));

        let by_key = group_sources(&list, "BAND-D");
        assert_eq!(source_count(&by_key), 1);
        assert_eq!(by_key[0].items[0].key, "band-d");
        assert_eq!(source_count(&group_sources(&list, "esr kpis")), 1);
    }

    #[test]
    fn test_filter_matches_host_and_kind() {
        let by_host = group_sources(&sources(), "nhsemployers");
        assert_eq!(source_count(&by_host), 1);
        assert_eq!(by_host[0].kind, SourceKind::Policy);

        let by_kind = group_sources(&sources(), "  WORKFORCE ");
        assert_eq!(source_count(&by_kind), 1);

        assert!(group_sources(&sources(), "zzz").is_empty());
    }

    // ==========================================================================
    // CHECKLIST
    // ==========================================================================

    #[test]
    fn test_checklist_categories() {
        assert_eq!(ChecklistCategory::from_domain("Council Tax"), ChecklistCategory::Cost);
        assert_eq!(ChecklistCategory::from_domain("Workforce"), ChecklistCategory::Workforce);
        assert_eq!(ChecklistCategory::from_domain("Catchment"), ChecklistCategory::Catchment);
        assert_eq!(ChecklistCategory::from_domain("HCAS policy"), ChecklistCategory::Policy);
        assert_eq!(ChecklistCategory::from_domain("Misc"), ChecklistCategory::General);
    }

    #[test]
    fn test_split_checklists() {
        let steps = verify_steps();
        let all = split_checklists(&steps, "");
        assert_eq!(all.cost.len(), 4);
        assert_eq!(all.other.len(), 2);

        let filtered = split_checklists(&steps, "rail");
        assert_eq!(filtered.cost.len(), 1);
        assert!(filtered.other.is_empty());
    }

    #[test]
    fn test_checklist_text_layout() {
        let steps = vec![
            VerifyStep::new("a", "Rail fares", &["Quote standard annual season only", "Record fare code/date"]),
            VerifyStep::new("b", "", &["One"]),
        ];
        assert_eq!(
            checklist_text(&steps),
            "Rail fares\n- Quote standard annual season only\n- Record fare code/date\n\nDomain\n- One"
        );
        assert_eq!(steps[1].step_count_label(), "1 step");
    }

    // ==========================================================================
    // COPY FLOW
    // ==========================================================================

    struct Memory(Option<String>);

    impl Clipboard for Memory {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0 = Some(text.to_string());
            Ok(())
        }
    }

    struct Denied;

    impl Clipboard for Denied {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError("permission denied".into()))
        }
    }

    #[test]
    fn test_copy_success() {
        let steps = verify_steps();
        let mut clip = Memory(None);
        let outcome = copy_checklist(&mut clip, &steps);
        assert_eq!(outcome.state, CopyState::Copied);
        assert_eq!(outcome.state.message(), "Checklist copied to clipboard.");
        assert_eq!(clip.0, Some(checklist_text(&steps)));
    }

    #[test]
    fn test_copy_failure_falls_back_to_manual() {
        let steps = verify_steps();
        let outcome = copy_checklist(&mut Denied, &steps);
        assert_eq!(outcome.state, CopyState::Failed);
        assert_eq!(outcome.state.message(), "Copy failed. Select and copy manually.");
        assert_eq!(outcome.fallback_text, Some(checklist_text(&steps)));
    }

    #[test]
    fn test_evidence_pack_action() {
        assert_eq!(EvidencePackAction::from_url(None), EvidencePackAction::Disabled);
        assert_eq!(EvidencePackAction::from_url(Some("  ")), EvidencePackAction::Disabled);
        assert_eq!(
            EvidencePackAction::from_url(Some("https://example.org/pack.zip")),
            EvidencePackAction::Link("https://example.org/pack.zip".into())
        );
        assert_eq!(EvidencePackAction::Disabled.title(), "No download configured");
    }
}
