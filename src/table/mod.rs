//! Evidence table renderer
//!
//! Produces the sorted, grouped, optionally filtered view of the evidence
//! records plus everything derived per row (chips, group headers, stripes).
//!
//! # Ordering
//!
//! 1. Groups are always contiguous and in fixed order: cost, workforce,
//!    supporting. The sort key never moves a row across groups.
//! 2. When sorting by domain, severity (high first) decides within a group,
//!    whatever the direction toggle says.
//! 3. The selected field then breaks ties with a numeric-aware,
//!    case-insensitive comparison in the toggled direction.
//!
//! The sort is stable, so rows that compare equal keep their input order.

pub mod chips;
pub mod collate;
pub mod csv;

use crate::evidence::{severity_rank, EvidenceRecord, Group};
use chips::{Chip, ChipAction, Direction, Fragment, GapChip, Tone, ValueParts};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Domain,
    Medway,
    Comparators,
    Why,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Domain, SortKey::Medway, SortKey::Comparators, SortKey::Why];

    /// Column heading, also used as the CSV header.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Domain => "Domain",
            SortKey::Medway => "Medway",
            SortKey::Comparators => "Fringe comparators",
            SortKey::Why => "Why it matters",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Domain => "domain",
            SortKey::Medway => "medway",
            SortKey::Comparators => "comparators",
            SortKey::Why => "why",
        }
    }

    pub fn field(self, record: &EvidenceRecord) -> &str {
        match self {
            SortKey::Domain => &record.domain,
            SortKey::Medway => &record.medway,
            SortKey::Comparators => &record.comparators,
            SortKey::Why => &record.why,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort key '{}' (domain, medway, comparators, why)", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    }
}

/// Component-local table state. Transitions return a new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub sort_by: SortKey,
    pub sort_dir: SortDir,
    pub query: String,
    pub sortable: bool,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            sort_by: SortKey::Domain,
            sort_dir: SortDir::Asc,
            query: String::new(),
            sortable: true,
        }
    }
}

impl TableState {
    pub fn new(sortable: bool) -> Self {
        Self { sortable, ..Self::default() }
    }

    pub fn sorted_by(mut self, key: SortKey, dir: SortDir) -> Self {
        self.sort_by = key;
        self.sort_dir = dir;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Column header activation: the active column flips direction, any
    /// other column becomes active ascending.
    pub fn activate(&self, key: SortKey) -> Self {
        if !self.sortable {
            return self.clone();
        }
        let mut next = self.clone();
        if self.sort_by == key {
            next.sort_dir = self.sort_dir.flipped();
        } else {
            next.sort_by = key;
            next.sort_dir = SortDir::Asc;
        }
        next
    }

    pub fn aria_sort(&self, key: SortKey) -> &'static str {
        if !self.sortable || self.sort_by != key {
            "none"
        } else {
            match self.sort_dir {
                SortDir::Asc => "ascending",
                SortDir::Desc => "descending",
            }
        }
    }

    pub fn next_sort_hint(&self, key: SortKey) -> &'static str {
        if !self.sortable {
            ""
        } else if self.sort_by != key || self.sort_dir == SortDir::Desc {
            "activate to sort ascending"
        } else {
            "activate to sort descending"
        }
    }

    /// Text for the polite live region after a sort change.
    pub fn announcement(&self) -> String {
        format!("Sorted by {} {}", self.sort_by.label(), self.sort_dir.as_str())
    }
}

fn compare(a: &EvidenceRecord, b: &EvidenceRecord, key: SortKey, dir: SortDir) -> Ordering {
    let by_group = a.resolved_group().index().cmp(&b.resolved_group().index());
    if by_group != Ordering::Equal {
        return by_group;
    }
    if key == SortKey::Domain {
        let by_severity = severity_rank(b.severity).cmp(&severity_rank(a.severity));
        if by_severity != Ordering::Equal {
            return by_severity;
        }
    }
    dir.apply(collate::natural_cmp(key.field(a), key.field(b)))
}

/// Indices into `records` in display order. A non-sortable state keeps
/// input order.
pub fn sort_order(records: &[EvidenceRecord], state: &TableState) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    if state.sortable {
        // Vec::sort_by is stable
        order.sort_by(|&a, &b| compare(&records[a], &records[b], state.sort_by, state.sort_dir));
    }
    order
}

/// Sorted view of `records`.
pub fn sort_records<'a>(records: &'a [EvidenceRecord], state: &TableState) -> Vec<&'a EvidenceRecord> {
    sort_order(records, state).into_iter().map(|i| &records[i]).collect()
}

/// Case-insensitive substring match over domain, medway, comparators, why.
pub fn matches_query(record: &EvidenceRecord, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    [&record.domain, &record.medway, &record.comparators, &record.why]
        .iter()
        .any(|field| field.to_lowercase().contains(&q))
}

/// Filtered, then sorted, view. Filtering before a stable sort gives the
/// same order as sorting first.
pub fn visible_records<'a>(records: &'a [EvidenceRecord], state: &TableState) -> Vec<&'a EvidenceRecord> {
    sort_records(records, state)
        .into_iter()
        .filter(|r| matches_query(r, &state.query))
        .collect()
}

/// Per-group row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub total: usize,
    pub cost: usize,
    pub workforce: usize,
    pub supporting: usize,
}

impl GroupCounts {
    pub fn from_records(records: &[EvidenceRecord]) -> Self {
        let mut counts = Self { total: records.len(), ..Self::default() };
        for r in records {
            match r.resolved_group() {
                Group::Cost => counts.cost += 1,
                Group::Workforce => counts.workforce += 1,
                Group::Supporting => counts.supporting += 1,
            }
        }
        counts
    }

    /// "6 datapoints · 4 cost · 2 workforce"
    pub fn datapoint_chip(&self) -> String {
        let mut parts = vec![format!(
            "{} datapoint{}",
            self.total,
            if self.total == 1 { "" } else { "s" }
        )];
        if self.cost > 0 {
            parts.push(format!("{} cost", self.cost));
        }
        if self.workforce > 0 {
            parts.push(format!("{} workforce", self.workforce));
        }
        if self.supporting > 0 {
            parts.push(format!("{} supporting", self.supporting));
        }
        parts.join(" · ")
    }

    pub fn summary_line(&self) -> &'static str {
        if self.total == 0 {
            return "Side-by-side view of key Medway vs fringe comparators across cost, workforce and supporting evidence.";
        }
        match (self.cost > 0, self.workforce > 0) {
            (true, true) => "Medway costs now sit at fringe levels; workforce gains remain fragile without a 5% HCAS uplift.",
            (true, false) => "Medway’s cost-of-living indicators align with or exceed neighbouring fringe comparators.",
            (false, true) => "Workforce indicators highlight ongoing retention and vacancy risks without a 5% HCAS uplift.",
            (false, false) => "Evidence rows summarise Medway’s position against fringe comparators.",
        }
    }
}

/// Chips above the table: the datapoint count, a jump to the sources
/// section, and a shortcut back to the severity-first ordering.
pub fn header_chips(counts: &GroupCounts, sortable: bool) -> Vec<Chip> {
    let mut chips = vec![
        Chip::Static { label: counts.datapoint_chip(), tone: Tone::Steady },
        Chip::Interactive {
            label: "Sources & methods".to_string(),
            tone: Tone::Steady,
            action: ChipAction::Link("#sources".to_string()),
        },
    ];
    if sortable && counts.total > 1 {
        chips.push(Chip::Interactive {
            label: "Highest pressure first".to_string(),
            tone: Tone::Up,
            action: ChipAction::Sort(SortKey::Domain),
        });
    }
    chips
}

/// Presentation options that do not affect ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub title: String,
    pub sortable: bool,
    pub compact: bool,
    pub highlight_medway_column: bool,
    /// Row keys (or domains) drawn with a highlight ring.
    pub highlight_row_keys: Vec<String>,
    pub freshness_note: String,
    pub footer_note: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            title: "Evidence at a glance".to_string(),
            sortable: true,
            compact: false,
            highlight_medway_column: true,
            highlight_row_keys: Vec::new(),
            freshness_note: "Periods aligned across cost and workforce indicators; see Sources & Methods for definitions, comparators and any FOI-sourced data.".to_string(),
            footer_note: None,
        }
    }
}

impl TableOptions {
    /// Footer and meta strip share one text: the footer note wins.
    pub fn footer_text(&self) -> &str {
        self.footer_note.as_deref().unwrap_or(&self.freshness_note)
    }
}

/// Upstream inputs to a render.
#[derive(Debug, Clone, Default)]
pub struct TableInput<'a> {
    pub rows: Option<&'a [EvidenceRecord]>,
    pub loading: bool,
    pub error: Option<String>,
}

/// One rendered row.
#[derive(Debug, Clone, Serialize)]
pub struct RowView<'a> {
    /// Position of the record in the input rows.
    pub index: usize,
    pub record: &'a EvidenceRecord,
    pub group: Group,
    /// Set on the first row of each group.
    pub group_header: Option<&'static str>,
    pub striped: bool,
    pub highlighted: bool,
    pub icon: &'static str,
    pub parts: ValueParts,
    pub trend: Option<Direction>,
    pub gap: Option<GapChip>,
    pub medway_fragments: Vec<Fragment>,
    pub comparator_fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "rows", rename_all = "lowercase")]
pub enum TableView<'a> {
    Loading,
    /// Upstream error; the table is suppressed entirely.
    Error(String),
    Empty,
    Rows(Vec<RowView<'a>>),
}

impl TableView<'_> {
    pub fn row_count(&self) -> usize {
        match self {
            TableView::Rows(rows) => rows.len(),
            _ => 0,
        }
    }
}

pub const EMPTY_MESSAGE: &str = "No evidence rows to display. Check data sources or filters.";

/// Build the view for one render.
pub fn render_view<'a>(input: &TableInput<'a>, state: &TableState, options: &TableOptions) -> TableView<'a> {
    if input.loading {
        return TableView::Loading;
    }
    if let Some(err) = &input.error {
        tracing::warn!(error = %err, "evidence table suppressed by upstream error");
        return TableView::Error(err.clone());
    }

    let records = input.rows.unwrap_or(&[]);
    let visible: Vec<(usize, &EvidenceRecord)> = sort_order(records, state)
        .into_iter()
        .map(|i| (i, &records[i]))
        .filter(|(_, r)| matches_query(r, &state.query))
        .collect();
    if visible.is_empty() {
        tracing::debug!(query = %state.query, total = records.len(), "evidence table empty");
        return TableView::Empty;
    }

    TableView::Rows(build_rows(&visible, options))
}

fn build_rows<'a>(visible: &[(usize, &'a EvidenceRecord)], options: &TableOptions) -> Vec<RowView<'a>> {
    let mut prev_group: Option<Group> = None;
    visible
        .iter()
        .enumerate()
        .map(|(idx, &(index, record))| {
            let group = record.resolved_group();
            let group_header = (prev_group != Some(group)).then(|| group.label());
            prev_group = Some(group);

            let parts = chips::parse_value_parts(&record.medway);
            let trend = chips::trend_direction(record.severity, record.trend, &parts.main);
            let highlighted = options
                .highlight_row_keys
                .iter()
                .any(|k| *k == record.key || *k == record.domain);

            RowView {
                index,
                record,
                group,
                group_header,
                striped: idx % 2 == 1,
                highlighted,
                icon: chips::domain_icon(&record.domain),
                medway_fragments: chips::badge_fragments(&parts.main),
                comparator_fragments: chips::badge_fragments(&record.comparators),
                gap: chips::gap_chip(&record.medway, &record.comparators),
                trend,
                parts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::data::evidence_rows;
    use crate::evidence::Severity;

    fn rec(key: &str, domain: &str, group: Option<Group>, severity: Option<Severity>) -> EvidenceRecord {
        EvidenceRecord {
            key: key.into(),
            domain: domain.into(),
            group,
            severity,
            medway: String::new(),
            comparators: String::new(),
            why: String::new(),
            trend: None,
        }
    }

    fn keys(view: &[&EvidenceRecord]) -> Vec<String> {
        view.iter().map(|r| r.key.clone()).collect()
    }

    fn all_states() -> Vec<TableState> {
        let mut states = Vec::new();
        for key in SortKey::ALL {
            for dir in [SortDir::Asc, SortDir::Desc] {
                states.push(TableState::default().sorted_by(key, dir));
            }
        }
        states
    }

    // ==========================================================================
    // GROUP ORDER
    // ==========================================================================
    //
    // Whatever column is active, cost rows come first, then workforce, then
    // supporting, and each group is one contiguous run.
    // ==========================================================================

    #[test]
    fn test_groups_contiguous_for_every_sort() {
        let records = vec![
            rec("a", "Zeta", Some(Group::Supporting), None),
            rec("b", "Alpha", Some(Group::Workforce), Some(Severity::Low)),
            rec("c", "Mid", None, Some(Severity::High)),
            rec("d", "Beta", Some(Group::Cost), Some(Severity::Medium)),
            rec("e", "Gamma", Some(Group::Workforce), Some(Severity::High)),
            rec("f", "Delta", Some(Group::Cost), None),
        ];

        for state in all_states() {
            let groups: Vec<usize> = sort_records(&records, &state)
                .iter()
                .map(|r| r.resolved_group().index())
                .collect();
            let mut sorted = groups.clone();
            sorted.sort();
            assert_eq!(groups, sorted, "groups out of order for {:?}", state);
        }
    }

    // ==========================================================================
    // SEVERITY PRECEDENCE
    // ==========================================================================

    #[test]
    fn test_domain_sort_puts_severity_first_regardless_of_direction() {
        let records = vec![
            rec("low", "Alpha", Some(Group::Cost), Some(Severity::Low)),
            rec("high", "Zeta", Some(Group::Cost), Some(Severity::High)),
            rec("none", "Beta", Some(Group::Cost), None),
            rec("improving", "Gamma", Some(Group::Cost), Some(Severity::Improving)),
            rec("medium", "Delta", Some(Group::Cost), Some(Severity::Medium)),
        ];

        let expected = vec!["high", "medium", "improving", "low", "none"];
        for dir in [SortDir::Asc, SortDir::Desc] {
            let state = TableState::default().sorted_by(SortKey::Domain, dir);
            assert_eq!(keys(&sort_records(&records, &state)), expected);
        }
    }

    #[test]
    fn test_domain_sort_alphabetical_within_severity_tier() {
        let records = vec![
            rec("b", "Rail", Some(Group::Cost), Some(Severity::High)),
            rec("a", "Private rent", Some(Group::Cost), Some(Severity::High)),
        ];
        let asc = TableState::default();
        assert_eq!(keys(&sort_records(&records, &asc)), vec!["a", "b"]);
        let desc = asc.activate(SortKey::Domain);
        assert_eq!(keys(&sort_records(&records, &desc)), vec!["b", "a"]);
    }

    #[test]
    fn test_other_columns_ignore_severity() {
        let mut a = rec("a", "A", Some(Group::Cost), Some(Severity::Low));
        a.why = "Alpha".into();
        let mut b = rec("b", "B", Some(Group::Cost), Some(Severity::High));
        b.why = "Beta".into();
        let records = vec![b, a];

        let state = TableState::default().sorted_by(SortKey::Why, SortDir::Asc);
        assert_eq!(keys(&sort_records(&records, &state)), vec!["a", "b"]);
        let state = state.activate(SortKey::Why);
        assert_eq!(keys(&sort_records(&records, &state)), vec!["b", "a"]);
    }

    // ==========================================================================
    // STABILITY
    // ==========================================================================

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            rec("first", "Rent", Some(Group::Cost), Some(Severity::High)),
            rec("second", "rent", Some(Group::Cost), Some(Severity::High)),
            rec("third", "RENT", Some(Group::Cost), Some(Severity::High)),
        ];
        for state in all_states() {
            assert_eq!(keys(&sort_records(&records, &state)), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_resorting_is_idempotent() {
        let records = evidence_rows();
        for state in all_states() {
            let once: Vec<EvidenceRecord> = sort_records(&records, &state).into_iter().cloned().collect();
            let twice = sort_records(&once, &state);
            assert_eq!(keys(&twice), keys(&once.iter().collect::<Vec<_>>()));
        }
    }

    #[test]
    fn test_numeric_aware_ordering() {
        let records = vec![
            rec("ten", "item 10", Some(Group::Cost), None),
            rec("two", "item 2", Some(Group::Cost), None),
        ];
        let state = TableState::default().sorted_by(SortKey::Domain, SortDir::Asc);
        assert_eq!(keys(&sort_records(&records, &state)), vec!["two", "ten"]);
    }

    #[test]
    fn test_medway_column_sorts_symbols_before_digits() {
        let records = evidence_rows();
        let state = TableState::default().sorted_by(SortKey::Medway, SortDir::Asc);
        let workforce: Vec<String> = sort_records(&records, &state)
            .into_iter()
            .filter(|r| r.resolved_group() == Group::Workforce)
            .map(|r| r.key.clone())
            .collect();
        assert_eq!(workforce, vec!["nurse-turnover", "nurse-vacancy-trend"]);
    }

    #[test]
    fn test_non_sortable_keeps_input_order() {
        let records = vec![
            rec("w", "Vacancy", Some(Group::Workforce), None),
            rec("c", "Rent", Some(Group::Cost), None),
        ];
        let state = TableState::new(false);
        assert_eq!(keys(&sort_records(&records, &state)), vec!["w", "c"]);
        assert_eq!(state.activate(SortKey::Why), state);
        assert_eq!(state.aria_sort(SortKey::Domain), "none");
    }

    // ==========================================================================
    // STATE TRANSITIONS
    // ==========================================================================

    #[test]
    fn test_activate_transitions() {
        let s = TableState::default();
        assert_eq!((s.sort_by, s.sort_dir), (SortKey::Domain, SortDir::Asc));

        let s = s.activate(SortKey::Domain);
        assert_eq!((s.sort_by, s.sort_dir), (SortKey::Domain, SortDir::Desc));

        let s = s.activate(SortKey::Medway);
        assert_eq!((s.sort_by, s.sort_dir), (SortKey::Medway, SortDir::Asc));
        assert_eq!(s.aria_sort(SortKey::Medway), "ascending");
        assert_eq!(s.aria_sort(SortKey::Domain), "none");
        assert_eq!(s.next_sort_hint(SortKey::Medway), "activate to sort descending");
        assert_eq!(s.next_sort_hint(SortKey::Why), "activate to sort ascending");
        assert_eq!(s.announcement(), "Sorted by Medway asc");
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("Comparators".parse::<SortKey>(), Ok(SortKey::Comparators));
        assert!("price".parse::<SortKey>().is_err());
    }

    // ==========================================================================
    // FILTERING
    // ==========================================================================

    #[test]
    fn test_filter_matches_any_text_field() {
        let records = evidence_rows();
        let hits = |q: &str| visible_records(&records, &TableState::default().with_query(q)).len();

        assert_eq!(hits(""), records.len());
        assert_eq!(hits("  PRIVATE RENT "), 1);
        // "differential" in the turnover row also contains "rent"
        assert_eq!(hits("rent"), 2);
        assert_eq!(hits("east tilbury"), 1);
        assert_eq!(hits("jan-2025"), 1);
        assert_eq!(hits("net pay"), 1);
        assert_eq!(hits("nurse"), 2);
        assert_eq!(hits("no such thing"), 0);
    }

    // ==========================================================================
    // VIEW STATES
    // ==========================================================================

    #[test]
    fn test_empty_list_renders_empty_state() {
        let input = TableInput { rows: Some(&[]), ..Default::default() };
        let view = render_view(&input, &TableState::default(), &TableOptions::default());
        assert!(matches!(view, TableView::Empty));
        assert_eq!(view.row_count(), 0);

        let missing = TableInput::default();
        assert!(matches!(
            render_view(&missing, &TableState::default(), &TableOptions::default()),
            TableView::Empty
        ));
    }

    #[test]
    fn test_error_suppresses_table() {
        let records = evidence_rows();
        let input = TableInput { rows: Some(&records), error: Some("timeout".into()), loading: false };
        match render_view(&input, &TableState::default(), &TableOptions::default()) {
            TableView::Error(msg) => assert_eq!(msg, "timeout"),
            other => panic!("expected error state, got {:?}", other),
        }
    }

    #[test]
    fn test_no_filter_matches_is_empty_not_error() {
        let records = evidence_rows();
        let input = TableInput { rows: Some(&records), ..Default::default() };
        let state = TableState::default().with_query("zzz");
        assert!(matches!(render_view(&input, &state, &TableOptions::default()), TableView::Empty));
    }

    #[test]
    fn test_rows_carry_group_headers_and_stripes() {
        let records = evidence_rows();
        let input = TableInput { rows: Some(&records), ..Default::default() };
        let options = TableOptions {
            highlight_row_keys: vec!["nurse-turnover".into()],
            ..TableOptions::default()
        };
        let TableView::Rows(rows) = render_view(&input, &TableState::default(), &options) else {
            panic!("expected rows");
        };

        let headers: Vec<&str> = rows.iter().filter_map(|r| r.group_header).collect();
        assert_eq!(headers, vec![Group::Cost.label(), Group::Workforce.label()]);
        assert!(!rows[0].striped && rows[1].striped);
        assert_eq!(rows.iter().filter(|r| r.highlighted).count(), 1);

        // high-severity cost rows lead when sorting by domain
        assert_eq!(rows[0].record.severity, Some(Severity::High));
    }

    #[test]
    fn test_sort_order_matches_sorted_view() {
        let records = evidence_rows();
        for state in all_states() {
            let by_index: Vec<&str> = sort_order(&records, &state).iter().map(|&i| records[i].key.as_str()).collect();
            let by_ref: Vec<&str> = sort_records(&records, &state).iter().map(|r| r.key.as_str()).collect();
            assert_eq!(by_index, by_ref);
        }
    }

    #[test]
    fn test_header_chips_variants() {
        let counts = GroupCounts::from_records(&evidence_rows());
        let chips = header_chips(&counts, true);
        assert_eq!(chips.len(), 3);
        assert!(!chips[0].is_interactive());
        assert_eq!(chips[0].label(), "6 datapoints · 4 cost · 2 workforce");
        assert!(matches!(
            &chips[2],
            Chip::Interactive { action: ChipAction::Sort(SortKey::Domain), .. }
        ));
        assert_eq!(header_chips(&counts, false).len(), 2);
    }

    #[test]
    fn test_group_counts_and_summary() {
        let counts = GroupCounts::from_records(&evidence_rows());
        assert_eq!(counts.datapoint_chip(), "6 datapoints · 4 cost · 2 workforce");
        assert!(counts.summary_line().contains("workforce gains remain fragile"));

        let one = GroupCounts::from_records(&[rec("x", "Catchment", None, None)]);
        assert_eq!(one.datapoint_chip(), "1 datapoint · 1 supporting");
        assert_eq!(GroupCounts::default().summary_line().starts_with("Side-by-side"), true);
    }
}
