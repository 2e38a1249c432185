//! Static datasets for the evidence site
//!
//! Everything the page shows is derived from these literals. Figures are
//! the latest validated values for Medway and its fringe comparators.

use super::{Comparator, EvidenceItem, EvidenceRecord, Group, Measure, Period, Severity, Trend};
use crate::sources::{Source, SourceKind, VerifyStep};

pub fn evidence_items() -> Vec<EvidenceItem> {
    vec![
        EvidenceItem {
            key: "house-prices-yoy".into(),
            group: Group::Cost,
            severity: Severity::Medium,
            domain: "House prices (YoY)".into(),
            medway: Measure::Percent { value: 2.5, approx: false, period: Some(Period::Hpi) },
            trend: Trend::Up,
            comparators: vec![
                Comparator::new("Thurrock", 2.6),
                Comparator::new("Dartford", 3.0),
                Comparator::new("Gravesham", 4.4),
            ],
            why: "Market trend aligns with fringe areas → comparable pressure.".into(),
        },
        EvidenceItem {
            key: "private-rent-yoy-level".into(),
            group: Group::Cost,
            severity: Severity::High,
            domain: "Private rent (YoY / level)".into(),
            medway: Measure::Mixed { yoy: 13.1, level: 1165.0, period: Some(Period::RentYoy) },
            trend: Trend::Up,
            comparators: vec![
                Comparator::new("Thurrock", 7.8),
                Comparator::new("Dartford", 11.2),
                Comparator::new("Gravesham", 9.1),
            ],
            why: "Faster rent growth erodes net pay; recruitment/retention risk.".into(),
        },
        EvidenceItem {
            key: "rail-season-ticket".into(),
            group: Group::Cost,
            severity: Severity::High,
            domain: "Rail season ticket (annual)".into(),
            medway: Measure::Currency {
                value: 6784.0,
                route: Some("Gillingham→London".into()),
                period: Some(Period::Fares2025),
            },
            trend: Trend::Up,
            comparators: vec![
                Comparator::new("Dartford/Gravesend", 6124.0),
                Comparator::new("East Tilbury", 3724.0),
            ],
            why: "Commuting costs meet/exceed many fringe routes.".into(),
        },
        EvidenceItem {
            key: "council-tax-band-d".into(),
            group: Group::Cost,
            severity: Severity::Medium,
            domain: "Council Tax (Band D)".into(),
            medway: Measure::Currency {
                value: 2008.56,
                route: None,
                period: Some(Period::CouncilTax2324),
            },
            trend: Trend::Up,
            comparators: vec![
                Comparator::new("Thurrock", 1898.91),
                Comparator::new("Dartford", 2077.98),
                Comparator::new("Gravesham", 2103.76),
            ],
            why: "Fixed local costs add to affordability pressure.".into(),
        },
        EvidenceItem {
            key: "nurse-turnover".into(),
            group: Group::Workforce,
            severity: Severity::High,
            domain: "Nurse turnover (annual)".into(),
            medway: Measure::Percent {
                value: 14.0,
                approx: true,
                period: Some(Period::Workforce12m),
            },
            trend: Trend::Up,
            comparators: vec![Comparator {
                area: "Nearby fringe trusts".into(),
                value: 11.0,
                approx_range: Some("10–12%".into()),
            }],
            why: "Pay differential incentivises moves to fringe/outer-London.".into(),
        },
        EvidenceItem {
            key: "nurse-vacancy-trend".into(),
            group: Group::Workforce,
            severity: Severity::Improving,
            domain: "Nurse vacancy (trend)".into(),
            medway: Measure::RangePercent { from: 34.0, to: 9.0 },
            trend: Trend::Down,
            comparators: vec![],
            why: "Gains fragile without competitive allowance.".into(),
        },
    ]
}

/// Display rows for the evidence table, in authoring order.
pub fn evidence_rows() -> Vec<EvidenceRecord> {
    super::records_from_items(&evidence_items())
}

pub fn sources() -> Vec<Source> {
    vec![
        Source::new(
            "HPI",
            "HPI",
            "ONS / Land Registry — UK House Price Index (Medway, Dartford, Gravesham, Thurrock)",
            "https://www.gov.uk/government/collections/uk-house-price-index-reports",
            SourceKind::Cost,
        ),
        Source::new("Rent", "Rent", "ONS Private Rental Market statistics", "https://www.ons.gov.uk", SourceKind::Cost),
        Source::new(
            "Rail",
            "Rail",
            "Southeastern & c2c season ticket fares; Kent Online coverage",
            "https://www.southeasternrailway.co.uk",
            SourceKind::Cost,
        ),
        Source::new(
            "CouncilTax",
            "CouncilTax",
            "Local authority Band D schedules; local.gov.uk",
            "https://www.local.gov.uk",
            SourceKind::Cost,
        ),
        Source::new(
            "Workforce",
            "Workforce",
            "Trust board papers / ESR workforce KPIs (Medway, DGT, etc.)",
            "",
            SourceKind::Workforce,
        ),
        Source::new(
            "Policy",
            "Policy",
            "NHS Agenda for Change Handbook; NHSPRB reports; DHSC statements",
            "https://www.nhsemployers.org",
            SourceKind::Policy,
        ),
    ]
}

pub fn verify_steps() -> Vec<VerifyStep> {
    let hpi_period = format!("Match period {}", Period::Hpi.label());
    vec![
        VerifyStep::new(
            "house-prices",
            "House prices",
            &[
                "Download LA series for Medway, Dartford, Gravesham, Thurrock",
                "Compute YoY = (t - t-12) / t-12",
                hpi_period.as_str(),
            ],
        ),
        VerifyStep::new(
            "private-rent",
            "Private rent",
            &[
                "Use ONS PRMS median monthly rent",
                "Compute Jan-2025 vs Jan-2024 YoY",
                "State property mix if used",
            ],
        ),
        VerifyStep::new(
            "rail-fares",
            "Rail fares",
            &[
                "Quote standard annual season only",
                "Record fare code/date",
                "Flag HS1 vs classic products",
            ],
        ),
        VerifyStep::new(
            "council-tax",
            "Council Tax",
            &["Use 2023/24 Band D for each LA", "Note parish/precept if applicable"],
        ),
        VerifyStep::new(
            "workforce",
            "Workforce",
            &[
                "Use same definitions for vacancy/turnover across trusts",
                "12-month window; ESR metric notes",
            ],
        ),
        VerifyStep::new(
            "catchment",
            "Catchment",
            &["HES/SUS by postcode share", "Stroke/UEC planning docs for cross-boundary flows"],
        ),
    ]
}
