//! Number and measure formatting
//!
//! Percentages use one decimal place with a trailing `.0` dropped
//! (`3.0` → `3%`, `2.5` → `2.5%`). GBP amounts follow en-GB conventions:
//! `£` prefix, comma thousands separators, minus sign before the symbol.

use super::{EvidenceItem, Measure};
use std::fmt::Write;

/// Format a percentage with `dp` decimals, dropping a trailing `.0`.
pub fn fmt_percent(value: f64, dp: usize) -> String {
    // normalise -0.0 so it never prints as "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    let mut s = format!("{:.*}", dp, value);
    if s.ends_with(".0") {
        s.truncate(s.len() - 2);
    }
    s.push('%');
    s
}

/// Percentage with optional `+` for positive values and `~` approximation mark.
pub fn signed_percent(value: f64, plus: bool, approx: bool) -> String {
    let prefix = if plus && value > 0.0 { "+" } else { "" };
    let approx_mark = if approx { "~" } else { "" };
    format!("{}{}{}", approx_mark, prefix, fmt_percent(value, 1))
}

/// GBP with no decimals, as used by chart ticks, tooltips and gap chips.
pub fn fmt_gbp(value: f64) -> String {
    format_gbp(value, 0)
}

/// GBP with a fixed number of decimals (rounded half away from zero).
pub fn format_gbp(value: f64, decimals: u32) -> String {
    let factor = 10u64.pow(decimals);
    let scaled = (value.abs() * factor as f64).round() as u64;
    let whole = scaled / factor;
    let frac = scaled % factor;

    let mut out = String::new();
    if value < 0.0 && scaled != 0 {
        out.push('-');
    }
    out.push('£');
    out.push_str(&group_thousands(whole));
    if decimals > 0 {
        let _ = write!(out, ".{:0width$}", frac, width = decimals as usize);
    }
    out
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Render the subject value the way the evidence table shows it.
pub fn medway_for_table(measure: &Measure) -> String {
    match measure {
        Measure::Percent { value, approx, period } => {
            let main = signed_percent(*value, true, *approx);
            with_period(main, period.map(|p| p.label()))
        }
        Measure::Mixed { yoy, level, period } => {
            let main = format!("{} to {}", signed_percent(*yoy, true, false), format_gbp(*level, 2));
            with_period(main, period.map(|p| p.label()))
        }
        Measure::Currency { value, route, period } => {
            let value = format_gbp(*value, 2);
            let inner: Vec<&str> = route
                .as_deref()
                .into_iter()
                .chain(period.map(|p| p.label()))
                .collect();
            if inner.is_empty() {
                value
            } else {
                format!("{} ({})", value, inner.join("; "))
            }
        }
        Measure::RangePercent { from, to } => {
            format!("{} → {}", fmt_percent(*from, 1), fmt_percent(*to, 1))
        }
    }
}

fn with_period(main: String, period: Option<&str>) -> String {
    match period {
        Some(label) => format!("{} ({})", main, label),
        None => main,
    }
}

/// Render the comparator list as `Area value; Area value`.
pub fn comparators_for_table(item: &EvidenceItem) -> String {
    if item.comparators.is_empty() {
        return "—".to_string();
    }

    let percent_like = item.medway.is_percent_like();
    let plus = !matches!(item.medway, Measure::RangePercent { .. });

    item.comparators
        .iter()
        .map(|c| {
            let value = if percent_like {
                match &c.approx_range {
                    Some(range) => range.clone(),
                    None => signed_percent(c.value, plus, false),
                }
            } else {
                format_gbp(c.value, 2)
            };
            format!("{} {}", c.area, value)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
