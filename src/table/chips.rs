//! Derived display chips for evidence rows
//!
//! Everything here is computed from the formatted strings of a record, so
//! the same derivation works for rows authored by hand and rows generated
//! from structured items.

use crate::evidence::format::{fmt_gbp, fmt_percent};
use crate::evidence::{Severity, Trend};
use crate::table::SortKey;
use serde::Serialize;

/// Visual tone shared by gap chips and trend pills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Higher than comparators: amber, risk.
    Up,
    /// Lower than comparators: green, improving.
    Down,
    Steady,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Up => "tone-up",
            Tone::Down => "tone-down",
            Tone::Steady => "tone-steady",
        }
    }
}

/// "vs fringe" delta between the subject value and the first comparator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapChip {
    pub text: String,
    pub tone: Tone,
}

/// First numeric token, ignoring thousands separators. A `-` counts only
/// when it directly precedes a digit.
pub fn first_number(s: &str) -> Option<f64> {
    let cleaned: Vec<char> = s.chars().filter(|&c| c != ',').collect();
    let start = cleaned.iter().position(|c| c.is_ascii_digit())?;

    let negative = start > 0 && cleaned[start - 1] == '-';
    let mut end = start;
    while end < cleaned.len() && cleaned[end].is_ascii_digit() {
        end += 1;
    }
    // fractional part only when a digit follows the point
    if end + 1 < cleaned.len() && cleaned[end] == '.' && cleaned[end + 1].is_ascii_digit() {
        end += 1;
        while end < cleaned.len() && cleaned[end].is_ascii_digit() {
            end += 1;
        }
    }

    let token: String = cleaned[start..end].iter().collect();
    let value: f64 = token.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Compute the gap chip, or `None` when either side has no number.
pub fn gap_chip(medway: &str, comparators: &str) -> Option<GapChip> {
    let subject = first_number(medway)?;
    let comparator = first_number(comparators)?;
    let diff = subject - comparator;

    let formatted = if medway.contains('£') {
        fmt_gbp(diff)
    } else if medway.contains('%') {
        fmt_percent(diff, 1)
    } else {
        diff.to_string()
    };

    let tone = if diff > 0.0 {
        Tone::Up
    } else if diff < 0.0 {
        Tone::Down
    } else {
        Tone::Steady
    };

    let sign = if diff > 0.0 { "+" } else { "" };
    Some(GapChip { text: format!("{}{}", sign, formatted), tone })
}

/// Subject value split into its main text and parenthetical period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueParts {
    pub main: String,
    pub period: Option<String>,
}

pub fn parse_value_parts(value: &str) -> ValueParts {
    let open = value.find('(');
    let close = open.and_then(|o| value[o..].find(')').map(|c| o + c));

    match (open, close) {
        (Some(o), Some(c)) if c > o + 1 => {
            let period = value[o + 1..c].to_string();
            let mut main = String::with_capacity(value.len());
            main.push_str(&value[..o]);
            main.push_str(&value[c + 1..]);
            ValueParts { main: collapse_spaces(&main), period: Some(period) }
        }
        _ => ValueParts { main: value.to_string(), period: None },
    }
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Steady,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "Higher pressure",
            Direction::Down => "Improving",
            Direction::Steady => "Steady",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Direction::Up => Tone::Up,
            Direction::Down => Tone::Down,
            Direction::Steady => Tone::Steady,
        }
    }
}

/// Severity decides the pill when it is explicit; then the authored trend;
/// otherwise the main text is inspected for trend markers.
pub fn trend_direction(severity: Option<Severity>, trend: Option<Trend>, main: &str) -> Option<Direction> {
    match severity {
        Some(Severity::High) => Some(Direction::Up),
        Some(Severity::Improving) => Some(Direction::Down),
        Some(Severity::Medium) => Some(Direction::Steady),
        Some(Severity::Low) | None => trend.map(Direction::from).or_else(|| infer_direction(main)),
    }
}

impl From<Trend> for Direction {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Up => Direction::Up,
            Trend::Down => Direction::Down,
            Trend::Steady => Direction::Steady,
        }
    }
}

fn infer_direction(main: &str) -> Option<Direction> {
    if main.is_empty() {
        return None;
    }
    let s = main.to_lowercase();
    if s.contains("improving") || s.contains('↓') {
        Some(Direction::Down)
    } else if s.contains("higher pressure") || s.contains('+') || s.contains('↑') {
        Some(Direction::Up)
    } else if s.contains("steady") || s.contains('~') || s.contains('≈') {
        Some(Direction::Steady)
    } else {
        None
    }
}

/// Piece of a value string after badge tokenisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Fragment {
    Text(String),
    Badge(String),
    Arrow,
}

/// Split on whitespace (keeping it) and classify numeric tokens as badges.
pub fn badge_fragments(value: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut in_space = false;

    for c in value.chars() {
        let is_space = c.is_whitespace();
        if !current.is_empty() && is_space != in_space {
            fragments.push(classify(std::mem::take(&mut current)));
        }
        in_space = is_space;
        current.push(c);
    }
    if !current.is_empty() {
        fragments.push(classify(current));
    }
    fragments
}

fn classify(part: String) -> Fragment {
    let token = part.trim();
    if is_percent_token(token) || is_gbp_token(token) {
        Fragment::Badge(part)
    } else if token == "→" || token == "->" {
        Fragment::Arrow
    } else {
        Fragment::Text(part)
    }
}

// ^\+?-?\d+(\.\d+)?%$
fn is_percent_token(token: &str) -> bool {
    let Some(body) = token.strip_suffix('%') else {
        return false;
    };
    let body = body.strip_prefix('+').unwrap_or(body);
    let body = body.strip_prefix('-').unwrap_or(body);
    let (int, frac) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(int) && frac.map_or(true, digits)
}

// ^~?£\s?\d
fn is_gbp_token(token: &str) -> bool {
    let token = token.strip_prefix('~').unwrap_or(token);
    let Some(rest) = token.strip_prefix('£') else {
        return false;
    };
    let rest = rest.strip_prefix(char::is_whitespace).unwrap_or(rest);
    rest.chars().next().is_some_and(|c| c.is_ascii_digit())
}

pub fn domain_icon(domain: &str) -> &'static str {
    let d = domain.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| d.contains(w));
    if has(&["council", "band"]) {
        "🪙"
    } else if has(&["house", "price"]) {
        "🏠"
    } else if has(&["rent"]) {
        "📈"
    } else if has(&["rail", "ticket", "transport"]) {
        "🚆"
    } else if has(&["turnover"]) {
        "🔄"
    } else if has(&["vacancy"]) {
        "📉"
    } else {
        "🔹"
    }
}

/// What an interactive chip does when activated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum ChipAction {
    Link(String),
    Sort(SortKey),
}

/// Chips render through one of two explicit paths: display-only, or
/// carrying an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum Chip {
    Static { label: String, tone: Tone },
    Interactive { label: String, tone: Tone, action: ChipAction },
}

impl Chip {
    pub fn label(&self) -> &str {
        match self {
            Chip::Static { label, .. } | Chip::Interactive { label, .. } => label,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Chip::Interactive { .. })
    }
}
