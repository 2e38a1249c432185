//! Numeric-aware, base-level string collation for en-GB
//!
//! Characters compare by class first: whitespace, then punctuation and
//! symbols, then digits, then letters. Runs of ASCII digits compare by
//! numeric value, so "item 2" sorts before "item 10". Letters compare on
//! their base form, so case and accents are ignored ("éclair" and "Eclair"
//! are equal). Equal strings keep input order under a stable sort.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// ASCII punctuation and symbols in root collation order.
const ASCII_SYMBOL_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Weight {
    Space,
    Symbol(u32),
    Digit,
    Letter(char),
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_digits(&mut left);
                let rn = take_digits(&mut right);
                let ord = cmp_digit_runs(&ln, &rn);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ord = weight(l).cmp(&weight(r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn weight(c: char) -> Weight {
    if c.is_whitespace() {
        Weight::Space
    } else if c.is_ascii_digit() {
        Weight::Digit
    } else if c.is_alphanumeric() {
        Weight::Letter(base_letter(c))
    } else {
        match ASCII_SYMBOL_ORDER.find(c) {
            Some(pos) => Weight::Symbol(pos as u32),
            None => Weight::Symbol(ASCII_SYMBOL_ORDER.len() as u32 + c as u32),
        }
    }
}

/// Lowercase with the common Latin diacritics removed.
fn base_letter(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'à'..='å' | 'ā' | 'ă' | 'ą' | 'æ' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ł' | 'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'œ' => 'o',
        'ŕ' | 'ř' => 'r',
        'ß' | 'ś' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
