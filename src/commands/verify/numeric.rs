use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::coverage::chunk_corpus;
use super::report::{PASS_THRESHOLD_PERCENT, percent};
use crate::text::tokenize_decimal_spans;

/// Tokens of context captured on each side of a numeric assertion. The
/// flanking words disambiguate a value that recurs at unrelated places in
/// the source.
const CONTEXT_TOKENS: usize = 2;

/// Optional leading operator or approximation marker, then a decimal number.
/// A bare number with neither operator nor trailing unit is discarded; that
/// excludes clause numbers, years, and page numbers.
const NUMBER_PATTERN: &str =
    r"(?:(?P<op>[≥≤><±~≈]|약|[Aa]pprox(?:imately)?\.?)\s*)?(?P<num>\d+(?:\.\d+)?)";

/// Symbol units, tried longest-first. Tuned to the source document's
/// conventions.
const UNIT_SYMBOLS: [&str; 5] = ["°C", "℃", "‰", "%", "°"];

/// Letter units. A letter run after the number counts as a unit only when
/// the whole run is listed here, so ordinary words never pass as units.
const UNIT_WORDS: [&str; 26] = [
    "mm", "cm", "km", "m", "kg", "g", "t", "kN", "N", "MPa", "kPa", "GPa", "Hz", "kW", "W", "sec",
    "s", "min", "hr", "h", "deg", "mol", "L", "mL", "rpm", "kn",
];

#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedNumber {
    pub raw: String,
    pub key: String,
}

#[derive(Debug, Default)]
pub struct NumericOutcome {
    pub total_patterns: usize,
    pub skipped: usize,
    pub matched: usize,
    pub unmatched: Vec<UnmatchedNumber>,
}

impl NumericOutcome {
    pub fn checked(&self) -> usize {
        self.total_patterns - self.skipped
    }

    pub fn percent(&self) -> f64 {
        percent(self.matched, self.checked())
    }

    pub fn passed(&self) -> bool {
        self.percent() >= PASS_THRESHOLD_PERCENT
    }
}

/// Verifies that every numeric+unit assertion of the source survives, in
/// context, in the chunked output. Both sides use the decimal-aware
/// tokenizer over raw text: no lowercasing or normalization, so digits and
/// units must match exactly.
pub fn check_numeric(source_text: &str, chunks: &[Value]) -> Result<NumericOutcome> {
    let pattern =
        Regex::new(NUMBER_PATTERN).context("failed to compile numeric assertion regex")?;

    let corpus: String = tokenize_decimal_spans(&chunk_corpus(chunks))
        .into_iter()
        .map(|token| token.text)
        .collect();

    let tokens = tokenize_decimal_spans(source_text);

    let mut outcome = NumericOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();

    for captures in pattern.captures_iter(source_text) {
        let (Some(whole), Some(number)) = (captures.get(0), captures.name("num")) else {
            continue;
        };
        let operator = captures.name("op");

        let (unit, end) = match read_unit(source_text, number.end()) {
            Some((unit, end)) => (Some(unit), end),
            None => (None, number.end()),
        };

        if operator.is_none() && unit.is_none() {
            continue;
        }
        outcome.total_patterns += 1;

        let before_end = tokens.partition_point(|token| token.end <= whole.start());
        let before: String = tokens[before_end.saturating_sub(CONTEXT_TOKENS)..before_end]
            .iter()
            .map(|token| token.text.as_str())
            .collect();

        let after_start = tokens.partition_point(|token| token.start < end);
        let after_end = (after_start + CONTEXT_TOKENS).min(tokens.len());
        let after: String = tokens[after_start..after_end]
            .iter()
            .map(|token| token.text.as_str())
            .collect();

        // symbol-only units contribute nothing: the tokenizer never emits them
        let unit_letters: String = unit
            .as_deref()
            .unwrap_or("")
            .chars()
            .filter(|ch| ch.is_alphanumeric())
            .collect();

        let key = format!("{before}{}{unit_letters}{after}", number.as_str());
        if !seen.insert(key.clone()) {
            outcome.skipped += 1;
            continue;
        }

        if corpus.contains(&key) {
            outcome.matched += 1;
        } else {
            outcome.unmatched.push(UnmatchedNumber {
                raw: source_text[whole.start()..end].trim().to_string(),
                key,
            });
        }
    }

    Ok(outcome)
}

/// Reads a trailing unit starting at `from`, allowing at most one space
/// between number and unit. Returns the unit text and its end offset.
fn read_unit(text: &str, from: usize) -> Option<(String, usize)> {
    let rest = &text[from..];
    let offset = if rest.starts_with(' ') { 1 } else { 0 };
    let candidate = &rest[offset..];

    for symbol in UNIT_SYMBOLS {
        if candidate.starts_with(symbol) {
            return Some((symbol.to_string(), from + offset + symbol.len()));
        }
    }

    let run: String = candidate
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect();
    if !run.is_empty() && UNIT_WORDS.contains(&run.as_str()) {
        let end = from + offset + run.len();
        return Some((run, end));
    }

    None
}
