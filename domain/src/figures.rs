//! Pattern-based extraction of financial figures, and the advisory
//! numeric validator built on top of it.
//!
//! Three independent pattern families: currency amounts, percentages and
//! comma-grouped numbers. Matches are returned family by family (all
//! currency first, then percentages, then grouped numbers), in document
//! order within a family, duplicates preserved. Downstream comparisons
//! rely on this exact ordering.

use once_cell::sync::Lazy;
use regex::Regex;

/// Currency amounts: $123,456.78 or $123.4 million/billion/trillion.
/// The magnitude suffix is matched case-insensitively.
static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$[\d,]+\.?\d*\s*(?:million|billion|trillion)?").unwrap()
});

/// Percentages: 12.5% (optional whitespace before the sign).
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d*\s*%").unwrap());

/// Numbers in standard thousands grouping, at least one comma required.
/// Bare 1-3 digit numbers and ungrouped 4+ digit runs (years, page
/// numbers) deliberately never match.
static GROUPED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?").unwrap());

/// Extract every financial figure token from `text`.
///
/// A grouped-number candidate whose span lies inside an already matched
/// currency or percentage token is skipped, so "$1,234.56 million" is
/// one figure, not two.
pub fn extract_figures(text: &str) -> Vec<String> {
    let mut figures = Vec::new();
    let mut reserved: Vec<(usize, usize)> = Vec::new();

    for m in CURRENCY.find_iter(text) {
        reserved.push((m.start(), m.end()));
        figures.push(m.as_str().to_string());
    }
    for m in PERCENTAGE.find_iter(text) {
        reserved.push((m.start(), m.end()));
        figures.push(m.as_str().to_string());
    }
    for m in GROUPED_NUMBER.find_iter(text) {
        let overlaps = reserved
            .iter()
            .any(|&(start, end)| m.start() < end && start < m.end());
        if !overlaps {
            figures.push(m.as_str().to_string());
        }
    }
    figures
}

/// Advisory check that every figure in a generated answer appears
/// verbatim in the supplied context.
///
/// Matching is exact-string, not numeric-value: "$1,000" does not match
/// "$1,000.00". That can produce false negatives on formatting
/// differences, which is accepted — normalizing could mask a genuinely
/// fabricated figure.
pub fn is_supported(answer: &str, context: &str) -> bool {
    let context_figures = extract_figures(context);
    extract_figures(answer)
        .iter()
        .all(|figure| context_figures.contains(figure))
}
