//! Value encoding for predicate literals.
//!
//! Every value that reaches the predicate text passes through [`encode`]. A
//! numeric field whose value parses as a finite number is emitted bare;
//! everything else becomes a single-quoted literal with `\` and `'` escaped.

use std::fmt;

use super::field_type::FieldType;

/// A literal ready to be embedded in a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A finite number, rendered without quotes.
    Number(f64),
    /// A string, rendered quoted and escaped.
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display never uses exponent notation and prints whole
            // numbers without a fractional part, e.g. 2020.0 -> "2020".
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{}'", escape_string(s)),
        }
    }
}

/// Escape a string for use inside a single-quoted literal.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Parse a value as a finite number.
///
/// Only plain decimal spellings are accepted; `inf`, `NaN` and friends are not
/// numbers here even though `f64::from_str` accepts them.
#[must_use]
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let looks_numeric = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Encode a single value according to its field type.
#[must_use]
pub fn encode(value: &str, field_type: FieldType) -> Literal {
    match field_type {
        FieldType::Numeric => {
            parse_number(value).map_or_else(|| Literal::Text(value.to_owned()), Literal::Number)
        }
        FieldType::String => Literal::Text(value.to_owned()),
    }
}

/// Encode several values and join them for an `IN (...)` list.
#[must_use]
pub fn encode_list(values: &[String], field_type: FieldType) -> String {
    values
        .iter()
        .map(|v| encode(v, field_type).to_string())
        .collect::<Vec<_>>()
        .join(",")
}
