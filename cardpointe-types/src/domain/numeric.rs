//! Normalization of numeric fields the gateway sends as strings.
//!
//! Amounts arrive formatted (`"5.00"`, `"$12.34"`). Every non-digit
//! character is stripped and the remaining digits are read as an integer,
//! so two-decimal amounts land as minor units (`"5.00"` becomes `500`).
//! This is a digit strip, not a decimal parse: `"5.5"` becomes `55`.

use super::attributes::{Attributes, Value};

/// Reads the digits of `raw` in order as an integer.
///
/// A string without digits reads as `0`. Returns `None` when the digits do
/// not fit in an `i64`.
pub fn digits_to_int(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

/// Normalizes each of `fields` that currently holds a string.
///
/// Integers and other non-string values are left as they are.
pub fn normalize(attrs: &mut Attributes, fields: &[&str]) {
    for field in fields {
        let raw = match attrs.get(field) {
            Some(Value::String(raw)) => raw.clone(),
            _ => continue,
        };
        match digits_to_int(&raw) {
            Some(number) => {
                attrs.set(*field, number);
            }
            None => {
                tracing::warn!(field = *field, value = %raw, "numeric field out of range, left as string");
            }
        }
    }
}
