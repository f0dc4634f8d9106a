//! Amount parsing for receipt numbers printed as `1,250.00`.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;

/// Parse a receipt amount.
///
/// Commas are thousands separators and are dropped, the dot is the decimal
/// point. Returns `None` for empty, malformed or negative input.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}

/// Parse an amount, naming the field on failure.
pub fn parse_amount_field(field: &str, value: &str) -> Result<Decimal, ExtractionError> {
    parse_amount(value).ok_or_else(|| ExtractionError::Field {
        field: field.to_string(),
        value: value.to_string(),
    })
}
