//! Date/numbering block: timestamp, receipt number, shift number, cashier.

use tracing::trace;

use super::patterns::{CASHIER_PREFIX, RECEIPT_NUMBER_PREFIX, SHIFT_NUMBER_PREFIX};
use super::SectionExtractor;
use crate::receipt::sections::Section;

/// Number of lines the block is printed with.
pub const NUMBERING_LINES: usize = 4;

/// Fields of the date/numbering block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingFields {
    pub datetime: String,
    pub receipt_number: String,
    pub shift_number: String,
    pub cashier: String,
    /// Lines absent from the block, defaulted to empty strings.
    pub missing_lines: usize,
}

/// Reads the four fixed lines of the date/numbering block by position.
pub struct NumberingExtractor;

impl NumberingExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumberingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionExtractor for NumberingExtractor {
    type Output = NumberingFields;

    fn extract(&self, section: &Section) -> NumberingFields {
        let line = |i: usize| section.lines.get(i).map(String::as_str).unwrap_or("");

        let fields = NumberingFields {
            datetime: line(0).trim().to_string(),
            receipt_number: strip_prefix(line(1), RECEIPT_NUMBER_PREFIX),
            shift_number: strip_prefix(line(2), SHIFT_NUMBER_PREFIX),
            cashier: strip_prefix(line(3), CASHIER_PREFIX),
            missing_lines: NUMBERING_LINES.saturating_sub(section.lines.len()),
        };

        trace!("Numbering block: {:?}", fields);
        fields
    }
}

/// Remove a literal label prefix and trim.
pub fn strip_prefix(line: &str, prefix: &str) -> String {
    let line = line.trim();
    line.strip_prefix(prefix).unwrap_or(line).trim().to_string()
}
