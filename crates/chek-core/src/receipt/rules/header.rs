//! Merchant name, address and INN.

use super::patterns::{ADDRESS_LABEL, ADDRESS_MISSING_MARKER, INN_LABEL};
use crate::html::ReceiptDocument;

/// Header fields read straight from the document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    /// First heading text, `None` when the document has no heading.
    pub institution: Option<String>,
    /// Address value, `None` when absent or printed as "не указан".
    pub address: Option<String>,
    /// Tax ID, `None` when the INN line is missing or has no value.
    pub inn: Option<String>,
}

/// Extract header fields from the document.
pub fn extract_header(doc: &ReceiptDocument) -> HeaderFields {
    HeaderFields {
        institution: doc.first_heading().filter(|s| !s.is_empty()),
        address: doc
            .labeled_line(ADDRESS_LABEL)
            .and_then(|line| address_value(&line)),
        inn: doc.labeled_line(INN_LABEL).and_then(|line| inn_value(&line)),
    }
}

/// Address text after the label.
pub fn address_value(line: &str) -> Option<String> {
    let value = strip_label(line, ADDRESS_LABEL);
    if value.is_empty() || value.to_lowercase() == ADDRESS_MISSING_MARKER {
        return None;
    }
    Some(value.to_string())
}

/// The token after the INN label; padding after the number is ignored.
pub fn inn_value(line: &str) -> Option<String> {
    strip_label(line, INN_LABEL)
        .split_whitespace()
        .next()
        .map(str::to_string)
}

fn strip_label<'a>(line: &'a str, label: &str) -> &'a str {
    let line = line.trim();
    line.strip_prefix(label)
        .unwrap_or(line)
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .trim_end()
}
