//! Receipt parsing: segmentation, field extraction and assembly.

mod parser;
pub mod rules;
pub mod sections;

pub use parser::{HtmlReceiptParser, ParseOutcome};
pub use sections::{Section, SectionIndex, SectionKind};

use serde::Serialize;

use crate::error::Result;
use crate::models::receipt::ReceiptData;

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt HTML document.
    fn parse(&self, html: &str) -> Result<ParseOutcome>;

    /// Parse and keep only the record.
    fn parse_receipt(&self, html: &str) -> Result<ReceiptData> {
        self.parse(html).map(|outcome| outcome.receipt)
    }
}

/// Parse with the default configuration.
pub fn parse_receipt(html: &str) -> Result<ReceiptData> {
    HtmlReceiptParser::new().parse_receipt(html)
}

/// Category of a recoverable defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A structural anchor was missing and its fields were defaulted.
    MissingAnchor,
    /// A single field was not found.
    MissingField,
    /// A number could not be parsed and was set to zero.
    FieldParse,
    /// A section had fewer lines than its layout.
    PartialSection,
    /// An item row had fewer cells than its layout.
    PartialRow,
}

/// A defect the parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
