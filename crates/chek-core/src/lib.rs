//! Core library for fiscal receipt HTML parsing.
//!
//! This crate provides:
//! - Tolerant HTML loading with input size and nesting guards
//! - Divider-based segmentation of the printed receipt into tagged sections
//! - Field extraction for the Russian receipt layout (header, numbering,
//!   item table, totals, fiscal identifiers)
//! - Receipt data models serializable to the historical JSON shape

pub mod error;
pub mod html;
pub mod models;
pub mod receipt;

pub use error::{ChekError, ExtractionError, LimitError, Result};
pub use html::{LoadLimits, ReceiptDocument};
pub use models::config::{ChekConfig, ParserConfig};
pub use models::query::FiscalQuery;
pub use models::receipt::{ReceiptData, ReceiptPosition};
pub use receipt::{
    parse_receipt, Diagnostic, DiagnosticKind, HtmlReceiptParser, ParseOutcome, ReceiptParser,
    SectionKind,
};
