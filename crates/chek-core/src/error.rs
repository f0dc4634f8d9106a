//! Error types for the chek-core library.

use thiserror::Error;

/// Main error type for the chek library.
#[derive(Error, Debug)]
pub enum ChekError {
    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Input rejected by the document load guards.
    #[error("input limit exceeded: {0}")]
    Limit(#[from] LimitError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while loading the HTML document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// The input is larger than the configured maximum.
    #[error("document is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },

    /// Elements are nested deeper than the configured maximum.
    #[error("document nesting exceeds depth {limit}")]
    TooDeep { limit: usize },
}

/// Errors related to receipt field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A structural anchor of the receipt layout is missing.
    #[error("malformed receipt document: missing {anchor}")]
    MalformedDocument { anchor: &'static str },

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value:?}")]
    Field { field: String, value: String },

    /// An item row has fewer cells than the layout requires.
    #[error("item row {row} has {cells} cells, expected 5")]
    PartialRow { row: usize, cells: usize },
}

/// Result type for the chek library.
pub type Result<T> = std::result::Result<T, ChekError>;
