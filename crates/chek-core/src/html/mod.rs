//! HTML document loading.

mod document;

pub use document::ReceiptDocument;

use crate::error::LimitError;
use crate::models::config::ParserConfig;

/// Result type for document loading.
pub type Result<T> = std::result::Result<T, LimitError>;

/// Guards applied before and after the HTML is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    /// Maximum input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum element nesting depth.
    pub max_depth: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self::from(&ParserConfig::default())
    }
}

impl From<&ParserConfig> for LoadLimits {
    fn from(config: &ParserConfig) -> Self {
        Self {
            max_input_bytes: config.max_input_bytes,
            max_depth: config.max_depth,
        }
    }
}
