//! Configuration structures for the receipt parser.

use serde::{Deserialize, Serialize};

/// Main configuration for chek.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChekConfig {
    /// Parser configuration.
    pub parser: ParserConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Receipt parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Fail when a structural anchor (heading, table, a section) is missing.
    /// When false, missing pieces are defaulted and reported as diagnostics.
    pub strict_structure: bool,

    /// Fail on unparseable numbers and short item rows instead of
    /// defaulting them to zero.
    pub strict_fields: bool,

    /// Look sections up by ordinal position (1 = date, 3 = totals,
    /// 4 = fiscal details) instead of by landmark.
    pub positional_sections: bool,

    /// Emit the text after the last divider as a section of its own.
    pub flush_trailing_section: bool,

    /// Literal divider text that separates sections.
    pub divider: String,

    /// Address reported when the receipt has none.
    pub address_placeholder: String,

    /// Maximum accepted HTML size in bytes.
    pub max_input_bytes: usize,

    /// Maximum element nesting depth.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict_structure: true,
            strict_fields: false,
            positional_sections: false,
            flush_trailing_section: true,
            divider: DEFAULT_DIVIDER.to_string(),
            address_placeholder: DEFAULT_ADDRESS_PLACEHOLDER.to_string(),
            max_input_bytes: 4 * 1024 * 1024,
            max_depth: 256,
        }
    }
}

impl ParserConfig {
    /// Settings that reproduce the historical permissive output: positional
    /// sections, no trailing flush, no structural failures.
    pub fn legacy() -> Self {
        Self {
            strict_structure: false,
            strict_fields: false,
            positional_sections: true,
            flush_trailing_section: false,
            ..Self::default()
        }
    }
}

/// Section divider printed by the verification service (32 dashes).
pub const DEFAULT_DIVIDER: &str = "--------------------------------";

/// Placeholder printed by the verification service for a missing address.
pub const DEFAULT_ADDRESS_PLACEHOLDER: &str = "Адрес не указан";

/// Output configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Print diagnostics to stderr after parsing.
    pub show_diagnostics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            show_diagnostics: false,
        }
    }
}

impl ChekConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
