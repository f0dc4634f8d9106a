//! Rule-based field extractors for the Russian receipt layout.

pub mod amounts;
pub mod header;
pub mod items;
pub mod numbering;
pub mod patterns;
pub mod totals;

pub use amounts::{parse_amount, parse_amount_field};
pub use header::{extract_header, HeaderFields};
pub use items::{extract_positions, ItemRows};
pub use numbering::{NumberingExtractor, NumberingFields};
pub use totals::{FiscalDetails, FiscalDetailsExtractor, TotalsBlock, TotalsExtractor};

use super::sections::Section;

/// Trait for extractors that read one receipt section.
pub trait SectionExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract fields from the section.
    fn extract(&self, section: &Section) -> Self::Output;
}
