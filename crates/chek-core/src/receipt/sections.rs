//! Divider-based segmentation of the receipt text stream.

use serde::Serialize;
use tracing::debug;

use super::rules::patterns::{
    DETAIL_SEPARATOR, FD_KEY, FN_KEY, FPD_KEYS, INN_LABEL, ITEMS_HEADINGS, KKT_REG_NUMBER_KEY,
    LABEL_VALUE, RECEIPT_NUMBER_PREFIX, TIMESTAMP_LINE, TOTAL_LABEL,
};

/// Logical region of the printed receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Merchant name, address and INN.
    Header,
    /// Timestamp, receipt number, shift number and cashier.
    DateNumbering,
    /// Operation heading and the item table.
    Items,
    /// `label: amount` totals.
    Totals,
    /// Fiscal identifiers.
    FiscalDetails,
    /// Anything else (QR caption, buttons).
    Other,
}

impl SectionKind {
    /// Ordinal index of this section in the canonical five-section layout.
    pub fn legacy_position(self) -> Option<usize> {
        match self {
            Self::Header => Some(0),
            Self::DateNumbering => Some(1),
            Self::Items => Some(2),
            Self::Totals => Some(3),
            Self::FiscalDetails => Some(4),
            Self::Other => None,
        }
    }
}

/// Text between two dividers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Landmark-based classification.
    pub kind: SectionKind,
    /// Trimmed, non-empty fragments in document order.
    pub lines: Vec<String>,
}

impl Section {
    /// Build a section and classify it.
    pub fn new(lines: Vec<String>) -> Self {
        let kind = classify(&lines);
        Self { kind, lines }
    }

    /// Lines joined by newline.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Segmentation settings.
#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions<'a> {
    /// Literal divider text.
    pub divider: &'a str,
    /// Emit the content after the last divider.
    pub flush_trailing: bool,
}

/// Split text fragments into sections at every fragment equal to the divider.
///
/// Fragments are trimmed; empty ones are skipped. A divider with nothing
/// accumulated before it produces no section.
pub fn segment<I, S>(fragments: I, options: &SegmentOptions<'_>) -> Vec<Section>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sections = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for fragment in fragments {
        let text = fragment.as_ref().trim();
        if text == options.divider {
            if !current.is_empty() {
                sections.push(Section::new(std::mem::take(&mut current)));
            }
        } else if !text.is_empty() {
            current.push(text.to_string());
        }
    }

    if !current.is_empty() {
        if options.flush_trailing {
            sections.push(Section::new(current));
        } else {
            debug!("Dropping {} fragments after the last divider", current.len());
        }
    }

    debug!(
        "Segmented {} sections: {:?}",
        sections.len(),
        sections.iter().map(|s| s.kind).collect::<Vec<_>>()
    );

    sections
}

/// Classify a section by the first landmark it contains.
pub fn classify(lines: &[String]) -> SectionKind {
    if any_line(lines, |l| TIMESTAMP_LINE.is_match(l) || l.starts_with(RECEIPT_NUMBER_PREFIX)) {
        SectionKind::DateNumbering
    } else if any_line(lines, |l| {
        LABEL_VALUE
            .captures(l)
            .is_some_and(|caps| caps[1].trim() == TOTAL_LABEL)
    }) {
        SectionKind::Totals
    } else if any_line(lines, |l| {
        l.split_once(DETAIL_SEPARATOR)
            .map(|(key, _)| key.trim())
            .is_some_and(is_fiscal_key)
    }) {
        SectionKind::FiscalDetails
    } else if any_line(lines, |l| l.starts_with(INN_LABEL)) {
        SectionKind::Header
    } else if any_line(lines, |l| ITEMS_HEADINGS.contains(&l)) {
        SectionKind::Items
    } else {
        SectionKind::Other
    }
}

fn any_line(lines: &[String], pred: impl Fn(&str) -> bool) -> bool {
    lines.iter().any(|l| pred(l))
}

fn is_fiscal_key(key: &str) -> bool {
    key == KKT_REG_NUMBER_KEY || key == FN_KEY || key == FD_KEY || FPD_KEYS.contains(&key)
}

/// Section lookup by kind.
#[derive(Debug, Clone)]
pub struct SectionIndex {
    sections: Vec<Section>,
    positional: bool,
}

impl SectionIndex {
    /// Index sections by landmark, or by ordinal position when `positional`.
    pub fn new(sections: Vec<Section>, positional: bool) -> Self {
        Self {
            sections,
            positional,
        }
    }

    /// The section holding `kind`, if any.
    pub fn find(&self, kind: SectionKind) -> Option<&Section> {
        if self.positional {
            kind.legacy_position().and_then(|i| self.sections.get(i))
        } else {
            self.sections.iter().find(|s| s.kind == kind)
        }
    }

    /// Kinds of all sections, in order.
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
