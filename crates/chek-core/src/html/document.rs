//! Receipt HTML tree built with scraper (html5ever).

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use super::{LoadLimits, Result};
use crate::error::LimitError;

lazy_static! {
    static ref HEADING: Selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    static ref TABLE: Selector = Selector::parse("table").unwrap();
    static ref IMAGE: Selector = Selector::parse("img[src]").unwrap();
}

/// Elements whose text never shows up on the printed receipt.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Elements that continue the current printed line instead of starting one.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "label", "mark", "nobr", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time",
    "u", "var", "wbr",
];

/// Row groups a table's own rows may sit in.
const ROW_GROUPS: &[&str] = &["thead", "tbody", "tfoot"];

/// A loaded receipt document.
///
/// Parsing is tolerant: malformed markup degrades to whatever tree html5ever
/// recovers, never to an error. Only the size and depth guards can fail.
pub struct ReceiptDocument {
    html: Html,
}

impl ReceiptDocument {
    /// Parse an HTML string, enforcing the load limits.
    pub fn parse(html: &str, limits: &LoadLimits) -> Result<Self> {
        if html.len() > limits.max_input_bytes {
            return Err(LimitError::InputTooLarge {
                size: html.len(),
                limit: limits.max_input_bytes,
            });
        }

        let html = Html::parse_document(html);
        if !html.errors.is_empty() {
            debug!("HTML parser recovered from {} errors", html.errors.len());
        }

        let document = Self { html };
        document.check_depth(limits.max_depth)?;
        Ok(document)
    }

    fn check_depth(&self, limit: usize) -> Result<()> {
        let mut stack = vec![(self.html.tree.root(), 0usize)];

        while let Some((node, depth)) = stack.pop() {
            if depth > limit {
                return Err(LimitError::TooDeep { limit });
            }
            for child in node.children() {
                if child.value().is_element() {
                    stack.push((child, depth + 1));
                }
            }
        }

        Ok(())
    }

    /// Printed lines in document order, trimmed and non-empty.
    ///
    /// A line is the text of a block element, or a run of text and inline
    /// elements between `<br>`s and block boundaries. Inline markup never
    /// splits a line.
    pub fn text_fragments(&self) -> Vec<String> {
        let mut lines = LineCollector::default();
        lines.walk(self.html.root_element());
        lines.finish()
    }

    /// Text of the first heading element, trimmed.
    pub fn first_heading(&self) -> Option<String> {
        self.html
            .select(&HEADING)
            .next()
            .map(element_text)
    }

    /// The first printed line whose text starts with `label`.
    pub fn labeled_line(&self, label: &str) -> Option<String> {
        let line = self
            .text_fragments()
            .into_iter()
            .find(|line| line.starts_with(label))?;
        trace!("Found line for label {:?}: {:?}", label, line);
        Some(line)
    }

    /// Cell texts of every row of the first table, header row included.
    ///
    /// Only the table's own rows and cells are read; tables nested inside a
    /// cell contribute to that cell's text. Returns `None` when the document
    /// has no table.
    pub fn first_table_rows(&self) -> Option<Vec<Vec<String>>> {
        let table = self.html.select(&TABLE).next()?;
        let rows = child_elements(table)
            .flat_map(|child| {
                if ROW_GROUPS.contains(&child.value().name()) {
                    child_elements(child).collect()
                } else {
                    vec![child]
                }
            })
            .filter(|row| row.value().name() == "tr")
            .map(|row| {
                child_elements(row)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(element_text)
                    .collect()
            })
            .collect();
        Some(rows)
    }

    /// `src` attributes of all images, in document order.
    pub fn image_sources(&self) -> Vec<&str> {
        self.html
            .select(&IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .collect()
    }
}

/// Splits the tree into printed lines.
#[derive(Default)]
struct LineCollector {
    lines: Vec<String>,
    current: String,
}

impl LineCollector {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.current.push_str(text);
                continue;
            }
            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };
            let name = child.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            if name == "br" {
                self.break_line();
            } else if INLINE_ELEMENTS.contains(&name) {
                self.walk(child);
            } else {
                self.break_line();
                self.walk(child);
                self.break_line();
            }
        }
    }

    fn break_line(&mut self) {
        let line = self.current.trim();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Concatenated text of an element and its descendants, trimmed.
fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
