//! HTML receipt parser: segmentation, extraction passes and record assembly.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result};
use crate::html::{LoadLimits, ReceiptDocument};
use crate::models::config::ParserConfig;
use crate::models::query::FiscalQuery;
use crate::models::receipt::ReceiptData;

use super::rules::{
    extract_header, extract_positions,
    numbering::NUMBERING_LINES,
    patterns::{CARD_LABEL, CASH_LABEL, TOTAL_LABEL, VAT10_LABEL, VAT18_LABEL},
    FiscalDetailsExtractor, NumberingExtractor, SectionExtractor, TotalsBlock, TotalsExtractor,
};
use super::sections::{segment, SectionIndex, SectionKind, SegmentOptions};
use super::{Diagnostic, DiagnosticKind, ReceiptParser};

/// Result of parsing one receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// The assembled record.
    pub receipt: ReceiptData,
    /// Recoverable defects, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Item rows with missing cells or unparseable numbers.
    pub defaulted_rows: usize,
    /// Kinds of the sections the document was split into.
    pub sections: Vec<SectionKind>,
    /// Verification key carried by the receipt's QR code, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_query: Option<FiscalQuery>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ParseOutcome {
    /// True when nothing was defaulted.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Receipt parser for the verification service's HTML layout.
#[derive(Debug, Clone, Default)]
pub struct HtmlReceiptParser {
    config: ParserConfig,
}

impl HtmlReceiptParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser from a configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Create a parser that reproduces the historical permissive output.
    pub fn legacy() -> Self {
        Self::with_config(ParserConfig::legacy())
    }

    /// Set structural strictness.
    pub fn with_strict_structure(mut self, strict: bool) -> Self {
        self.config.strict_structure = strict;
        self
    }

    /// Set field strictness.
    pub fn with_strict_fields(mut self, strict: bool) -> Self {
        self.config.strict_fields = strict;
        self
    }

    /// Set positional section lookup.
    pub fn with_positional_sections(mut self, positional: bool) -> Self {
        self.config.positional_sections = positional;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl ReceiptParser for HtmlReceiptParser {
    fn parse(&self, html: &str) -> Result<ParseOutcome> {
        let start = Instant::now();
        let mut report = Report::new(&self.config);

        info!("Parsing receipt from {} bytes of HTML", html.len());

        let doc = ReceiptDocument::parse(html, &LoadLimits::from(&self.config))?;

        let sections = segment(
            doc.text_fragments(),
            &SegmentOptions {
                divider: &self.config.divider,
                flush_trailing: self.config.flush_trailing_section,
            },
        );
        let index = SectionIndex::new(sections, self.config.positional_sections);

        // Header
        let header = extract_header(&doc);
        let institution = report.anchor(header.institution, "heading")?.unwrap_or_default();
        let address = header
            .address
            .unwrap_or_else(|| self.config.address_placeholder.clone());
        let inn = header.inn.unwrap_or_else(|| {
            report.note(DiagnosticKind::MissingField, "INN line not found");
            String::new()
        });

        // Date and numbering
        let numbering = report
            .anchor(index.find(SectionKind::DateNumbering), "date/numbering section")?
            .map(|section| NumberingExtractor::new().extract(section))
            .unwrap_or_default();
        if numbering.missing_lines > 0 {
            report.note(
                DiagnosticKind::PartialSection,
                format!(
                    "date/numbering section has {} of {} lines",
                    NUMBERING_LINES - numbering.missing_lines,
                    NUMBERING_LINES
                ),
            );
        }

        // Positions
        let rows = report
            .anchor(doc.first_table_rows(), "item table")?
            .unwrap_or_default();
        let items = extract_positions(&rows);
        for defect in items.defects {
            report.defect(defect)?;
        }

        // Totals
        let totals = report
            .anchor(index.find(SectionKind::Totals), "totals section")?
            .map(|section| TotalsExtractor::new().extract(section))
            .unwrap_or_default();
        debug!("Totals labels: {:?}", totals.labels().collect::<Vec<_>>());

        let total = report.amount(&totals, TOTAL_LABEL)?;
        let cash = report.amount(&totals, CASH_LABEL)?;
        let card = report.amount(&totals, CARD_LABEL)?;
        let tax18 = report.amount(&totals, VAT18_LABEL)?;
        let tax10 = report.amount(&totals, VAT10_LABEL)?;

        // Fiscal details
        let details_section = report.anchor(
            index.find(SectionKind::FiscalDetails),
            "fiscal details section",
        )?;
        let details = details_section
            .map(|section| FiscalDetailsExtractor::new().extract(section))
            .unwrap_or_default();

        let receipt = ReceiptData {
            institution,
            address,
            inn,
            datetime: numbering.datetime,
            receipt_number: numbering.receipt_number,
            shift_number: numbering.shift_number,
            cashier: numbering.cashier,
            positions: items.positions,
            total,
            cash,
            card,
            tax18,
            tax10,
            kkt_reg_number: details.kkt_reg_number().to_string(),
            fiscal_drive_number: details.fiscal_drive_number().to_string(),
            fiscal_document_number: details.fiscal_document_number().to_string(),
            fiscal_sign: details.fiscal_sign().to_string(),
        };

        if details_section.is_some() {
            for (name, value) in [
                ("fn", &receipt.fiscal_drive_number),
                ("fd", &receipt.fiscal_document_number),
                ("fpd", &receipt.fiscal_sign),
            ] {
                if value.is_empty() {
                    report.note(
                        DiagnosticKind::MissingField,
                        format!("fiscal details have no {name}"),
                    );
                }
            }
        }

        let fiscal_query = doc
            .image_sources()
            .into_iter()
            .find_map(FiscalQuery::from_qr_url);

        debug!(
            "Assembled receipt {} with {} positions from {} sections",
            receipt.receipt_number,
            receipt.positions.len(),
            index.len()
        );

        Ok(ParseOutcome {
            receipt,
            diagnostics: report.diagnostics,
            defaulted_rows: items.defaulted_rows,
            sections: index.kinds(),
            fiscal_query,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Applies the strictness settings and collects diagnostics.
struct Report<'c> {
    config: &'c ParserConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> Report<'c> {
    fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            diagnostics: Vec::new(),
        }
    }

    fn note(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, message);
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// A missing anchor fails the parse under strict structure, otherwise
    /// it is noted and the caller defaults the dependent fields.
    fn anchor<T>(&mut self, value: Option<T>, anchor: &'static str) -> Result<Option<T>> {
        if value.is_none() {
            if self.config.strict_structure {
                return Err(ExtractionError::MalformedDocument { anchor }.into());
            }
            self.note(DiagnosticKind::MissingAnchor, format!("missing {anchor}"));
        }
        Ok(value)
    }

    /// A field defect fails the parse under strict fields, otherwise it is noted.
    fn defect(&mut self, error: ExtractionError) -> Result<()> {
        if self.config.strict_fields {
            return Err(error.into());
        }
        let kind = match error {
            ExtractionError::MalformedDocument { .. } => DiagnosticKind::MissingAnchor,
            ExtractionError::Field { .. } => DiagnosticKind::FieldParse,
            ExtractionError::PartialRow { .. } => DiagnosticKind::PartialRow,
        };
        self.note(kind, error.to_string());
        Ok(())
    }

    fn amount(&mut self, totals: &TotalsBlock, label: &str) -> Result<Decimal> {
        match totals.amount(label) {
            None => Ok(Decimal::ZERO),
            Some(Ok(value)) => Ok(value),
            Some(Err(error)) => {
                self.defect(error)?;
                Ok(Decimal::ZERO)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChekError;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const SAMPLE: &str = include_str!("../../testdata/receipt.html");
    const DIVIDER: &str = "--------------------------------";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Header, date block and item table, without totals or fiscal details.
    fn three_section_receipt() -> String {
        format!(
            "<div><h3>ООО Ромашка</h3>Адрес: ул. Ленина, 1<br>ИНН 7701234567<br>{DIVIDER}<br>\
             2025-01-10T09:15:00<br>Чек № 15<br>Смена № 3<br>Кассир: Иванова<br>{DIVIDER}<br>\
             <h4>ПРИХОД</h4><table><tr><th>№</th><th>Название</th><th>Цена</th><th>Кол.</th><th>Сумма</th></tr>\
             <tr><td>1</td><td>Хлеб</td><td>45.00</td><td>2</td><td>90.00</td></tr></table>{DIVIDER}<br></div>"
        )
    }

    #[test]
    fn test_parse_sample_receipt() {
        let outcome = HtmlReceiptParser::new().parse(SAMPLE).unwrap();
        let receipt = &outcome.receipt;

        assert_eq!(
            receipt.institution,
            "ФЕДЕРАЛЬНОЕ БЮДЖЕТНОЕ УЧРЕЖДЕНИЕ \"ЦЕНТРАЛЬНАЯ КЛИНИЧЕСКАЯ БОЛЬНИЦА ГРАЖДАНСКОЙ АВИАЦИИ\""
        );
        assert_eq!(receipt.address, "Адрес не указан");
        assert_eq!(receipt.inn, "7733046721");
        assert_eq!(receipt.datetime, "2025-03-03T13:00:00");
        assert_eq!(receipt.receipt_number, "2271");
        assert_eq!(receipt.shift_number, "42");
        assert_eq!(receipt.cashier, "Конова Светлана Николаевна");

        assert_eq!(receipt.positions.len(), 1);
        let position = &receipt.positions[0];
        assert!(position.name.contains("уролога"));
        assert_eq!(position.price, dec("1250.00"));
        assert_eq!(position.quantity, dec("2"));
        assert_eq!(position.total, dec("2250.00"));

        assert_eq!(receipt.total, dec("1250.00"));
        assert_eq!(receipt.cash, Decimal::ZERO);
        assert_eq!(receipt.card, dec("1250.00"));
        assert_eq!(receipt.tax18, Decimal::ZERO);
        assert_eq!(receipt.tax10, Decimal::ZERO);

        assert_eq!(receipt.kkt_reg_number, "0000733387011528");
        assert_eq!(receipt.fiscal_drive_number, "7384440800215290");
        assert_eq!(receipt.fiscal_document_number, "2271");
        assert_eq!(receipt.fiscal_sign, "1305261358");

        assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.defaulted_rows, 0);
        assert_eq!(
            outcome.sections,
            vec![
                SectionKind::Header,
                SectionKind::DateNumbering,
                SectionKind::Items,
                SectionKind::Totals,
                SectionKind::FiscalDetails,
                SectionKind::Other,
            ]
        );

        let query = outcome.fiscal_query.unwrap();
        assert_eq!(query, FiscalQuery::from_receipt(receipt));
    }

    #[test]
    fn test_legacy_mode_matches_on_sample() {
        let current = HtmlReceiptParser::new().parse(SAMPLE).unwrap();
        let legacy = HtmlReceiptParser::legacy().parse(SAMPLE).unwrap();

        assert_eq!(legacy.receipt, current.receipt);
        assert_eq!(legacy.sections.len(), 5);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = HtmlReceiptParser::new();
        let first = serde_json::to_string(&parser.parse_receipt(SAMPLE).unwrap()).unwrap();
        let second = serde_json::to_string(&parser.parse_receipt(SAMPLE).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_sections_strict() {
        let err = HtmlReceiptParser::new()
            .parse(&three_section_receipt())
            .unwrap_err();
        assert!(matches!(
            err,
            ChekError::Extraction(ExtractionError::MalformedDocument {
                anchor: "totals section"
            })
        ));
    }

    #[test]
    fn test_missing_sections_permissive() {
        for parser in [
            HtmlReceiptParser::new().with_strict_structure(false),
            HtmlReceiptParser::legacy(),
        ] {
            let outcome = parser.parse(&three_section_receipt()).unwrap();
            let receipt = &outcome.receipt;

            assert_eq!(receipt.address, "ул. Ленина, 1");
            assert_eq!(receipt.receipt_number, "15");
            assert_eq!(receipt.positions.len(), 1);
            for amount in [
                receipt.total,
                receipt.cash,
                receipt.card,
                receipt.tax18,
                receipt.tax10,
            ] {
                assert_eq!(amount, Decimal::ZERO);
            }
            assert_eq!(receipt.kkt_reg_number, "");
            assert_eq!(receipt.fiscal_drive_number, "");
            assert_eq!(receipt.fiscal_document_number, "");
            assert_eq!(receipt.fiscal_sign, "");

            let missing: Vec<_> = outcome
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::MissingAnchor)
                .map(|d| d.message.as_str())
                .collect();
            assert_eq!(missing, vec!["missing totals section", "missing fiscal details section"]);
        }
    }

    #[test]
    fn test_extra_divider_does_not_shift_fields() {
        let html = SAMPLE.replacen(
            "<h4>ПРИХОД</h4>",
            &format!("<p>Спасибо за покупку!</p>{DIVIDER}<h4>ПРИХОД</h4>"),
            1,
        );

        let receipt = HtmlReceiptParser::new().parse_receipt(&html).unwrap();
        assert_eq!(receipt.total, dec("1250.00"));
        assert_eq!(receipt.fiscal_drive_number, "7384440800215290");

        let legacy = HtmlReceiptParser::legacy().parse_receipt(&html).unwrap();
        assert_ne!(legacy.fiscal_drive_number, "7384440800215290");
    }

    #[test]
    fn test_inline_markup_in_printed_lines() {
        let html = SAMPLE
            .replacen("<p>ИТОГО: 1,250.00</p>", "<p>ИТОГО: <b>1,250.00</b></p>", 1)
            .replacen(
                "<p>ФН: 7384440800215290</p>",
                "<p><b>ФН:</b> <span>7384440800215290</span></p>",
                1,
            )
            .replacen("ИНН 7733046721  <br>", "<b>ИНН</b> 7733046721  <br>", 1);

        for parser in [HtmlReceiptParser::new(), HtmlReceiptParser::legacy()] {
            let outcome = parser.parse(&html).unwrap();
            assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
            assert_eq!(outcome.receipt.total, dec("1250.00"));
            assert_eq!(outcome.receipt.fiscal_drive_number, "7384440800215290");
            assert_eq!(outcome.receipt.inn, "7733046721");
        }
    }

    #[test]
    fn test_nested_table_adds_no_positions() {
        let html = SAMPLE.replacen(
            "врача-уролога повторный</td>",
            "врача-уролога повторный<table><tr><td>код</td><td>B01.053.002</td></tr></table></td>",
            1,
        );

        let outcome = HtmlReceiptParser::new().parse(&html).unwrap();
        assert_eq!(outcome.receipt.positions.len(), 1);
        assert_eq!(outcome.defaulted_rows, 0);
        assert_eq!(outcome.receipt.positions[0].total, dec("2250.00"));
    }

    #[test]
    fn test_empty_input() {
        let err = HtmlReceiptParser::new().parse("").unwrap_err();
        assert!(matches!(
            err,
            ChekError::Extraction(ExtractionError::MalformedDocument { anchor: "heading" })
        ));

        let outcome = HtmlReceiptParser::new()
            .with_strict_structure(false)
            .parse("")
            .unwrap();
        assert_eq!(
            outcome.receipt,
            ReceiptData {
                address: "Адрес не указан".to_string(),
                ..ReceiptData::default()
            }
        );
        assert!(!outcome.is_clean());
        assert!(outcome.sections.is_empty());
    }

    #[test]
    fn test_bad_number_lenient_and_strict() {
        let html = SAMPLE.replacen("<p>ИТОГО: 1,250.00</p>", "<p>ИТОГО: н/д</p>", 1);

        let outcome = HtmlReceiptParser::new().parse(&html).unwrap();
        assert_eq!(outcome.receipt.total, Decimal::ZERO);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::FieldParse);

        let err = HtmlReceiptParser::new()
            .with_strict_fields(true)
            .parse(&html)
            .unwrap_err();
        assert!(matches!(
            err,
            ChekError::Extraction(ExtractionError::Field { .. })
        ));
    }

    #[test]
    fn test_short_item_row() {
        let html = SAMPLE.replacen(
            "</table>",
            "<tr><td>2</td><td>Справка</td><td>300.00</td></tr></table>",
            1,
        );

        let outcome = HtmlReceiptParser::new().parse(&html).unwrap();
        assert_eq!(outcome.receipt.positions.len(), 2);
        assert_eq!(outcome.receipt.positions[1].name, "Справка");
        assert_eq!(outcome.receipt.positions[1].quantity, Decimal::ZERO);
        assert_eq!(outcome.defaulted_rows, 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::PartialRow);

        let err = HtmlReceiptParser::new()
            .with_strict_fields(true)
            .parse(&html)
            .unwrap_err();
        assert!(matches!(
            err,
            ChekError::Extraction(ExtractionError::PartialRow { row: 2, cells: 3 })
        ));
    }

    #[test]
    fn test_short_date_section() {
        let html = SAMPLE.replacen("Кассир: Конова Светлана Николаевна<br>", "", 1);

        let outcome = HtmlReceiptParser::new().parse(&html).unwrap();
        assert_eq!(outcome.receipt.cashier, "");
        assert_eq!(outcome.receipt.shift_number, "42");
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::PartialSection);
    }

    #[test]
    fn test_input_limit() {
        let parser = HtmlReceiptParser::with_config(ParserConfig {
            max_input_bytes: 100,
            ..ParserConfig::default()
        });
        assert!(matches!(
            parser.parse(SAMPLE).unwrap_err(),
            ChekError::Limit(_)
        ));
    }
}
