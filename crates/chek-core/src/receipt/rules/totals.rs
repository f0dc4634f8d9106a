//! Totals block (`label: amount`) and fiscal-details block (`key: value`).

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::amounts::parse_amount_field;
use super::patterns::{DETAIL_SEPARATOR, FD_KEY, FN_KEY, FPD_KEYS, KKT_REG_NUMBER_KEY, LABEL_VALUE};
use super::SectionExtractor;
use crate::error::ExtractionError;
use crate::receipt::sections::Section;

/// Labeled lines of the totals block, values kept as printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TotalsBlock {
    entries: Vec<(String, String)>,
}

impl TotalsBlock {
    /// Parsed amount for an exact label.
    ///
    /// `None` when the label is absent; `Some(Err)` when the value is not a number.
    pub fn amount(&self, label: &str) -> Option<Result<Decimal, ExtractionError>> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(l, value)| parse_amount_field(l, value))
    }

    /// All labels in print order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects `label: value` lines; other lines are discarded.
pub struct TotalsExtractor;

impl TotalsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TotalsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionExtractor for TotalsExtractor {
    type Output = TotalsBlock;

    fn extract(&self, section: &Section) -> TotalsBlock {
        let entries = section
            .lines
            .iter()
            .filter_map(|line| LABEL_VALUE.captures(line))
            .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()))
            .collect();
        TotalsBlock { entries }
    }
}

/// Key/value pairs of the fiscal-details block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiscalDetails {
    values: HashMap<String, String>,
}

impl FiscalDetails {
    /// Value for an exact key, or empty.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Fiscal device registration number.
    pub fn kkt_reg_number(&self) -> &str {
        self.get(KKT_REG_NUMBER_KEY)
    }

    /// Fiscal drive number.
    pub fn fiscal_drive_number(&self) -> &str {
        self.get(FN_KEY)
    }

    /// Fiscal document number.
    pub fn fiscal_document_number(&self) -> &str {
        self.get(FD_KEY)
    }

    /// Fiscal sign, under whichever key spelling the receipt uses.
    pub fn fiscal_sign(&self) -> &str {
        FPD_KEYS
            .iter()
            .map(|key| self.get(key))
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Splits each line on the first `": "` into key and value.
pub struct FiscalDetailsExtractor;

impl FiscalDetailsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FiscalDetailsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionExtractor for FiscalDetailsExtractor {
    type Output = FiscalDetails;

    fn extract(&self, section: &Section) -> FiscalDetails {
        let values = section
            .lines
            .iter()
            .map(|line| {
                let (key, value) = line.split_once(DETAIL_SEPARATOR).unwrap_or((line.as_str(), ""));
                (key.trim().to_string(), value.trim().to_string())
            })
            .collect();
        FiscalDetails { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::rules::patterns::{CARD_LABEL, CASH_LABEL, TOTAL_LABEL, VAT10_LABEL};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn section(lines: &[&str]) -> Section {
        Section::new(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_totals_lookup() {
        let block = TotalsExtractor::new().extract(&section(&[
            "ИТОГО: 1,250.00",
            "Наличные: 0.00",
            "Карта: 1,250.00",
            "без двоеточия",
            "НДС 18%: 0.00",
        ]));

        assert_eq!(block.len(), 4);
        assert_eq!(
            block.amount(TOTAL_LABEL),
            Some(Ok(Decimal::from_str("1250.00").unwrap()))
        );
        assert_eq!(block.amount(CASH_LABEL), Some(Ok(Decimal::ZERO)));
        assert_eq!(
            block.amount(CARD_LABEL),
            Some(Ok(Decimal::from_str("1250").unwrap()))
        );
        assert_eq!(block.amount(VAT10_LABEL), None);
    }

    #[test]
    fn test_totals_unparseable_value() {
        let block = TotalsExtractor::new().extract(&section(&["ИТОГО: много"]));
        assert_eq!(
            block.amount(TOTAL_LABEL),
            Some(Err(ExtractionError::Field {
                field: "ИТОГО".to_string(),
                value: "много".to_string(),
            }))
        );
    }

    #[test]
    fn test_fiscal_details() {
        let details = FiscalDetailsExtractor::new().extract(&section(&[
            "ВИД НАЛОГООБЛОЖЕНИЯ: 1",
            "Рег. номер ККТ: 0000733387011528    ",
            "ФН: 7384440800215290",
            "ФД: 2271",
            "ФПД#: 1305261358",
            "Сайт ФНС: https://nalog.ru: 443",
        ]));

        assert_eq!(details.kkt_reg_number(), "0000733387011528");
        assert_eq!(details.fiscal_drive_number(), "7384440800215290");
        assert_eq!(details.fiscal_document_number(), "2271");
        assert_eq!(details.fiscal_sign(), "1305261358");
        assert_eq!(details.get("Сайт ФНС"), "https://nalog.ru: 443");
        assert_eq!(details.get("ИНН"), "");
    }

    #[test]
    fn test_fiscal_details_missing_keys() {
        let details = FiscalDetailsExtractor::new().extract(&section(&["ФН: 1", "ФП"]));
        assert_eq!(details.fiscal_document_number(), "");
        assert_eq!(details.fiscal_sign(), "");
        assert_eq!(details.len(), 2);
    }
}
