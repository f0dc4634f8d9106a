//! Labels and regex patterns of the Russian receipt layout.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `label: value` line of the totals block
    pub static ref LABEL_VALUE: Regex = Regex::new(
        r"^(.*?):\s*(.+)$"
    ).unwrap();

    // ISO-like timestamp that opens the date/numbering block
    pub static ref TIMESTAMP_LINE: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}"
    ).unwrap();
}

// Header
pub const ADDRESS_LABEL: &str = "Адрес";
pub const INN_LABEL: &str = "ИНН";
/// Vendor text printed instead of an address.
pub const ADDRESS_MISSING_MARKER: &str = "не указан";

// Date/numbering block
pub const RECEIPT_NUMBER_PREFIX: &str = "Чек №";
pub const SHIFT_NUMBER_PREFIX: &str = "Смена №";
pub const CASHIER_PREFIX: &str = "Кассир:";

// Totals block
pub const TOTAL_LABEL: &str = "ИТОГО";
pub const CASH_LABEL: &str = "Наличные";
pub const CARD_LABEL: &str = "Карта";
pub const VAT18_LABEL: &str = "НДС 18%";
pub const VAT10_LABEL: &str = "НДС 10%";

// Fiscal details block
pub const KKT_REG_NUMBER_KEY: &str = "Рег. номер ККТ";
pub const FN_KEY: &str = "ФН";
pub const FD_KEY: &str = "ФД";
pub const FPD_KEYS: &[&str] = &["ФПД#", "ФПД", "ФП"];

/// Operation headings printed above the item table.
pub const ITEMS_HEADINGS: &[&str] = &["ПРИХОД", "ВОЗВРАТ ПРИХОДА", "РАСХОД", "ВОЗВРАТ РАСХОДА"];

/// Separator between a fiscal-detail key and its value.
pub const DETAIL_SEPARATOR: &str = ": ";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_value() {
        let caps = LABEL_VALUE.captures("НДС 18%: 0.00").unwrap();
        assert_eq!(&caps[1], "НДС 18%");
        assert_eq!(&caps[2], "0.00");

        // Lazy label: the first colon splits.
        let caps = LABEL_VALUE.captures("a: b: c").unwrap();
        assert_eq!(&caps[1], "a");
        assert_eq!(&caps[2], "b: c");

        assert!(!LABEL_VALUE.is_match("ПРИХОД"));
        assert!(!LABEL_VALUE.is_match("ИТОГО:"));
    }

    #[test]
    fn test_timestamp_line() {
        assert!(TIMESTAMP_LINE.is_match("2025-03-03T13:00:00"));
        assert!(TIMESTAMP_LINE.is_match("2025-03-03 13:00"));
        assert!(!TIMESTAMP_LINE.is_match("Чек № 2271"));
    }
}
