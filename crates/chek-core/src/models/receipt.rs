//! Fiscal receipt data models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp layouts printed by the verification service.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// A parsed fiscal receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    /// Merchant or legal-entity name.
    pub institution: String,

    /// Merchant address, or the placeholder text when the receipt has none.
    pub address: String,

    /// Merchant tax identification number (ИНН).
    pub inn: String,

    /// Transaction timestamp as printed.
    pub datetime: String,

    /// Fiscal receipt sequence number.
    pub receipt_number: String,

    /// Cashier shift number.
    pub shift_number: String,

    /// Cashier name.
    pub cashier: String,

    /// Line items in document order.
    pub positions: Vec<ReceiptPosition>,

    /// Grand total.
    pub total: Decimal,

    /// Cash-tendered amount.
    pub cash: Decimal,

    /// Card-tendered amount.
    pub card: Decimal,

    /// VAT at 18%.
    pub tax18: Decimal,

    /// VAT at 10%.
    pub tax10: Decimal,

    /// Fiscal device (ККТ) registration number.
    pub kkt_reg_number: String,

    /// Fiscal drive number (ФН).
    #[serde(rename = "fn")]
    pub fiscal_drive_number: String,

    /// Fiscal document number (ФД).
    #[serde(rename = "fd")]
    pub fiscal_document_number: String,

    /// Fiscal sign (ФПД).
    #[serde(rename = "fpd")]
    pub fiscal_sign: String,
}

/// A single purchased line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptPosition {
    /// Item description.
    pub name: String,

    /// Unit price.
    pub price: Decimal,

    /// Quantity, possibly fractional.
    pub quantity: Decimal,

    /// Line total as printed.
    pub total: Decimal,
}

impl ReceiptPosition {
    /// Price multiplied by quantity.
    pub fn computed_total(&self) -> Decimal {
        self.price * self.quantity
    }
}

impl ReceiptData {
    /// Parse the printed timestamp.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let text = self.datetime.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    }

    /// Sum of the printed line totals.
    pub fn positions_total(&self) -> Decimal {
        self.positions.iter().map(|p| p.total).sum()
    }

    /// Check cross-field consistency and return any issues found.
    ///
    /// The parser never calls this; the printed values are kept as-is and
    /// consumers decide what to do with the report.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tolerance = Decimal::new(1, 2);

        if self.institution.is_empty() {
            issues.push("Missing institution name".to_string());
        }

        if self.inn.is_empty() {
            issues.push("Missing INN".to_string());
        }

        if self.fiscal_drive_number.is_empty()
            || self.fiscal_document_number.is_empty()
            || self.fiscal_sign.is_empty()
        {
            issues.push("Incomplete fiscal identifiers (fn/fd/fpd)".to_string());
        }

        if !self.datetime.is_empty() && self.timestamp().is_none() {
            issues.push(format!("Unrecognized timestamp: {}", self.datetime));
        }

        if self.positions.is_empty() {
            issues.push("No positions".to_string());
        }

        for (i, position) in self.positions.iter().enumerate() {
            let computed = position.computed_total();
            if (computed - position.total).abs() > tolerance {
                issues.push(format!(
                    "Position {} total ({}) differs from price x quantity ({})",
                    i + 1,
                    position.total,
                    computed
                ));
            }
        }

        let positions_total = self.positions_total();
        if !self.positions.is_empty() && (positions_total - self.total).abs() > tolerance {
            issues.push(format!(
                "Position totals ({}) differ from receipt total ({})",
                positions_total, self.total
            ));
        }

        let tendered = self.cash + self.card;
        if !tendered.is_zero() && (tendered - self.total).abs() > tolerance {
            issues.push(format!(
                "Tendered amount ({}) differs from receipt total ({})",
                tendered, self.total
            ));
        }

        issues
    }
}
