//! Item table: one position per data row.

use rust_decimal::Decimal;
use tracing::debug;

use super::amounts::parse_amount_field;
use crate::error::ExtractionError;
use crate::models::receipt::ReceiptPosition;

/// Cells in a complete item row: ordinal, name, price, quantity, total.
pub const ITEM_CELLS: usize = 5;

/// Positions read from the item table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemRows {
    /// One position per data row, in document order.
    pub positions: Vec<ReceiptPosition>,
    /// Rows that had missing cells or unparseable numbers.
    pub defaulted_rows: usize,
    /// Every defect found, in row order.
    pub defects: Vec<ExtractionError>,
}

/// Map table rows to positions. The first row is the header and is skipped.
///
/// Missing cells and unparseable numbers default to empty/zero; each defect
/// is recorded so the caller can decide whether to fail.
pub fn extract_positions(rows: &[Vec<String>]) -> ItemRows {
    let mut result = ItemRows::default();

    for (row, cells) in rows.iter().enumerate().skip(1) {
        let mut defective = false;

        if cells.len() < ITEM_CELLS {
            result.defects.push(ExtractionError::PartialRow {
                row,
                cells: cells.len(),
            });
            defective = true;
        }

        let cell = |index: usize| cells.get(index).map(|c| c.trim()).unwrap_or("");
        let mut amount = |index: usize, field: &str| -> Decimal {
            if index >= cells.len() {
                return Decimal::ZERO;
            }
            parse_amount_field(&format!("positions[{row}].{field}"), cell(index))
                .unwrap_or_else(|err| {
                    result.defects.push(err);
                    defective = true;
                    Decimal::ZERO
                })
        };

        let price = amount(2, "price");
        let quantity = amount(3, "quantity");
        let total = amount(4, "total");

        if defective {
            result.defaulted_rows += 1;
        }

        result.positions.push(ReceiptPosition {
            name: cell(1).to_string(),
            price,
            quantity,
            total,
        });
    }

    debug!(
        "Extracted {} positions ({} defaulted)",
        result.positions.len(),
        result.defaulted_rows
    );

    result
}
