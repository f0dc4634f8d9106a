//! Verification-service lookup key for a fiscal receipt.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use super::receipt::ReceiptData;

/// Timestamp layouts seen in QR payloads (`t=` parameter).
const QR_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// The fields the verification service needs to look a receipt up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalQuery {
    /// Fiscal drive number.
    #[serde(rename = "fn")]
    pub fiscal_drive_number: String,

    /// Fiscal document number.
    #[serde(rename = "fd")]
    pub fiscal_document_number: String,

    /// Fiscal sign.
    #[serde(rename = "fp")]
    pub fiscal_sign: String,

    /// Grand total with two decimals, e.g. `1250.00`.
    pub total: String,

    /// Purchase date, `YYYY-MM-DD`.
    pub date: String,

    /// Purchase time, `HH:MM`.
    pub time: String,
}

impl FiscalQuery {
    /// Build a query from a parsed receipt.
    pub fn from_receipt(receipt: &ReceiptData) -> Self {
        let (date, time) = receipt
            .timestamp()
            .map(split_timestamp)
            .unwrap_or_default();

        Self {
            fiscal_drive_number: receipt.fiscal_drive_number.clone(),
            fiscal_document_number: receipt.fiscal_document_number.clone(),
            fiscal_sign: receipt.fiscal_sign.clone(),
            total: format!("{:.2}", receipt.total),
            date,
            time,
        }
    }

    /// Build a query from a QR-code payload such as
    /// `fn=7384440800215290&fd=2271&fp=1305261358&t=2025-03-03T13:00:00&s=125000`.
    ///
    /// `s` is the total in kopecks. Returns `None` unless fn, fd and fp are all present.
    pub fn from_qr_payload(payload: &str) -> Option<Self> {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(payload.trim().as_bytes()) {
            let value = value.trim().to_string();
            match &*key {
                "fn" => query.fiscal_drive_number = value,
                "i" | "fd" => query.fiscal_document_number = value,
                "fp" => query.fiscal_sign = value,
                "s" => {
                    if let Ok(kopecks) = value.parse::<i64>() {
                        query.total = format!("{:.2}", Decimal::new(kopecks, 2));
                    } else {
                        query.total = value;
                    }
                }
                "t" => {
                    if let Some((date, time)) = QR_TIMESTAMP_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
                        .map(split_timestamp)
                    {
                        query.date = date;
                        query.time = time;
                    }
                }
                _ => {}
            }
        }

        if query.fiscal_drive_number.is_empty()
            || query.fiscal_document_number.is_empty()
            || query.fiscal_sign.is_empty()
        {
            return None;
        }

        Some(query)
    }

    /// Build a query from a QR-code image URL whose `data` parameter carries
    /// the payload (as rendered by QR generator services).
    pub fn from_qr_url(src: &str) -> Option<Self> {
        let url = Url::parse(src.trim()).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "data")
            .and_then(|(_, data)| Self::from_qr_payload(&data))
    }
}

fn split_timestamp(ts: NaiveDateTime) -> (String, String) {
    (
        ts.format("%Y-%m-%d").to_string(),
        ts.format("%H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const QR_SRC: &str = "https://api.qrserver.com/v1/create-qr-code/?data=fn%3D7384440800215290%26fd%3D2271%26fp%3D1305261358%26t%3D2025-03-03T13%3A00%3A00%26s%3D125000";

    fn expected() -> FiscalQuery {
        FiscalQuery {
            fiscal_drive_number: "7384440800215290".to_string(),
            fiscal_document_number: "2271".to_string(),
            fiscal_sign: "1305261358".to_string(),
            total: "1250.00".to_string(),
            date: "2025-03-03".to_string(),
            time: "13:00".to_string(),
        }
    }

    #[test]
    fn test_from_qr_url() {
        assert_eq!(FiscalQuery::from_qr_url(QR_SRC), Some(expected()));
    }

    #[test]
    fn test_from_qr_payload_compact_timestamp() {
        let query = FiscalQuery::from_qr_payload(
            "t=20250303T1300&s=1250.00&fn=7384440800215290&i=2271&fp=1305261358&n=1",
        )
        .unwrap();
        assert_eq!(query, expected());
    }

    #[test]
    fn test_from_qr_payload_incomplete() {
        assert_eq!(FiscalQuery::from_qr_payload("fn=1&fd=2"), None);
        assert_eq!(FiscalQuery::from_qr_url("not a url"), None);
        assert_eq!(
            FiscalQuery::from_qr_url("https://example.com/logo.png"),
            None
        );
    }

    #[test]
    fn test_from_receipt() {
        let receipt = ReceiptData {
            datetime: "2025-03-03T13:00:00".to_string(),
            total: Decimal::from_str("1250").unwrap(),
            fiscal_drive_number: "7384440800215290".to_string(),
            fiscal_document_number: "2271".to_string(),
            fiscal_sign: "1305261358".to_string(),
            ..ReceiptData::default()
        };
        assert_eq!(FiscalQuery::from_receipt(&receipt), expected());

        let json = serde_json::to_value(expected()).unwrap();
        assert_eq!(json["fp"], "1305261358");
    }
}
