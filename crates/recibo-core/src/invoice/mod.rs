//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, InvoiceParser, ReceiptParser};

use crate::error::ExtractionError;
use crate::models::receipt::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for receipt field extractors.
pub trait InvoiceExtractor {
    /// Extract a receipt record from the full text of one document.
    ///
    /// Absent fields take their defaults; only text that matches a rule but
    /// cannot be converted is an error.
    fn extract(&self, document_text: &str, source: &str) -> Result<InvoiceRecord>;
}

/// Extract a record with the default parser settings.
pub fn extract(document_text: &str, source: &str) -> Result<InvoiceRecord> {
    ReceiptParser::new().extract(document_text, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::{IssueDate, LineItem};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_header_scenario() {
        let text = "\
AGRONORTE S.R.L.
Nro.: 0004-00012345
Fecha: 15/03/2024
Tipo de cambio: 950,50
IVA 21.00% U$S 10,00";

        let record = extract(text, "factura.pdf").unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["proveedor"], "AGRONORTE S.R.L.");
        assert_eq!(json["comprobante"]["pto_venta"], "0004");
        assert_eq!(json["comprobante"]["nro_comprobante"], "00012345");
        assert_eq!(json["fecha"], serde_json::json!({"dia": 15, "mes": 3, "anio": 2024}));
        assert_eq!(json["tipo_cambio"], 950.5);
        assert_eq!(json["iva"], 9505.0);
        assert_eq!(record.issue_date, IssueDate::new(15, 3, 2024));
    }

    #[test]
    fn test_line_item_scenario() {
        let text = "Tipo de cambio: 2,0\nABCD1234 Fertilizer XYZ 10 U$S 5,00 U$S -0,50 U$S 47,50";
        let record = extract(text, "x.pdf").unwrap();

        assert_eq!(
            record.line_items,
            vec![LineItem {
                product_code: "ABCD1234".to_string(),
                quantity: Decimal::from(10),
                amount_local: Decimal::from_str("95.00").unwrap(),
            }]
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json["productos"],
            serde_json::json!([{"codigo": "ABCD1234", "cantidad": 10.0, "importe_pesos": 95.0}])
        );
    }

    #[test]
    fn test_empty_input_scenario() {
        let record = extract("", "vacio.pdf").unwrap();
        assert_eq!(record, InvoiceRecord::new("vacio.pdf"));
        assert!(record.line_items.is_empty());
    }
}
