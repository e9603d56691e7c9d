//! Rule-based receipt parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::{DecimalFormat, ExtractionConfig};
use crate::models::receipt::InvoiceRecord;

use super::rules::{
    ExchangeRateRule, FieldRule, IssueDateRule, LineItemRule, ReceiptReferenceRule, RuleContext,
    SupplierRule, TaxAmountRule, WithholdingRule,
};
use super::{InvoiceExtractor, Result};

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted receipt data.
    pub record: InvoiceRecord,
    /// One entry per field that fell back to its default.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for receipt parsing with diagnostics.
pub trait InvoiceParser {
    /// Parse a receipt from text, reporting which fields were defaulted.
    fn parse(&self, text: &str, source: &str) -> Result<ExtractionResult>;
}

/// Parser for the single-supplier receipt template.
///
/// Holds only compiled patterns and settings, so one parser can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    supplier: SupplierRule,
    decimal_format: DecimalFormat,
}

impl ReceiptParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            supplier: SupplierRule::new(&config.supplier_name),
            decimal_format: config.decimal_format,
        }
    }

    /// Set the supplier name expected at the start of a line.
    pub fn with_supplier(mut self, name: &str) -> Self {
        self.supplier = SupplierRule::new(name);
        self
    }

    /// Set the decimal separator policy.
    pub fn with_decimal_format(mut self, format: DecimalFormat) -> Self {
        self.decimal_format = format;
        self
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve<R: FieldRule>(
    rule: &R,
    text: &str,
    ctx: &RuleContext,
    warnings: &mut Vec<String>,
) -> Result<R::Output> {
    match rule.find(text, ctx)? {
        Some(value) => Ok(value),
        None => {
            warnings.push(format!("{} not found, using default", rule.name()));
            Ok(rule.default_value())
        }
    }
}

impl InvoiceParser for ReceiptParser {
    fn parse(&self, text: &str, source: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing receipt {} from {} characters of text", source, text.len());

        // Every monetary rule depends on the rate, so it goes first.
        let ctx = RuleContext::new(self.decimal_format);
        let exchange_rate = resolve(&ExchangeRateRule, text, &ctx, &mut warnings)?;
        let ctx = ctx.with_exchange_rate(exchange_rate);

        let mut record = InvoiceRecord::new(source);
        record.exchange_rate = exchange_rate;
        record.supplier_name = resolve(&self.supplier, text, &ctx, &mut warnings)?;
        record.receipt_reference = resolve(&ReceiptReferenceRule, text, &ctx, &mut warnings)?;
        record.issue_date = resolve(&IssueDateRule, text, &ctx, &mut warnings)?;
        record.tax_amount_local = resolve(&TaxAmountRule, text, &ctx, &mut warnings)?;
        record.withholding_amount_local = resolve(&WithholdingRule, text, &ctx, &mut warnings)?;
        record.line_items = LineItemRule.extract_all(text, &ctx)?;

        if record.line_items.is_empty() {
            warnings.push("productos: no line items found".to_string());
        }

        debug!(
            "Extracted receipt {} with {} line items, {} defaulted fields",
            record.receipt_reference,
            record.line_items.len(),
            warnings.len()
        );

        Ok(ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl InvoiceExtractor for ReceiptParser {
    fn extract(&self, document_text: &str, source: &str) -> Result<InvoiceRecord> {
        self.parse(document_text, source).map(|r| r.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::models::receipt::{IssueDate, LineItem, ReceiptReference};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const SAMPLE: &str = "\
AGRONORTE S.R.L.
Ruta 9 Km 1300 - Tucuman
FACTURA A Nro.: 0004-00012345
Fecha: 15/03/2024
Tipo de cambio: 950,50
Codigo Descripcion Cantidad Precio Bonif. Importe
ABCD1234 Fertilizer XYZ 10 U$S 5,00 U$S -0,50 U$S 47,50
SEM0001 Semilla soja 2 U$S 1,25 U$S 0,00 U$S 2,50
Subtotal U$S 50,00
IVA 21.00% U$S 10,00
Percepciones U$S 1,50
Total U$S 61,50";

    #[test]
    fn test_parse_full_receipt() {
        let record = ReceiptParser::new().extract(SAMPLE, "compra.pdf").unwrap();

        assert_eq!(record.source_file, "compra.pdf");
        assert_eq!(record.supplier_name, "AGRONORTE S.R.L.");
        assert_eq!(
            record.receipt_reference,
            ReceiptReference {
                outlet_code: "0004".to_string(),
                receipt_number: "00012345".to_string(),
            }
        );
        assert_eq!(record.issue_date, IssueDate::new(15, 3, 2024));
        assert_eq!(record.exchange_rate, dec("950.5"));
        assert_eq!(record.tax_amount_local, dec("9505"));
        assert_eq!(record.withholding_amount_local, dec("1425.75"));
        assert_eq!(
            record.line_items,
            vec![
                LineItem {
                    product_code: "ABCD1234".to_string(),
                    quantity: dec("10"),
                    amount_local: dec("45148.75"),
                },
                LineItem {
                    product_code: "SEM0001".to_string(),
                    quantity: dec("2"),
                    amount_local: dec("2376.25"),
                },
            ]
        );
    }

    #[test]
    fn test_parse_reports_no_warnings_for_complete_receipt() {
        let result = ReceiptParser::new().parse(SAMPLE, "compra.pdf").unwrap();
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_empty_text_gives_defaults() {
        let result = ReceiptParser::new().parse("", "vacio.pdf").unwrap();
        assert_eq!(result.record, InvoiceRecord::new("vacio.pdf"));
        assert_eq!(result.warnings.len(), 7);
    }

    #[test]
    fn test_without_rate_amounts_stay_in_usd() {
        let text = "IVA 21.00% U$S 10,05\nPercepciones U$S 2,10\nAB12 Item 3 U$S 1,00 U$S 0,00 U$S 3,00";
        let record = ReceiptParser::new().extract(text, "x").unwrap();
        assert_eq!(record.exchange_rate, Decimal::ONE);
        assert_eq!(record.tax_amount_local, dec("10.05"));
        assert_eq!(record.withholding_amount_local, dec("2.10"));
        assert_eq!(record.line_items[0].amount_local, dec("3.00"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let parser = ReceiptParser::new();
        let first = serde_json::to_string(&parser.extract(SAMPLE, "a.pdf").unwrap()).unwrap();
        let second = serde_json::to_string(&parser.extract(SAMPLE, "a.pdf").unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupted_amount_fails_whole_extraction() {
        let text = "AGRONORTE S.R.L.\nIVA 21.00% U$S 1.210,00";
        let err = ReceiptParser::new().extract(text, "x").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::Parse {
                field: "iva".to_string(),
                value: "1.210,00".to_string(),
            }
        );
    }

    #[test]
    fn test_locale_format_accepts_thousands() {
        let text = "Tipo de cambio: 1050,00\nIVA 21.00% U$S 1.210,00";
        let record = ReceiptParser::new()
            .with_decimal_format(DecimalFormat::Locale)
            .extract(text, "x")
            .unwrap();
        assert_eq!(record.exchange_rate, dec("1050"));
        assert_eq!(record.tax_amount_local, dec("1270500"));
    }

    #[test]
    fn test_custom_supplier() {
        let record = ReceiptParser::new()
            .with_supplier("AGROSUR S.A.")
            .extract("AGROSUR S.A.\nAGRONORTE S.R.L.", "x")
            .unwrap();
        assert_eq!(record.supplier_name, "AGROSUR S.A.");
    }
}
