//! Purchase receipt data models.
//!
//! Field names are serialized with the Spanish keys used by the downstream
//! bookkeeping import (`archivo_pdf`, `proveedor`, ...).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A receipt extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Identifier of the originating document, passed through unchanged.
    #[serde(rename = "archivo_pdf")]
    pub source_file: String,

    /// Supplier name, empty if not recognized.
    #[serde(rename = "proveedor")]
    pub supplier_name: String,

    /// Outlet code and receipt number.
    #[serde(rename = "comprobante")]
    pub receipt_reference: ReceiptReference,

    /// Issue date, or the sentinel when no date was found.
    #[serde(rename = "fecha")]
    pub issue_date: IssueDate,

    /// USD to local currency rate applied to every monetary field.
    #[serde(rename = "tipo_cambio", with = "rust_decimal::serde::float")]
    pub exchange_rate: Decimal,

    /// VAT (IVA) amount in local currency.
    #[serde(rename = "iva", with = "rust_decimal::serde::float")]
    pub tax_amount_local: Decimal,

    /// Perceptions (withholding) amount in local currency.
    #[serde(rename = "percepciones", with = "rust_decimal::serde::float")]
    pub withholding_amount_local: Decimal,

    /// Products in order of appearance.
    #[serde(rename = "productos")]
    pub line_items: Vec<LineItem>,
}

/// Receipt number split into outlet (punto de venta) and sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptReference {
    /// Four digit outlet code.
    #[serde(rename = "pto_venta")]
    pub outlet_code: String,

    /// Sequence number, digits only.
    #[serde(rename = "nro_comprobante")]
    pub receipt_number: String,
}

impl ReceiptReference {
    pub fn is_empty(&self) -> bool {
        self.outlet_code.is_empty() && self.receipt_number.is_empty()
    }
}

impl std::fmt::Display for ReceiptReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.outlet_code, self.receipt_number)
    }
}

/// Calendar date as printed on the receipt.
///
/// Components are kept as plain integers: the receipt text is not validated
/// against the calendar. Use [`IssueDate::to_naive_date`] for a checked date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDate {
    #[serde(rename = "dia")]
    pub day: u32,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "anio")]
    pub year: i32,
}

impl IssueDate {
    /// Date reported when the text carries no `Fecha:` label.
    pub const SENTINEL: IssueDate = IssueDate {
        day: 1,
        month: 1,
        year: 2000,
    };

    pub fn new(day: u32, month: u32, year: i32) -> Self {
        Self { day, month, year }
    }

    /// Whether this is the default date rather than one read from the text.
    ///
    /// A receipt genuinely dated 01/01/2000 is indistinguishable from the
    /// sentinel; extraction warnings tell the two apart.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Convert to a checked calendar date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl Default for IssueDate {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl std::fmt::Display for IssueDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

/// A product line on the receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code (uppercase alphanumeric, at least 4 characters).
    #[serde(rename = "codigo")]
    pub product_code: String,

    /// Units purchased.
    #[serde(rename = "cantidad", with = "rust_decimal::serde::float")]
    pub quantity: Decimal,

    /// Line total converted to local currency.
    #[serde(rename = "importe_pesos", with = "rust_decimal::serde::float")]
    pub amount_local: Decimal,
}

impl InvoiceRecord {
    /// Create a record with every field at its default.
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            supplier_name: String::new(),
            receipt_reference: ReceiptReference::default(),
            issue_date: IssueDate::SENTINEL,
            exchange_rate: Decimal::ONE,
            tax_amount_local: Decimal::ZERO,
            withholding_amount_local: Decimal::ZERO,
            line_items: Vec::new(),
        }
    }

    /// Sum of all line item amounts in local currency.
    pub fn items_total_local(&self) -> Decimal {
        self.line_items.iter().map(|i| i.amount_local).sum()
    }

    /// Check the record for signs that the document did not match the
    /// expected template. Returns human-readable issues; never fails.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.supplier_name.is_empty() {
            issues.push("Supplier not recognized".to_string());
        }

        if self.receipt_reference.is_empty() {
            issues.push("Missing receipt number".to_string());
        }

        if self.issue_date.is_sentinel() {
            issues.push("Issue date is the default 01/01/2000".to_string());
        } else if self.issue_date.to_naive_date().is_none() {
            issues.push(format!("Issue date {} is not a calendar date", self.issue_date));
        }

        if self.exchange_rate <= Decimal::ZERO {
            issues.push(format!("Exchange rate {} is not positive", self.exchange_rate));
        }

        if self.line_items.is_empty() {
            issues.push("No line items".to_string());
        }

        for item in &self.line_items {
            if item.quantity.is_zero() {
                issues.push(format!("Line item {} has zero quantity", item.product_code));
            }
        }

        issues
    }
}
