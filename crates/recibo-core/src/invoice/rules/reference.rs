//! Supplier name and receipt number extraction.

use regex::{Captures, Regex};
use tracing::debug;

use super::patterns::{supplier_pattern, RECEIPT_NUMBER};
use super::{FieldRule, RuleContext};
use crate::invoice::Result;
use crate::models::receipt::ReceiptReference;

/// Supplier name rule: a fixed literal anchored at the start of a line.
///
/// Any other supplier yields an empty name; there is no fuzzy matching.
#[derive(Debug, Clone)]
pub struct SupplierRule {
    pattern: Regex,
}

impl SupplierRule {
    pub fn new(supplier_name: &str) -> Self {
        Self {
            pattern: supplier_pattern(supplier_name),
        }
    }
}

impl FieldRule for SupplierRule {
    type Output = String;

    fn name(&self) -> &'static str {
        "proveedor"
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn default_value(&self) -> String {
        String::new()
    }

    fn convert(&self, caps: &Captures<'_>, _ctx: &RuleContext) -> Result<String> {
        let name = caps[1].trim().to_string();
        debug!("{}: {}", self.name(), name);
        Ok(name)
    }
}

/// `Nro.: PPPP-NNNN` rule. The first match in the text wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReceiptReferenceRule;

impl FieldRule for ReceiptReferenceRule {
    type Output = ReceiptReference;

    fn name(&self) -> &'static str {
        "comprobante"
    }

    fn pattern(&self) -> &Regex {
        &RECEIPT_NUMBER
    }

    fn default_value(&self) -> ReceiptReference {
        ReceiptReference::default()
    }

    fn convert(&self, caps: &Captures<'_>, _ctx: &RuleContext) -> Result<ReceiptReference> {
        let reference = ReceiptReference {
            outlet_code: caps[1].to_string(),
            receipt_number: caps[2].to_string(),
        };
        debug!("{}: {}", self.name(), reference);
        Ok(reference)
    }
}
