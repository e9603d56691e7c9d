//! Rule-based field extractors for the purchase receipt template.
//!
//! Every field is one [`FieldRule`]: a name, a pattern, a default and a
//! converter from the pattern's captures. A missing match yields the default;
//! a match that cannot be converted is an error.

pub mod amounts;
pub mod dates;
pub mod items;
pub mod patterns;
pub mod reference;

pub use amounts::{
    convert_to_local, normalize_decimal, parse_decimal, ExchangeRateRule, TaxAmountRule,
    WithholdingRule,
};
pub use dates::{parse_issue_date, IssueDateRule};
pub use items::LineItemRule;
pub use reference::{ReceiptReferenceRule, SupplierRule};

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use tracing::trace;

use super::Result;
use crate::models::config::DecimalFormat;

/// State shared by all rules while extracting one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// Rate applied to USD amounts. Resolved before any monetary rule runs.
    pub exchange_rate: Decimal,
    /// Decimal separator policy.
    pub decimal_format: DecimalFormat,
}

impl RuleContext {
    pub fn new(decimal_format: DecimalFormat) -> Self {
        Self {
            exchange_rate: Decimal::ONE,
            decimal_format,
        }
    }

    pub fn with_exchange_rate(mut self, rate: Decimal) -> Self {
        self.exchange_rate = rate;
        self
    }
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new(DecimalFormat::default())
    }
}

/// A single field rule: pattern plus converter.
pub trait FieldRule {
    /// The type of value this rule produces.
    type Output;

    /// Field name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Pattern locating the field.
    fn pattern(&self) -> &Regex;

    /// Value used when the pattern does not match.
    fn default_value(&self) -> Self::Output;

    /// Convert a match into the field value.
    fn convert(&self, caps: &Captures<'_>, ctx: &RuleContext) -> Result<Self::Output>;

    /// Apply the rule to the first match in `text`, or return the default.
    fn apply(&self, text: &str, ctx: &RuleContext) -> Result<Self::Output> {
        Ok(self.find(text, ctx)?.unwrap_or_else(|| self.default_value()))
    }

    /// Apply the rule to the first match in `text`; `None` if absent.
    fn find(&self, text: &str, ctx: &RuleContext) -> Result<Option<Self::Output>> {
        match self.pattern().captures(text) {
            Some(caps) => self.convert(&caps, ctx).map(Some),
            None => {
                trace!("{}: no match", self.name());
                Ok(None)
            }
        }
    }

    /// Apply the rule to every match in `text`, in order of appearance.
    fn find_all(&self, text: &str, ctx: &RuleContext) -> Result<Vec<Self::Output>> {
        self.pattern()
            .captures_iter(text)
            .map(|caps| self.convert(&caps, ctx))
            .collect()
    }
}
