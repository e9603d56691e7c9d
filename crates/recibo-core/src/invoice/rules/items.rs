//! Product line extraction.

use regex::{Captures, Regex};
use tracing::debug;

use super::amounts::{convert_to_local, parse_decimal};
use super::patterns::LINE_ITEM;
use super::{FieldRule, RuleContext};
use crate::invoice::Result;
use crate::models::receipt::LineItem;

/// Product line rule.
///
/// The unit price and adjustment columns are matched to keep the pattern
/// anchored but are not kept. Use [`FieldRule::find_all`] to collect every
/// line in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineItemRule;

impl LineItemRule {
    /// Collect every product line in order of appearance.
    pub fn extract_all(&self, text: &str, ctx: &RuleContext) -> Result<Vec<LineItem>> {
        let items = self.find_all(text, ctx)?;
        debug!("productos: {} line items", items.len());
        Ok(items)
    }
}

impl FieldRule for LineItemRule {
    type Output = LineItem;

    fn name(&self) -> &'static str {
        "productos"
    }

    fn pattern(&self) -> &Regex {
        &LINE_ITEM
    }

    fn default_value(&self) -> LineItem {
        LineItem {
            product_code: String::new(),
            quantity: Default::default(),
            amount_local: Default::default(),
        }
    }

    fn convert(&self, caps: &Captures<'_>, ctx: &RuleContext) -> Result<LineItem> {
        let quantity = parse_decimal("productos.cantidad", &caps[2], ctx.decimal_format)?;
        let usd = parse_decimal("productos.importe", &caps[3], ctx.decimal_format)?;
        let amount_local = convert_to_local("productos.importe", usd, ctx.exchange_rate)?;

        Ok(LineItem {
            product_code: caps[1].to_string(),
            quantity,
            amount_local,
        })
    }
}
