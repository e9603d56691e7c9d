//! Amount and exchange rate extraction.

use regex::{Captures, Regex};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::{debug, warn};

use super::patterns::{EXCHANGE_RATE, TAX_AMOUNT, WITHHOLDING_AMOUNT};
use super::{FieldRule, RuleContext};
use crate::error::ExtractionError;
use crate::invoice::Result;
use crate::models::config::DecimalFormat;

/// Decimal places kept in local currency amounts.
pub const LOCAL_AMOUNT_SCALE: u32 = 2;

/// Normalize decimal separators so the string parses with `.` as the point.
///
/// `Legacy` replaces every `,` with `.` and assumes no thousands separators,
/// so `"1.234,56"` becomes `"1.234.56"`, which then fails to parse.
pub fn normalize_decimal(s: &str, format: DecimalFormat) -> String {
    match format {
        DecimalFormat::Legacy => s.replace(',', "."),
        DecimalFormat::Locale => normalize_locale(s),
    }
}

fn normalize_locale(s: &str) -> String {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    match (commas, dots) {
        (0, 0) => s.to_string(),
        (1, 0) => s.replace(',', "."),
        (_, 0) => s.replace(',', ""),
        (0, 1) => s.to_string(),
        (0, _) => s.replace('.', ""),
        _ => {
            let comma_pos = s.rfind(',');
            let dot_pos = s.rfind('.');
            if comma_pos > dot_pos {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    }
}

/// Parse a matched numeric group for `field`.
///
/// A dangling point (`"950,"`) is dropped when it is the only point, and a
/// leading one (`",5"`) gets a zero, as ordinary float parsing does. Anything
/// else that is not a plain decimal is an error, so `"10,00,"` is rejected.
pub fn parse_decimal(field: &str, raw: &str, format: DecimalFormat) -> Result<Decimal> {
    let normalized = normalize_decimal(raw.trim(), format);
    let trimmed = match normalized.strip_suffix('.') {
        Some(rest) if !rest.contains('.') => rest,
        _ => normalized.as_str(),
    };
    let candidate = if trimmed.starts_with('.') {
        format!("0{}", trimmed)
    } else {
        trimmed.to_string()
    };

    let well_formed = candidate.chars().any(|c| c.is_ascii_digit())
        && candidate.chars().all(|c| c.is_ascii_digit() || c == '.')
        && candidate.matches('.').count() <= 1
        && !candidate.ends_with('.');

    if !well_formed {
        return Err(ExtractionError::parse(field, raw));
    }

    Decimal::from_str(&candidate).map_err(|_| ExtractionError::parse(field, raw))
}

/// Convert a USD amount to local currency, rounded half away from zero to
/// two decimals.
pub fn convert_to_local(field: &str, usd: Decimal, rate: Decimal) -> Result<Decimal> {
    usd.checked_mul(rate)
        .map(|v| v.round_dp_with_strategy(LOCAL_AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| ExtractionError::Overflow {
            field: field.to_string(),
            rate: rate.to_string(),
        })
}

fn local_amount(field: &str, caps: &Captures<'_>, ctx: &RuleContext) -> Result<Decimal> {
    let usd = parse_decimal(field, &caps[1], ctx.decimal_format)?;
    let local = convert_to_local(field, usd, ctx.exchange_rate)?;
    debug!("{}: U$S {} -> {}", field, usd, local);
    Ok(local)
}

/// `Tipo de cambio:` rule. Defaults to 1, meaning no conversion.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExchangeRateRule;

impl FieldRule for ExchangeRateRule {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "tipo_cambio"
    }

    fn pattern(&self) -> &Regex {
        &EXCHANGE_RATE
    }

    fn default_value(&self) -> Decimal {
        Decimal::ONE
    }

    fn convert(&self, caps: &Captures<'_>, ctx: &RuleContext) -> Result<Decimal> {
        let rate = parse_decimal(self.name(), &caps[1], ctx.decimal_format)?;
        if rate.is_zero() {
            warn!("Exchange rate is zero; every converted amount will be zero");
        }
        debug!("{}: {}", self.name(), rate);
        Ok(rate)
    }
}

/// `IVA 21.00% U$S` rule, converted to local currency.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaxAmountRule;

impl FieldRule for TaxAmountRule {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "iva"
    }

    fn pattern(&self) -> &Regex {
        &TAX_AMOUNT
    }

    fn default_value(&self) -> Decimal {
        Decimal::ZERO
    }

    fn convert(&self, caps: &Captures<'_>, ctx: &RuleContext) -> Result<Decimal> {
        local_amount(self.name(), caps, ctx)
    }
}

/// `Percepciones U$S` rule, converted to local currency.
#[derive(Debug, Default, Clone, Copy)]
pub struct WithholdingRule;

impl FieldRule for WithholdingRule {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "percepciones"
    }

    fn pattern(&self) -> &Regex {
        &WITHHOLDING_AMOUNT
    }

    fn default_value(&self) -> Decimal {
        Decimal::ZERO
    }

    fn convert(&self, caps: &Captures<'_>, ctx: &RuleContext) -> Result<Decimal> {
        local_amount(self.name(), caps, ctx)
    }
}
