//! Issue date extraction.

use regex::{Captures, Regex};
use tracing::debug;

use super::patterns::ISSUE_DATE;
use super::{FieldRule, RuleContext};
use crate::error::ExtractionError;
use crate::invoice::Result;
use crate::models::receipt::IssueDate;

/// `Fecha: DD/MM/YYYY` rule. Defaults to [`IssueDate::SENTINEL`].
#[derive(Debug, Default, Clone, Copy)]
pub struct IssueDateRule;

impl FieldRule for IssueDateRule {
    type Output = IssueDate;

    fn name(&self) -> &'static str {
        "fecha"
    }

    fn pattern(&self) -> &Regex {
        &ISSUE_DATE
    }

    fn default_value(&self) -> IssueDate {
        IssueDate::SENTINEL
    }

    fn convert(&self, caps: &Captures<'_>, _ctx: &RuleContext) -> Result<IssueDate> {
        let date = parse_issue_date(&caps[1])?;
        debug!("{}: {}", self.name(), date);
        Ok(date)
    }
}

/// Split a `DD/MM/YYYY` string into its integer components.
///
/// Anything other than three numeric `/`-separated parts is an error: the
/// label matched text of an unexpected shape.
pub fn parse_issue_date(raw: &str) -> Result<IssueDate> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(ExtractionError::MalformedDate {
            value: raw.to_string(),
        });
    };

    let day: u32 = day.parse().map_err(|_| ExtractionError::parse("fecha.dia", day))?;
    let month: u32 = month.parse().map_err(|_| ExtractionError::parse("fecha.mes", month))?;
    let year: i32 = year.parse().map_err(|_| ExtractionError::parse("fecha.anio", year))?;

    Ok(IssueDate::new(day, month, year))
}
