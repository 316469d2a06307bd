//! Parsing the dashboard forms into backend requests.
//!
//! Browsers send every field as text, so the numeric fields are coerced the
//! way a lenient float parse would: the longest numeric prefix is used and
//! anything else becomes zero. Range checks are left to the backend so that
//! its error message reaches the user.

use serde::Deserialize;

use crate::{
    Error,
    transaction::{ExportFormat, ExportRequest, GenerateRequest},
};

/// Inputs longer than this are not numbers anyone typed.
const MAX_NUMBER_LENGTH: usize = 64;

/// The raw fields of the generate form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerateForm {
    pub count: String,
    pub transaction_type: String,
    pub status: String,
    pub min_amount: String,
    pub max_amount: String,
    pub currency: String,
    pub days_back: String,
}

impl GenerateForm {
    /// Convert the form into a request, without range checks.
    ///
    /// Empty selects mean "any" and an empty currency falls back to the
    /// default currency.
    ///
    /// # Errors
    /// Returns an error if a select holds a value that is not a known
    /// transaction type or status.
    pub fn into_request(self) -> Result<GenerateRequest, Error> {
        let transaction_type = match self.transaction_type.trim() {
            "" => None,
            text => Some(text.parse()?),
        };
        let status = match self.status.trim() {
            "" => None,
            text => Some(text.parse()?),
        };
        let currency = match self.currency.trim() {
            "" => GenerateRequest::default().currency,
            text => text.to_owned(),
        };

        Ok(GenerateRequest {
            count: coerce_number(&self.count) as u32,
            transaction_type,
            status,
            min_amount: coerce_number(&self.min_amount),
            max_amount: coerce_number(&self.max_amount),
            currency,
            days_back: coerce_number(&self.days_back) as u32,
        })
    }
}

/// The raw fields of the export form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportForm {
    pub format: String,
}

impl ExportForm {
    /// Convert the form into a request for every transaction.
    ///
    /// # Errors
    /// Returns [Error::InvalidExportFormat] for anything other than "json",
    /// "csv" or an empty string.
    pub fn into_request(self) -> Result<ExportRequest, Error> {
        let format = match self.format.trim() {
            "" => ExportFormat::default(),
            text => text.parse()?,
        };

        Ok(ExportRequest {
            format,
            ..Default::default()
        })
    }
}

/// Parse the longest numeric prefix of `text`, e.g. "12.5abc" is 12.5.
///
/// Returns zero if there is no numeric prefix or the value is not finite.
pub fn coerce_number(text: &str) -> f64 {
    let text: String = text.trim_start().chars().take(MAX_NUMBER_LENGTH).collect();

    text.char_indices()
        .map(|(index, c)| index + c.len_utf8())
        .rev()
        .find_map(|end| text[..end].parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod coerce_number_tests {
    use super::coerce_number;

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(coerce_number("42"), 42.0);
        assert_eq!(coerce_number("  12.75"), 12.75);
        assert_eq!(coerce_number("-3"), -3.0);
        assert_eq!(coerce_number(".5"), 0.5);
    }

    #[test]
    fn uses_longest_numeric_prefix() {
        assert_eq!(coerce_number("12.5abc"), 12.5);
        assert_eq!(coerce_number("1e3x"), 1000.0);
        assert_eq!(coerce_number("7e"), 7.0);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("-"), 0.0);
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(coerce_number("1e999"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
    }
}
