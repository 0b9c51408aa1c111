//! Value checks for data fields, by field kind.

use chrono::NaiveDate;
use url::Url;

use super::codes::{COUNTRIES, CURRENCIES};
use crate::types::FieldKind;

/// Whether `code` is an ISO 4217 currency code.
pub fn is_currency(code: &str) -> bool {
    CURRENCIES.binary_search(&code).is_ok()
}

/// Whether `code` is an ISO 3166-1 alpha-2 country code.
pub fn is_country(code: &str) -> bool {
    COUNTRIES.binary_search(&code).is_ok()
}

/// Whether `value` is a finite decimal number such as `99.99`.
pub fn is_decimal(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        && value.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Check `value` against the content rules of `kind`.
///
/// Media kinds carry their content as uploads, so any value is accepted.
pub fn check_value(kind: FieldKind, value: &str) -> Result<(), String> {
    let ok = match kind {
        FieldKind::Country => is_country(value),
        FieldKind::Rating => value.parse::<u8>().is_ok_and(|r| r <= 10),
        FieldKind::Checkbox => value == "0" || value == "1",
        FieldKind::Link => Url::parse(value).is_ok_and(|url| url.has_host() && !url.cannot_be_a_base()),
        FieldKind::ChoiceList => serde_json::from_str::<Vec<String>>(value).is_ok(),
        FieldKind::Date => value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        FieldKind::Number => value.parse::<i64>().is_ok(),
        FieldKind::Price => is_decimal(value),
        FieldKind::Text
        | FieldKind::Textarea
        | FieldKind::List
        | FieldKind::Sign
        | FieldKind::BlankLine
        | FieldKind::Section => !value.trim().is_empty(),
        FieldKind::Image | FieldKind::File | FieldKind::Video => true,
    };
    if ok {
        return Ok(());
    }
    let expected = match kind {
        FieldKind::Country => "an ISO 3166 alpha-2 country code",
        FieldKind::Rating => "an integer between 0 and 10",
        FieldKind::Checkbox => "\"0\" or \"1\"",
        FieldKind::Link => "an absolute URL",
        FieldKind::ChoiceList => "a JSON array of strings",
        FieldKind::Date => "a date formatted YYYY-MM-DD",
        FieldKind::Number => "an integer",
        FieldKind::Price => "a decimal number",
        _ => "a non-empty string",
    };
    Err(format!("{} value {value:?} must be {expected}", kind.as_str()))
}
