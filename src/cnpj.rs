// =============================================================================
// cnpj.rs — DIGITS IN, DIGITS OUT
// =============================================================================
//
// Users paste CNPJs in every shape imaginable: "11.222.333/0001-44",
// "11222333000144", " 11 222 333 0001 44 ", or with a trailing newline from
// a spreadsheet. We keep the digits and throw away everything else.
//
// Check digits are NOT verified. The registry is the authority on whether a
// CNPJ exists; we only refuse input that cannot possibly be one.
// =============================================================================

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use tracing::debug;

use crate::error::ApiError;

/// A CNPJ has exactly this many digits once punctuation is stripped.
pub const CNPJ_DIGITS: usize = 14;

/// Strip every character that is not an ASCII decimal digit.
/// Relative order of the digits is preserved; empty input yields "".
pub fn normalize(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize and validate in one step. Every handler calls this before
/// touching the network.
pub fn normalize_and_validate(input: &str) -> Result<String, ApiError> {
    let digits = normalize(input);
    if digits.len() != CNPJ_DIGITS {
        debug!(digits = digits.len(), "Rejected CNPJ with wrong digit count");
        return Err(ApiError::InvalidCnpj);
    }
    Ok(digits)
}

/// Parse the registry's opening date. BrasilAPI sends plain `YYYY-MM-DD`,
/// but date-times have shown up in the wild too.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = value.parse::<NaiveDateTime>() {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive())
}

/// Whole years elapsed between `iso_date` and `today`.
///
/// Returns `None` when the date is absent or unparsable. The anniversary
/// counts: a company opened exactly one year ago is 1, one opened a year ago
/// tomorrow is still 0. An opening date in the future also gives 0.
pub fn years_since(iso_date: Option<&str>, today: NaiveDate) -> Option<i32> {
    let opened = parse_iso_date(iso_date?)?;
    let before_anniversary = (today.month(), today.day()) < (opened.month(), opened.day());
    Some((today.year() - opened.year() - i32::from(before_anniversary)).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("11.222.333/0001-44"), "11222333000144");
    }

    #[test]
    fn test_normalize_keeps_digit_order() {
        assert_eq!(normalize("a1b2c3 -9"), "1239");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("sem digitos"), "");
    }

    #[test]
    fn test_normalize_ignores_non_ascii_digits() {
        // Arabic-Indic digits are digits to Unicode, not to the Receita Federal
        assert_eq!(normalize("١٢3"), "3");
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        assert!(normalize_and_validate("1122233300014").is_err());
        assert!(normalize_and_validate("112223330001445").is_err());
        assert!(normalize_and_validate("").is_err());
        assert_eq!(
            normalize_and_validate(" 11.222.333/0001-44 ").unwrap(),
            "11222333000144"
        );
    }

    #[test]
    fn test_years_since_none_for_missing_or_garbage() {
        let today = date(2024, 6, 15);
        assert_eq!(years_since(None, today), None);
        assert_eq!(years_since(Some(""), today), None);
        assert_eq!(years_since(Some("15/06/2020"), today), None);
    }

    #[test]
    fn test_years_since_exact_anniversary() {
        let today = date(2024, 6, 15);
        assert_eq!(years_since(Some("2023-06-15"), today), Some(1));
    }

    #[test]
    fn test_years_since_day_before_anniversary() {
        let today = date(2024, 6, 15);
        assert_eq!(years_since(Some("2023-06-16"), today), Some(0));
        assert_eq!(years_since(Some("2024-06-14"), today), Some(0));
    }

    #[test]
    fn test_years_since_future_date_is_zero() {
        let today = date(2024, 6, 15);
        assert_eq!(years_since(Some("2024-06-16"), today), Some(0));
        assert_eq!(years_since(Some("2031-01-01"), today), Some(0));
    }

    #[test]
    fn test_years_since_accepts_datetime() {
        let today = date(2024, 6, 15);
        assert_eq!(years_since(Some("2004-01-02T00:00:00"), today), Some(20));
        assert_eq!(years_since(Some("2004-01-02 10:30:00"), today), Some(20));
    }
}
