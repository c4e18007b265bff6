// caseflow-parser/src/numbers.rs
// ============================================================================
// Module: Value Normalization
// Description: Numeric parsing, GTIN check-digit validation, and SKU
//              normalization.
// Purpose: Turn raw cell text into the canonical field types the order model
//          requires, independent of locale formatting quirks.
// Dependencies: bigdecimal
// ============================================================================

//! ## Overview
//! Spreadsheets submitted to Caseflow mix US and European decimal
//! conventions and may use Persian/Arabic digits or embedded currency
//! symbols. This module normalizes raw cell text into [`BigDecimal`] values,
//! validates GTIN check digits per the GS1 algorithm, and normalizes SKU
//! text, all without ever trusting locale metadata from the workbook itself.

use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::language::fold_digits;

/// Strips currency symbols and whitespace, folds Persian/Arabic digits to
/// ASCII, and reconciles the decimal separator using a last-separator
/// heuristic, returning a parsed decimal value.
///
/// Decimal heuristic: if both `,` and `.` appear, whichever appears last is
/// treated as the decimal separator and the other is treated as a thousands
/// separator and stripped. If only `,` appears, it is treated as the decimal
/// separator when it is followed by exactly 1-2 digits at the end of the
/// string, and as a thousands separator otherwise.
#[must_use]
pub fn parse_numeric_cell(raw: &str) -> Option<BigDecimal> {
    let folded = fold_digits(raw);
    let stripped: String = folded
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == ',' || *ch == '.' || *ch == '-')
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let last_comma = stripped.rfind(',');
    let last_dot = stripped.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma_pos), Some(dot_pos)) => {
            if comma_pos > dot_pos {
                // Comma is the decimal separator; dots are thousands separators.
                stripped.replace('.', "").replace(',', ".")
            } else {
                stripped.replace(',', "")
            }
        }
        (Some(comma_pos), None) => {
            let digits_after = stripped.len() - comma_pos - 1;
            if (1..=2).contains(&digits_after) {
                stripped.replace(',', ".")
            } else {
                stripped.replace(',', "")
            }
        }
        (None, Some(_)) | (None, None) => stripped,
    };

    BigDecimal::from_str(&normalized).ok()
}

/// Trims, uppercases, and collapses interior whitespace in a SKU value.
#[must_use]
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// Valid GTIN digit-string lengths per GS1.
pub const VALID_GTIN_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// Strips non-digit characters from a GTIN candidate, folding Persian/Arabic
/// digits first.
#[must_use]
pub fn strip_gtin(raw: &str) -> String {
    fold_digits(raw).chars().filter(char::is_ascii_digit).collect()
}

/// Validates a GTIN digit string against the GS1 check-digit algorithm.
///
/// Returns `false` if the digit string is not one of the valid GTIN lengths,
/// so callers should check length errors separately if they want a distinct
/// diagnostic from a failed checksum.
#[must_use]
pub fn gtin_check_digit_valid(digits: &str) -> bool {
    if !VALID_GTIN_LENGTHS.contains(&digits.len()) || !digits.chars().all(|ch| ch.is_ascii_digit())
    {
        return false;
    }
    let bytes: Vec<u32> = digits.chars().map(|ch| ch.to_digit(10).unwrap_or(0)).collect();
    let (payload, check_digit) = bytes.split_at(bytes.len() - 1);
    let mut sum: u32 = 0;
    for (index, digit) in payload.iter().rev().enumerate() {
        let weight = if index % 2 == 0 { 3 } else { 1 };
        sum += digit * weight;
    }
    let computed_check = (10 - (sum % 10)) % 10;
    computed_check == check_digit[0]
}

/// Currency symbols mapped to their ISO 4217 code, checked against raw cell
/// text when no dedicated currency column was mapped.
const CURRENCY_SYMBOLS: &[(&str, &str)] =
    &[("$", "USD"), ("€", "EUR"), ("£", "GBP"), ("¥", "JPY"), ("﷼", "IRR"), ("ریال", "IRR")];

/// 3-letter ISO 4217 codes recognized when they appear as a standalone token
/// in cell text.
const CURRENCY_CODES: &[&str] =
    &["USD", "EUR", "GBP", "JPY", "IRR", "AED", "SAR", "CNY", "TRY"];

/// Detects a currency by symbol or 3-letter ISO code present in cell text,
/// per the value-normalization stage's currency rule.
#[must_use]
pub fn detect_currency(raw: &str) -> Option<&'static str> {
    for (symbol, code) in CURRENCY_SYMBOLS {
        if raw.contains(symbol) {
            return Some(code);
        }
    }
    let upper = raw.to_uppercase();
    CURRENCY_CODES.iter().find(|code| upper.split_whitespace().any(|token| token == **code)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_us_decimal_convention() {
        let value = parse_numeric_cell("$1,234.50").expect("parses");
        assert_eq!(value, BigDecimal::from_str("1234.50").expect("literal"));
    }

    #[test]
    fn parses_european_decimal_convention() {
        let value = parse_numeric_cell("1.234,50").expect("parses");
        assert_eq!(value, BigDecimal::from_str("1234.50").expect("literal"));
    }

    #[test]
    fn parses_persian_digits() {
        let value = parse_numeric_cell("۱۲۳.۵۰").expect("parses");
        assert_eq!(value, BigDecimal::from_str("123.50").expect("literal"));
    }

    #[test]
    fn folds_and_strips_to_digits_only_for_gtin() {
        assert_eq!(strip_gtin("٠١٢٣٤٥٦٧"), "01234567");
    }

    #[test]
    fn validates_known_gtin13_check_digit() {
        // 4006381333931 is the canonical GS1 example GTIN-13.
        assert!(gtin_check_digit_valid("4006381333931"));
        assert!(!gtin_check_digit_valid("4006381333930"));
    }

    #[test]
    fn rejects_invalid_gtin_length() {
        assert!(!gtin_check_digit_valid("123456"));
    }

    #[test]
    fn normalizes_sku_casing_and_whitespace() {
        assert_eq!(normalize_sku("  ab-  12  "), "AB- 12");
    }

    #[test]
    fn detects_currency_by_symbol_and_iso_code() {
        assert_eq!(detect_currency("$1,234.50"), Some("USD"));
        assert_eq!(detect_currency("1234.50 EUR"), Some("EUR"));
        assert_eq!(detect_currency("1234.50"), None);
    }
}
