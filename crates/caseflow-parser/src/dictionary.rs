// caseflow-parser/src/dictionary.rs
// ============================================================================
// Module: Header Dictionary
// Description: Bilingual (EN/FA) synonym lists used for header and total-row
//              detection.
// Purpose: Centralize the vocabulary the parser matches against so sheet
//          language does not change detection behavior.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! Every canonical field a sheet might carry has a short list of English and
//! Persian header synonyms. Matching is case-insensitive and ignores
//! surrounding whitespace; Persian synonyms are matched against the raw cell
//! text since digit folding does not apply to header words.

/// A canonical field name paired with its header synonyms in both languages.
pub struct FieldSynonyms {
    /// Canonical field identifier string (matches [`caseflow_core::FieldId`]).
    pub field: &'static str,
    /// English header synonyms, lowercase.
    pub english: &'static [&'static str],
    /// Persian header synonyms.
    pub persian: &'static [&'static str],
}

/// Synonym table for every canonical field the parser maps columns onto.
pub const FIELD_SYNONYMS: &[FieldSynonyms] = &[
    FieldSynonyms {
        field: "customer_name",
        english: &["customer", "customer name", "client", "buyer", "account name"],
        persian: &["مشتری", "نام مشتری", "خریدار"],
    },
    FieldSynonyms {
        field: "sku",
        english: &["sku", "item code", "product code", "part number"],
        persian: &["کد کالا", "کد محصول", "شماره قطعه"],
    },
    FieldSynonyms {
        field: "gtin",
        english: &["gtin", "ean", "upc", "barcode"],
        persian: &["بارکد", "جی تی ای ان"],
    },
    FieldSynonyms {
        field: "description",
        english: &["description", "product", "item", "item description", "product name"],
        persian: &["شرح کالا", "نام کالا", "شرح", "محصول"],
    },
    FieldSynonyms {
        field: "quantity",
        english: &["qty", "quantity", "count", "amount (qty)"],
        persian: &["تعداد", "مقدار"],
    },
    FieldSynonyms {
        field: "unit_price",
        english: &["unit price", "price", "rate", "unit cost"],
        persian: &["قیمت واحد", "نرخ", "قیمت"],
    },
    FieldSynonyms {
        field: "line_total",
        english: &["total", "line total", "amount", "extended price"],
        persian: &["جمع", "مبلغ کل", "جمع کل ردیف"],
    },
    FieldSynonyms {
        field: "currency",
        english: &["currency", "curr"],
        persian: &["ارز", "واحد پول"],
    },
    FieldSynonyms {
        field: "order_date",
        english: &["date", "order date", "invoice date"],
        persian: &["تاریخ", "تاریخ سفارش"],
    },
];

/// Keywords used to detect a row that states a total rather than a line item.
pub const TOTAL_ROW_KEYWORDS_ENGLISH: &[&str] =
    &["total", "grand total", "subtotal", "sum", "tax", "vat"];

/// Persian keywords used to detect a total row.
pub const TOTAL_ROW_KEYWORDS_PERSIAN: &[&str] =
    &["جمع کل", "جمع", "مالیات", "ارزش افزوده"];

/// Normalizes a header or keyword string for comparison: trims, lowercases
/// ASCII, and collapses interior whitespace.
#[must_use]
pub fn normalize_for_match(text: &str) -> String {
    let collapsed: String = text
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed.to_lowercase()
}

/// Returns the best-matching canonical field for a header string, scored 1.0
/// for an exact synonym match and 0.0 when no synonym matches at all.
#[must_use]
pub fn dictionary_score(header: &str, field: &str) -> f64 {
    let normalized = normalize_for_match(header);
    if normalized.is_empty() {
        return 0.0;
    }
    let Some(entry) = FIELD_SYNONYMS.iter().find(|entry| entry.field == field) else {
        return 0.0;
    };
    let exact = entry
        .english
        .iter()
        .any(|candidate| normalize_for_match(candidate) == normalized)
        || entry.persian.iter().any(|candidate| candidate == &header.trim());
    if exact {
        return 1.0;
    }
    let partial = entry
        .english
        .iter()
        .any(|candidate| normalized.contains(&normalize_for_match(candidate)))
        || entry.persian.iter().any(|candidate| header.contains(candidate));
    if partial { 0.6 } else { 0.0 }
}

/// Returns true if the text matches a total-row keyword in either language.
#[must_use]
pub fn is_total_row_keyword(text: &str) -> bool {
    let normalized = normalize_for_match(text);
    TOTAL_ROW_KEYWORDS_ENGLISH.iter().any(|keyword| normalized == *keyword)
        || TOTAL_ROW_KEYWORDS_PERSIAN.iter().any(|keyword| text.trim() == *keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_english_and_persian_synonyms() {
        assert_eq!(dictionary_score("Customer Name", "customer_name"), 1.0);
        assert_eq!(dictionary_score("مشتری", "customer_name"), 1.0);
        assert_eq!(dictionary_score("foobar", "customer_name"), 0.0);
    }

    #[test]
    fn detects_total_row_keywords() {
        assert!(is_total_row_keyword("Grand Total"));
        assert!(is_total_row_keyword("جمع کل"));
        assert!(!is_total_row_keyword("Widget A"));
    }
}
