use std::collections::HashSet;

use kabala_core::{ColumnMapping, ReceiptField};
use tracing::debug;

/// Below this a header is left unmapped.
pub const MIN_CONFIDENCE: f32 = 0.3;

/// Weight when the header contains the keyword ("customer name (full)" ⊃ "customer name").
const HEADER_CONTAINS_WEIGHT: f32 = 0.9;

/// Weight when the keyword contains the header ("cust" ⊂ "customer").
const KEYWORD_CONTAINS_WEIGHT: f32 = 0.8;

/// Headers this short never match as a fragment of a longer keyword.
const MIN_FRAGMENT_LEN: usize = 3;

/// Candidate header keywords per field. Order matters: fields and keywords are
/// scanned top to bottom and ties go to the first seen.
pub const FIELD_KEYWORDS: &[(ReceiptField, &[&str])] = &[
    (
        ReceiptField::CustomerName,
        &[
            "שם לקוח",
            "שם הלקוח",
            "שם מלא",
            "לקוח",
            "שם",
            "customer name",
            "customer",
            "client",
            "full name",
            "name",
            "payer",
        ],
    ),
    (
        ReceiptField::Amount,
        &["סכום", "סה\"כ", "מחיר", "amount", "sum", "total", "price"],
    ),
    (
        ReceiptField::Date,
        &["תאריך", "תאריך עסקה", "date", "transaction date"],
    ),
    (
        ReceiptField::Description,
        &[
            "תיאור",
            "פירוט",
            "מוצר",
            "שירות",
            "description",
            "details",
            "item",
            "product",
            "service",
        ],
    ),
    (
        ReceiptField::PaymentMethod,
        &[
            "אמצעי תשלום",
            "אופן תשלום",
            "תשלום",
            "payment method",
            "payment",
            "method",
        ],
    ),
    (
        ReceiptField::TransactionId,
        &["מספר עסקה", "אסמכתא", "מזהה", "transaction id", "reference", "id"],
    ),
    (
        ReceiptField::Notes,
        &["הערות", "הערה", "notes", "note", "comments", "remarks"],
    ),
];

/// Guess a receipt field for every header.
///
/// Headers are processed left to right and each field goes to the first
/// header that claims it; later headers only compete for what is left. The
/// result has one mapping per header, in header order, none of them manual.
pub fn infer_column_mappings<S: AsRef<str>>(headers: &[S]) -> Vec<ColumnMapping> {
    let mut claimed: HashSet<ReceiptField> = HashSet::new();

    headers
        .iter()
        .map(|header| {
            let header = header.as_ref();
            match best_field(header, &claimed) {
                Some((field, score)) if score >= MIN_CONFIDENCE => {
                    claimed.insert(field);
                    debug!(header, %field, score, "column mapped");
                    ColumnMapping::inferred(header, field, score)
                }
                best => {
                    debug!(header, best_score = best.map_or(0.0, |(_, s)| s), "column ignored");
                    ColumnMapping::ignored(header)
                }
            }
        })
        .collect()
}

/// Highest-scoring unclaimed field for `header`; an exact keyword hit ends
/// the search immediately.
fn best_field(header: &str, claimed: &HashSet<ReceiptField>) -> Option<(ReceiptField, f32)> {
    let header = normalize(header);
    let header_len = header.chars().count();
    let mut best: Option<(ReceiptField, f32)> = None;

    for (field, keywords) in FIELD_KEYWORDS {
        if field.is_ignore() || claimed.contains(field) {
            continue;
        }
        for keyword in keywords.iter() {
            let keyword = normalize(keyword);
            if keyword == header {
                return Some((*field, 1.0));
            }
            let score = keyword_score(&header, header_len, &keyword);
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((*field, score));
            }
        }
    }

    best
}

fn keyword_score(header: &str, header_len: usize, keyword: &str) -> f32 {
    let keyword_len = keyword.chars().count();
    if keyword_len == 0 || header_len == 0 {
        return 0.0;
    }
    if header.contains(keyword) {
        keyword_len as f32 / header_len as f32 * HEADER_CONTAINS_WEIGHT
    } else if header_len >= MIN_FRAGMENT_LEN && keyword.contains(header) {
        header_len as f32 / keyword_len as f32 * KEYWORD_CONTAINS_WEIGHT
    } else {
        0.0
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
