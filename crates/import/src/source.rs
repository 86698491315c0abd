use std::collections::{HashMap, HashSet};

use kabala_core::{ColumnMapping, ReceiptField};
use tracing::warn;

use crate::infer::infer_column_mappings;

/// Anything that can propose a column mapping for a header row.
///
/// The keyword matcher is the built-in source; suggestions obtained elsewhere
/// (an assistant, a saved profile) go through [`reconcile_suggestions`] so the
/// validator always sees one mapping per header.
pub trait MappingSource {
    fn suggest(&self, headers: &[String]) -> Vec<ColumnMapping>;
}

/// Keyword-table inference.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

impl MappingSource for KeywordMatcher {
    fn suggest(&self, headers: &[String]) -> Vec<ColumnMapping> {
        infer_column_mappings(headers)
    }
}

/// A fixed list of suggestions, e.g. loaded from JSON.
#[derive(Debug, Clone, Default)]
pub struct PresetSuggestions {
    pub suggestions: Vec<ColumnMapping>,
}

impl PresetSuggestions {
    pub fn new(suggestions: Vec<ColumnMapping>) -> Self {
        Self { suggestions }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl MappingSource for PresetSuggestions {
    fn suggest(&self, headers: &[String]) -> Vec<ColumnMapping> {
        reconcile_suggestions(headers, &self.suggestions)
    }
}

/// Turn arbitrary suggestions into one mapping per header, in header order.
///
/// Suggestions naming unknown headers are dropped, the first suggestion per
/// header wins, a field already taken by an earlier header becomes `ignore`,
/// and headers nobody suggested are ignored.
pub fn reconcile_suggestions(
    headers: &[String],
    suggestions: &[ColumnMapping],
) -> Vec<ColumnMapping> {
    let known: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let mut by_header: HashMap<&str, &ColumnMapping> = HashMap::new();
    for s in suggestions {
        if !known.contains(s.excel_column.as_str()) {
            warn!(column = %s.excel_column, "suggestion for unknown column dropped");
            continue;
        }
        by_header.entry(s.excel_column.as_str()).or_insert(s);
    }

    let mut claimed: HashSet<ReceiptField> = HashSet::new();
    headers
        .iter()
        .map(|header| match by_header.get(header.as_str()) {
            Some(s) if s.receipt_field.is_ignore() => ColumnMapping::ignored(header.as_str()),
            Some(s) if claimed.insert(s.receipt_field) => {
                ColumnMapping::inferred(header.as_str(), s.receipt_field, s.confidence)
            }
            Some(s) => {
                warn!(
                    column = %header,
                    field = %s.receipt_field,
                    "field already claimed, column ignored"
                );
                ColumnMapping::ignored(header.as_str())
            }
            None => ColumnMapping::ignored(header.as_str()),
        })
        .collect()
}

/// Run `source` over `headers`.
pub fn map_columns(source: &dyn MappingSource, headers: &[String]) -> Vec<ColumnMapping> {
    source.suggest(headers)
}
