use serde::{Deserialize, Serialize};

use crate::field::ReceiptField;

/// Assignment of one spreadsheet header to one receipt field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub excel_column: String,
    pub receipt_field: ReceiptField,
    /// 0.0 = no evidence, 1.0 = exact keyword hit or human choice.
    pub confidence: f32,
    pub is_manual: bool,
}

impl ColumnMapping {
    pub fn inferred(excel_column: impl Into<String>, field: ReceiptField, confidence: f32) -> Self {
        Self {
            excel_column: excel_column.into(),
            receipt_field: field,
            confidence: confidence.clamp(0.0, 1.0),
            is_manual: false,
        }
    }

    pub fn ignored(excel_column: impl Into<String>) -> Self {
        Self::inferred(excel_column, ReceiptField::Ignore, 0.0)
    }

    pub fn manual(excel_column: impl Into<String>, field: ReceiptField) -> Self {
        let confidence = if field.is_ignore() { 0.0 } else { 1.0 };
        Self {
            excel_column: excel_column.into(),
            receipt_field: field,
            confidence,
            is_manual: true,
        }
    }
}

/// First mapping claiming `field`. Manual overrides can leave a field claimed
/// twice; the leftmost claim wins.
pub fn mapping_for(mappings: &[ColumnMapping], field: ReceiptField) -> Option<&ColumnMapping> {
    mappings.iter().find(|m| m.receipt_field == field)
}
