use std::str::FromStr;

use kabala_core::{mapping_for, ColumnMapping, ReceiptField};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),
    #[error("Invalid override '{0}': expected COLUMN=FIELD")]
    InvalidOverride(String),
    #[error("{0}")]
    UnknownField(String),
}

/// Re-point one column at `field`. Only that entry changes; it becomes manual.
///
/// No exclusivity check is made: the same field may end up claimed twice, in
/// which case the leftmost column is the one used.
pub fn apply_override(
    mappings: &[ColumnMapping],
    excel_column: &str,
    field: ReceiptField,
) -> Result<Vec<ColumnMapping>, MappingError> {
    if !mappings.iter().any(|m| m.excel_column == excel_column) {
        return Err(MappingError::UnknownColumn(excel_column.to_string()));
    }
    info!(column = excel_column, %field, "manual mapping override");
    Ok(mappings
        .iter()
        .map(|m| {
            if m.excel_column == excel_column {
                ColumnMapping::manual(excel_column, field)
            } else {
                m.clone()
            }
        })
        .collect())
}

/// Apply overrides in order; later ones see the effect of earlier ones.
pub fn apply_overrides(
    mappings: &[ColumnMapping],
    overrides: &[(String, ReceiptField)],
) -> Result<Vec<ColumnMapping>, MappingError> {
    overrides
        .iter()
        .try_fold(mappings.to_vec(), |acc, (column, field)| {
            apply_override(&acc, column, *field)
        })
}

/// Parse `COLUMN=field`. The split is on the last `=` so column titles may
/// contain one.
pub fn parse_override(s: &str) -> Result<(String, ReceiptField), MappingError> {
    let (column, field) = s
        .rsplit_once('=')
        .ok_or_else(|| MappingError::InvalidOverride(s.to_string()))?;
    if column.is_empty() {
        return Err(MappingError::InvalidOverride(s.to_string()));
    }
    let field = ReceiptField::from_str(field).map_err(MappingError::UnknownField)?;
    Ok((column.to_string(), field))
}

/// Required fields no column is mapped to.
pub fn missing_required_fields(mappings: &[ColumnMapping]) -> Vec<ReceiptField> {
    ReceiptField::REQUIRED
        .into_iter()
        .filter(|f| mapping_for(mappings, *f).is_none())
        .collect()
}
