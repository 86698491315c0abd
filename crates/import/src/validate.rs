use kabala_core::{mapping_for, ColumnMapping, FieldError, RawRow, ReceiptField};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parse::{parse_amount, parse_date, parse_name};

/// Batches at least this large are validated on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

/// Validate the required fields of one row against the current mapping.
///
/// Returns a copy of `row` whose `errors` and `is_valid` are recomputed from
/// scratch; nothing else changes. Optional fields are never checked.
pub fn validate_row(row: &RawRow, mappings: &[ColumnMapping]) -> RawRow {
    let errors: Vec<FieldError> = ReceiptField::REQUIRED
        .iter()
        .filter_map(|&field| check_required(row, mappings, field))
        .collect();
    row.with_errors(errors)
}

fn check_required(
    row: &RawRow,
    mappings: &[ColumnMapping],
    field: ReceiptField,
) -> Option<FieldError> {
    let Some(mapping) = mapping_for(mappings, field) else {
        return Some(FieldError::not_mapped(field));
    };
    let cell = row.cell(&mapping.excel_column);
    let failure = match field {
        ReceiptField::CustomerName => parse_name(cell).err(),
        ReceiptField::Amount => parse_amount(cell).err(),
        ReceiptField::Date => parse_date(cell).err(),
        _ => None,
    };
    failure.map(FieldError::from)
}

/// Rows split by validity, each side in original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub valid: Vec<RawRow>,
    pub invalid: Vec<RawRow>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when at least one row can become a receipt.
    pub fn has_valid_rows(&self) -> bool {
        !self.valid.is_empty()
    }
}

/// Validate every row and split the batch into valid and invalid rows.
pub fn partition_rows(rows: &[RawRow], mappings: &[ColumnMapping]) -> Partition {
    partition_rows_with(rows, mappings, DEFAULT_PARALLEL_THRESHOLD)
}

/// As [`partition_rows`], validating on the rayon pool once the batch reaches
/// `parallel_threshold` rows. A threshold of 0 keeps validation sequential.
pub fn partition_rows_with(
    rows: &[RawRow],
    mappings: &[ColumnMapping],
    parallel_threshold: usize,
) -> Partition {
    let parallel = parallel_threshold > 0 && rows.len() >= parallel_threshold;
    // `collect` on an indexed parallel iterator keeps input order.
    let validated: Vec<RawRow> = if parallel {
        rows.par_iter().map(|row| validate_row(row, mappings)).collect()
    } else {
        rows.iter().map(|row| validate_row(row, mappings)).collect()
    };

    let (valid, invalid): (Vec<RawRow>, Vec<RawRow>) =
        validated.into_iter().partition(|row| row.is_valid);

    for row in &invalid {
        debug!(row = row.row_number, errors = row.errors.len(), "row rejected");
    }
    info!(
        total = rows.len(),
        valid = valid.len(),
        invalid = invalid.len(),
        parallel,
        "rows validated"
    );

    Partition { valid, invalid }
}
