use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cell::CellValue;
use crate::field::FieldError;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One data row of the sheet, keyed by header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    /// Physical 1-based spreadsheet row, counting the header row.
    pub row_number: usize,
    pub data: BTreeMap<String, CellValue>,
    pub errors: Vec<FieldError>,
    pub is_valid: bool,
}

impl RawRow {
    /// A row that has not been through validation yet.
    pub fn new(row_number: usize, data: BTreeMap<String, CellValue>) -> Self {
        Self {
            row_number,
            data,
            errors: Vec::new(),
            is_valid: false,
        }
    }

    /// The cell under `header`; absent keys read as [`CellValue::Empty`].
    pub fn cell(&self, header: &str) -> &CellValue {
        self.data.get(header).unwrap_or(&EMPTY_CELL)
    }

    /// Same row with the validation outcome replaced as a unit.
    pub fn with_errors(&self, errors: Vec<FieldError>) -> Self {
        let is_valid = !errors.iter().any(FieldError::is_error);
        Self {
            row_number: self.row_number,
            data: self.data.clone(),
            errors,
            is_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ErrorKind, ReceiptField, Severity};

    fn row() -> RawRow {
        let mut data = BTreeMap::new();
        data.insert("Name".to_string(), CellValue::from("Dana"));
        RawRow::new(2, data)
    }

    #[test]
    fn missing_header_reads_as_empty() {
        let r = row();
        assert_eq!(r.cell("Name"), &CellValue::from("Dana"));
        assert_eq!(r.cell("Nope"), &CellValue::Empty);
    }

    #[test]
    fn with_errors_sets_validity() {
        let r = row();
        assert!(r.with_errors(vec![]).is_valid);

        let err = FieldError::new(ReceiptField::Amount, ErrorKind::Missing, "amount missing");
        let invalid = r.with_errors(vec![err]);
        assert!(!invalid.is_valid);
        assert_eq!(invalid.row_number, 2);
        assert_eq!(invalid.data, r.data);
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let mut warn = FieldError::new(ReceiptField::Notes, ErrorKind::Invalid, "odd notes");
        warn.severity = Severity::Warning;
        assert!(row().with_errors(vec![warn]).is_valid);
    }
}
