use std::fmt;

use kabala_core::{ColumnMapping, FieldError, ReceiptField};
use serde::{Deserialize, Serialize};

use crate::overrides::missing_required_fields;
use crate::validate::Partition;

/// The errors of one rejected row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowIssue {
    pub row_number: usize,
    pub errors: Vec<FieldError>,
}

/// Outcome of validating one sheet, ready to show to the person importing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub mappings: Vec<ColumnMapping>,
    pub unmapped_required: Vec<ReceiptField>,
    pub issues: Vec<RowIssue>,
}

impl ImportReport {
    pub fn new(mappings: &[ColumnMapping], partition: &Partition) -> Self {
        Self {
            total_rows: partition.len(),
            valid_rows: partition.valid.len(),
            invalid_rows: partition.invalid.len(),
            mappings: mappings.to_vec(),
            unmapped_required: missing_required_fields(mappings),
            issues: partition
                .invalid
                .iter()
                .map(|row| RowIssue {
                    row_number: row.row_number,
                    errors: row.errors.clone(),
                })
                .collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.invalid_rows == 0 && self.unmapped_required.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} rows: {} valid, {} invalid",
            self.total_rows, self.valid_rows, self.invalid_rows
        )?;
        for field in &self.unmapped_required {
            writeln!(f, "  no column mapped to {field}")?;
        }
        for issue in &self.issues {
            let messages: Vec<String> = issue.errors.iter().map(ToString::to_string).collect();
            writeln!(f, "  row {}: {}", issue.row_number, messages.join("; "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::infer_column_mappings;
    use crate::validate::partition_rows;
    use kabala_core::{CellValue, RawRow};
    use std::collections::BTreeMap;

    fn row(n: usize, name: &str, sum: &str) -> RawRow {
        let mut data = BTreeMap::new();
        data.insert("Name".to_string(), CellValue::from(name));
        data.insert("Sum".to_string(), CellValue::from(sum));
        RawRow::new(n, data)
    }

    #[test]
    fn report_counts_and_issues() {
        let mappings = infer_column_mappings(&["Name", "Sum"]);
        let partition = partition_rows(&[row(2, "Dana", "10"), row(3, "A", "")], &mappings);
        let report = ImportReport::new(&mappings, &partition);

        assert_eq!(report.total_rows, 2);
        // No date column, so every row fails.
        assert_eq!(report.valid_rows, 0);
        assert_eq!(report.unmapped_required, vec![ReceiptField::Date]);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[1].row_number, 3);
        assert_eq!(report.issues[1].errors.len(), 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn report_display() {
        let mappings = infer_column_mappings(&["Name", "Sum"]);
        let partition = partition_rows(&[row(3, "A", "5")], &mappings);
        let text = ImportReport::new(&mappings, &partition).to_string();
        assert!(text.starts_with("1 rows: 0 valid, 1 invalid"));
        assert!(text.contains("no column mapped to date"));
        assert!(text.contains("row 3: customerName: name too short; date: field not mapped."));
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ImportReport::new(&[], &Partition::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalRows"], 0);
        assert_eq!(json["unmappedRequired"][0], "customerName");
        assert!(report.issues.is_empty());
    }
}
