pub mod csv;
pub mod infer;
pub mod overrides;
pub mod parse;
pub mod receipts;
pub mod report;
pub mod settings;
pub mod sheet;
pub mod source;
pub mod validate;

pub use infer::{infer_column_mappings, FIELD_KEYWORDS, MIN_CONFIDENCE};
pub use overrides::{
    apply_override, apply_overrides, missing_required_fields, parse_override, MappingError,
};
pub use parse::{parse_amount, parse_date, parse_name, ParseError};
pub use receipts::{build_receipt, build_receipts, ReceiptBatch, ReceiptError};
pub use report::{ImportReport, RowIssue};
pub use settings::{ImportSettings, SettingsError};
pub use sheet::{Grid, Sheet, SheetError};
pub use source::{
    map_columns, reconcile_suggestions, KeywordMatcher, MappingSource, PresetSuggestions,
};
pub use validate::{partition_rows, partition_rows_with, validate_row, Partition};

pub mod import {
    use crate::*;
    use kabala_core::ColumnMapping;

    pub fn load_csv<R: std::io::Read>(
        data: R,
        settings: &ImportSettings,
    ) -> Result<Sheet, SheetError> {
        crate::csv::read_sheet(data, settings)
    }

    pub fn load_grid(grid: Grid, settings: &ImportSettings) -> Result<Sheet, SheetError> {
        Sheet::from_grid(grid, settings.header_row)
    }

    pub fn suggest_mappings(sheet: &Sheet) -> Vec<ColumnMapping> {
        KeywordMatcher.suggest(&sheet.headers)
    }

    pub fn validate_sheet(
        sheet: &Sheet,
        mappings: &[ColumnMapping],
        settings: &ImportSettings,
    ) -> Partition {
        partition_rows_with(&sheet.rows, mappings, settings.parallel_threshold)
    }
}
