use std::io::Read;

use kabala_core::CellValue;

use crate::settings::ImportSettings;
use crate::sheet::{Grid, Sheet, SheetError};

/// Decode CSV into a grid. Every non-empty field becomes a text cell; the
/// field parsers handle the typing.
pub fn read_grid<R: Read>(data: R, delimiter: u8) -> Result<Grid, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    reader
        .records()
        .map(|result| result.map(|record| record.iter().map(cell_from_field).collect::<Vec<_>>()))
        .collect()
}

fn cell_from_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field.to_string())
    }
}

/// Read a CSV export into a [`Sheet`] using the delimiter and header row from
/// `settings`.
pub fn read_sheet<R: Read>(data: R, settings: &ImportSettings) -> Result<Sheet, SheetError> {
    let grid = read_grid(data, settings.delimiter_byte())?;
    Sheet::from_grid(grid, settings.header_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_grid_basic() {
        let data = "Name,Sum,Date\nDana,\"1,234.50\",01/01/2025\n";
        let grid = read_grid(data.as_bytes(), b',').unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][1], CellValue::from("1,234.50"));
    }

    #[test]
    fn empty_fields_become_empty_cells() {
        let grid = read_grid("a,,c\n".as_bytes(), b',').unwrap();
        assert_eq!(grid[0][1], CellValue::Empty);
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let grid = read_grid("a,b,c\n1\n1,2,3,4\n".as_bytes(), b',').unwrap();
        assert_eq!(grid[1].len(), 1);
        assert_eq!(grid[2].len(), 4);
    }

    #[test]
    fn read_sheet_with_semicolons() {
        let settings = ImportSettings {
            delimiter: ";".to_string(),
            ..ImportSettings::default()
        };
        let data = "שם;סכום;תאריך\nדנה;₪100;01.01.2025\n";
        let sheet = read_sheet(data.as_bytes(), &settings).unwrap();
        assert_eq!(sheet.headers, vec!["שם", "סכום", "תאריך"]);
        assert_eq!(sheet.rows[0].cell("סכום"), &CellValue::from("₪100"));
    }

    #[test]
    fn read_sheet_without_rows_has_headers_only() {
        let sheet = read_sheet("Name,Sum\n".as_bytes(), &ImportSettings::default()).unwrap();
        assert_eq!(sheet.headers.len(), 2);
        assert!(sheet.is_empty());
    }

    #[test]
    fn read_sheet_empty_input() {
        let result = read_sheet("".as_bytes(), &ImportSettings::default());
        assert!(matches!(result, Err(SheetError::MissingHeaderRow(1))));
    }
}
