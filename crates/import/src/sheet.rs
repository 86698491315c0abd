use std::collections::{BTreeMap, HashSet};

use kabala_core::{CellValue, RawRow};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Decoded cells of one worksheet, row by row.
pub type Grid = Vec<Vec<CellValue>>;

const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Header row must be 1 or greater")]
    InvalidHeaderRow,
    #[error("Header row {0} is past the end of the sheet")]
    MissingHeaderRow(usize),
}

/// Header row plus the data rows below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Sheet {
    /// Build a sheet from a decoded grid.
    ///
    /// `header_row` is 1-based; anything above it is discarded. Blank rows are
    /// skipped but still counted, so `row_number` is always the physical
    /// spreadsheet row.
    pub fn from_grid(grid: Grid, header_row: usize) -> Result<Self, SheetError> {
        if header_row == 0 {
            return Err(SheetError::InvalidHeaderRow);
        }
        let header_idx = header_row - 1;
        let header_cells = grid
            .get(header_idx)
            .ok_or(SheetError::MissingHeaderRow(header_row))?;
        let headers = unique_headers(header_cells);

        let mut rows = Vec::new();
        for (idx, cells) in grid.into_iter().enumerate().skip(header_idx + 1) {
            let row_number = idx + 1;
            if cells.iter().all(CellValue::is_blank) {
                debug!(row = row_number, "blank row skipped");
                continue;
            }
            if cells.len() > headers.len() {
                warn!(
                    row = row_number,
                    cells = cells.len(),
                    columns = headers.len(),
                    "cells beyond the header row dropped"
                );
            }
            let mut cells = cells.into_iter();
            let data: BTreeMap<String, CellValue> = headers
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or_default()))
                .collect();
            rows.push(RawRow::new(row_number, data));
        }

        Ok(Sheet { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Header cells as trimmed text, made unique: blanks become `__EMPTY`,
/// repeats get `_1`, `_2`, ... appended.
fn unique_headers(cells: &[CellValue]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    cells
        .iter()
        .map(|cell| {
            let text = cell.to_string();
            let base = match text.trim() {
                "" => EMPTY_HEADER.to_string(),
                t => t.to_string(),
            };
            let mut name = base.clone();
            let mut n = 0;
            while used.contains(&name) {
                n += 1;
                name = format!("{base}_{n}");
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
