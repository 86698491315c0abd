use kabala_core::{mapping_for, ColumnMapping, Money, RawRow, Receipt, ReceiptField};
use thiserror::Error;
use tracing::{info, warn};

use crate::parse::{parse_amount, parse_date, parse_name, ParseError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReceiptError {
    #[error("Row {row}: {field} not mapped")]
    NotMapped { row: usize, field: ReceiptField },
    #[error("Row {row}: {source}")]
    InvalidRow { row: usize, source: ParseError },
    #[error("Row {row}: amount {amount} is out of range")]
    AmountOutOfRange { row: usize, amount: f64 },
}

/// Build the receipt for one validated row.
pub fn build_receipt(
    row: &RawRow,
    mappings: &[ColumnMapping],
    receipt_number: u64,
) -> Result<Receipt, ReceiptError> {
    let required_cell = |field: ReceiptField| {
        mapping_for(mappings, field)
            .map(|m| row.cell(&m.excel_column))
            .ok_or(ReceiptError::NotMapped { row: row.row_number, field })
    };
    let invalid = |source: ParseError| ReceiptError::InvalidRow { row: row.row_number, source };

    let customer_name = parse_name(required_cell(ReceiptField::CustomerName)?).map_err(invalid)?;
    let amount = parse_amount(required_cell(ReceiptField::Amount)?).map_err(invalid)?;
    let date = parse_date(required_cell(ReceiptField::Date)?).map_err(invalid)?;
    let amount = Money::from_f64(amount).ok_or(ReceiptError::AmountOutOfRange {
        row: row.row_number,
        amount,
    })?;

    Ok(Receipt {
        receipt_number,
        row_number: row.row_number,
        customer_name,
        amount,
        date: date.date(),
        description: optional_text(row, mappings, ReceiptField::Description),
        payment_method: optional_text(row, mappings, ReceiptField::PaymentMethod),
        transaction_id: optional_text(row, mappings, ReceiptField::TransactionId),
        notes: optional_text(row, mappings, ReceiptField::Notes),
    })
}

/// Receipts built from a batch of rows, plus the rows that could not become one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptBatch {
    pub receipts: Vec<Receipt>,
    pub rejected: Vec<ReceiptError>,
}

impl ReceiptBatch {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Build receipts for `valid_rows` in row order, numbered consecutively from
/// `first_number`.
///
/// A row that fails here (e.g. an amount too large for [`Money`]) is set
/// aside in `rejected` and takes no number; the other rows are unaffected.
pub fn build_receipts(
    valid_rows: &[RawRow],
    mappings: &[ColumnMapping],
    first_number: u64,
) -> ReceiptBatch {
    let mut batch = ReceiptBatch::default();
    let mut next_number = first_number;
    for row in valid_rows {
        match build_receipt(row, mappings, next_number) {
            Ok(receipt) => {
                batch.receipts.push(receipt);
                next_number += 1;
            }
            Err(e) => {
                warn!(row = row.row_number, error = %e, "row skipped");
                batch.rejected.push(e);
            }
        }
    }
    info!(
        count = batch.receipts.len(),
        rejected = batch.rejected.len(),
        first_number,
        "receipts built"
    );
    batch
}

fn optional_text(
    row: &RawRow,
    mappings: &[ColumnMapping],
    field: ReceiptField,
) -> Option<String> {
    let mapping = mapping_for(mappings, field)?;
    row.cell(&mapping.excel_column)
        .as_text()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
