pub mod cell;
pub mod field;
pub mod mapping;
pub mod money;
pub mod receipt;
pub mod row;

pub use cell::CellValue;
pub use field::{ErrorKind, FieldError, ReceiptField, Severity};
pub use mapping::{mapping_for, ColumnMapping};
pub use money::Money;
pub use receipt::{total_amount, Receipt};
pub use row::RawRow;
