use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A validated row turned into the record a receipt document is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: u64,
    /// Spreadsheet row the receipt came from.
    pub row_number: usize,
    pub customer_name: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

/// Sum of the receipt amounts.
pub fn total_amount(receipts: &[Receipt]) -> Money {
    receipts
        .iter()
        .map(|r| r.amount)
        .fold(Money::zero(), |a, b| a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(number: u64, cents: i64) -> Receipt {
        Receipt {
            receipt_number: number,
            row_number: number as usize + 1,
            customer_name: "Dana".to_string(),
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: None,
            payment_method: None,
            transaction_id: None,
            notes: None,
        }
    }

    #[test]
    fn total_of_receipts() {
        let receipts = vec![receipt(1, 10000), receipt(2, 2550)];
        assert_eq!(total_amount(&receipts).to_cents(), Some(12550));
    }

    #[test]
    fn total_of_nothing_is_zero() {
        assert!(total_amount(&[]).is_zero());
    }
}
