use serde::{Deserialize, Serialize};
use std::fmt;

/// The receipt attribute a spreadsheet column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReceiptField {
    CustomerName,
    Amount,
    Date,
    Description,
    PaymentMethod,
    TransactionId,
    Notes,
    Ignore,
}

impl ReceiptField {
    /// Every field, in declaration order.
    pub const ALL: [ReceiptField; 8] = [
        ReceiptField::CustomerName,
        ReceiptField::Amount,
        ReceiptField::Date,
        ReceiptField::Description,
        ReceiptField::PaymentMethod,
        ReceiptField::TransactionId,
        ReceiptField::Notes,
        ReceiptField::Ignore,
    ];

    /// Fields a row must carry before a receipt can be generated from it.
    pub const REQUIRED: [ReceiptField; 3] = [
        ReceiptField::CustomerName,
        ReceiptField::Amount,
        ReceiptField::Date,
    ];

    pub const OPTIONAL: [ReceiptField; 4] = [
        ReceiptField::Description,
        ReceiptField::PaymentMethod,
        ReceiptField::TransactionId,
        ReceiptField::Notes,
    ];

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub fn is_ignore(self) -> bool {
        self == ReceiptField::Ignore
    }

    /// The camelCase name used on the wire and in overrides.
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiptField::CustomerName => "customerName",
            ReceiptField::Amount => "amount",
            ReceiptField::Date => "date",
            ReceiptField::Description => "description",
            ReceiptField::PaymentMethod => "paymentMethod",
            ReceiptField::TransactionId => "transactionId",
            ReceiptField::Notes => "notes",
            ReceiptField::Ignore => "ignore",
        }
    }

    /// Short noun used when building error messages ("name missing").
    pub fn label(self) -> &'static str {
        match self {
            ReceiptField::CustomerName => "name",
            ReceiptField::Amount => "amount",
            ReceiptField::Date => "date",
            ReceiptField::Description => "description",
            ReceiptField::PaymentMethod => "payment method",
            ReceiptField::TransactionId => "transaction id",
            ReceiptField::Notes => "notes",
            ReceiptField::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReceiptField {
    type Err = String;

    /// Accepts the camelCase name case-insensitively, with or without
    /// `_`/`-` separators (`customer_name`, `Customer-Name`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        ReceiptField::ALL
            .into_iter()
            .find(|f| f.as_str().to_lowercase() == key)
            .ok_or_else(|| format!("Unknown receipt field: '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    Invalid,
    TooShort,
    NotMapped,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Missing => write!(f, "missing"),
            ErrorKind::Invalid => write!(f, "invalid"),
            ErrorKind::TooShort => write!(f, "too short"),
            ErrorKind::NotMapped => write!(f, "not mapped"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// One problem found with one field of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: ReceiptField,
    pub kind: ErrorKind,
    pub message: String,
    pub severity: Severity,
}

impl FieldError {
    pub fn new(field: ReceiptField, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn not_mapped(field: ReceiptField) -> Self {
        Self::new(field, ErrorKind::NotMapped, "field not mapped.")
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn required_fields() {
        assert!(ReceiptField::CustomerName.is_required());
        assert!(ReceiptField::Amount.is_required());
        assert!(ReceiptField::Date.is_required());
        assert!(!ReceiptField::Notes.is_required());
        assert!(!ReceiptField::Ignore.is_required());
    }

    #[test]
    fn field_name_roundtrip() {
        for field in ReceiptField::ALL {
            assert_eq!(ReceiptField::from_str(field.as_str()).unwrap(), field);
        }
    }

    #[test]
    fn field_from_str_is_lenient() {
        assert_eq!(
            ReceiptField::from_str("customer_name").unwrap(),
            ReceiptField::CustomerName
        );
        assert_eq!(
            ReceiptField::from_str(" Payment-Method ").unwrap(),
            ReceiptField::PaymentMethod
        );
        assert!(ReceiptField::from_str("vendor").is_err());
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&ReceiptField::TransactionId).unwrap();
        assert_eq!(json, "\"transactionId\"");
    }

    #[test]
    fn not_mapped_error() {
        let e = FieldError::not_mapped(ReceiptField::Date);
        assert_eq!(e.kind, ErrorKind::NotMapped);
        assert_eq!(e.message, "field not mapped.");
        assert!(e.is_error());
        assert_eq!(e.to_string(), "date: field not mapped.");
    }
}
