use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use kabala_core::{CellValue, ErrorKind, FieldError, ReceiptField};
use regex::Regex;
use thiserror::Error;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_day_first, r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4})$");
re!(re_year_first, r"^(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})$");
re!(re_day_first_short_year, r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2})$");
re!(re_leading_number, r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?");

/// Days from the spreadsheet epoch (1899-12-30) to 1970-01-01.
const SERIAL_UNIX_EPOCH: f64 = 25569.0;
const SECONDS_PER_DAY: f64 = 86400.0;

/// Two-digit years below this land in the 2000s, the rest in the 1900s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

const CURRENCY_SYMBOLS: [char; 3] = ['₪', '$', '€'];

const FREE_TEXT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const FREE_TEXT_DATE_FORMATS: &[&str] = &["%d %B %Y", "%B %d, %Y", "%B %d %Y", "%d-%b-%Y"];

/// Why a raw cell could not be turned into a field value.
/// Renders as the user-facing message, e.g. "amount missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} {}", .field.label(), .kind)]
pub struct ParseError {
    pub field: ReceiptField,
    pub kind: ErrorKind,
}

impl ParseError {
    fn new(field: ReceiptField, kind: ErrorKind) -> Self {
        Self { field, kind }
    }
}

impl From<ParseError> for FieldError {
    fn from(e: ParseError) -> Self {
        FieldError::new(e.field, e.kind, e.to_string())
    }
}

// ── Amount ────────────────────────────────────────────────────────────────────

/// Parse a receipt amount. No range check: zero and negative amounts pass.
pub fn parse_amount(value: &CellValue) -> Result<f64, ParseError> {
    let invalid = ParseError::new(ReceiptField::Amount, ErrorKind::Invalid);
    match value {
        v if v.is_empty() => Err(ParseError::new(ReceiptField::Amount, ErrorKind::Missing)),
        CellValue::Number(n) if n.is_nan() => Err(invalid),
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(s) => parse_amount_str(s).ok_or(invalid),
        CellValue::DateTime(_) | CellValue::Empty => Err(invalid),
    }
}

fn parse_amount_str(s: &str) -> Option<f64> {
    let clean: String = s
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    // Thousands separators are gone by now; a leftover comma would be decimal.
    let clean = clean.replace(',', ".");
    let number = re_leading_number().find(&clean)?;
    number.as_str().parse::<f64>().ok().filter(|n| !n.is_nan())
}

// ── Date ─────────────────────────────────────────────────────────────────────

/// Parse a receipt date. Text dates come back at midnight.
pub fn parse_date(value: &CellValue) -> Result<NaiveDateTime, ParseError> {
    let invalid = ParseError::new(ReceiptField::Date, ErrorKind::Invalid);
    match value {
        v if v.is_empty() => Err(ParseError::new(ReceiptField::Date, ErrorKind::Missing)),
        CellValue::DateTime(dt) => Ok(*dt),
        CellValue::Number(serial) => from_serial(*serial).ok_or(invalid),
        CellValue::Text(s) => parse_date_str(s.trim()).ok_or(invalid),
        CellValue::Empty => Err(invalid),
    }
}

/// Spreadsheet serial day number (fractional part is the time of day).
fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - SERIAL_UNIX_EPOCH) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

/// Day/month order is positional and never swapped: DD/MM wins over MM/DD.
fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if let Some(c) = re_day_first().captures(s) {
        let day: u32 = c.get(1)?.as_str().parse().ok()?;
        let month: u32 = c.get(2)?.as_str().parse().ok()?;
        let year: i32 = c.get(3)?.as_str().parse().ok()?;
        return midnight(year, month, day);
    }
    if let Some(c) = re_year_first().captures(s) {
        let year: i32 = c.get(1)?.as_str().parse().ok()?;
        let month: u32 = c.get(2)?.as_str().parse().ok()?;
        let day: u32 = c.get(3)?.as_str().parse().ok()?;
        return midnight(year, month, day);
    }
    if let Some(c) = re_day_first_short_year().captures(s) {
        let day: u32 = c.get(1)?.as_str().parse().ok()?;
        let month: u32 = c.get(2)?.as_str().parse().ok()?;
        let year = expand_year(c.get(3)?.as_str().parse().ok()?);
        return midnight(year, month, day);
    }
    parse_free_text(s)
}

fn parse_free_text(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in FREE_TEXT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in FREE_TEXT_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(NaiveTime::MIN))
}

fn expand_year(y: i32) -> i32 {
    if y < TWO_DIGIT_YEAR_PIVOT {
        2000 + y
    } else {
        1900 + y
    }
}

// ── Name ──────────────────────────────────────────────────────────────────────

/// Parse a customer name: any non-empty cell rendered as trimmed text,
/// at least two characters long.
pub fn parse_name(value: &CellValue) -> Result<String, ParseError> {
    if value.is_empty() {
        return Err(ParseError::new(ReceiptField::CustomerName, ErrorKind::Missing));
    }
    let name = value.to_string().trim().to_string();
    if name.chars().count() < 2 {
        return Err(ParseError::new(ReceiptField::CustomerName, ErrorKind::TooShort));
    }
    Ok(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
