use std::fmt;

use crate::config::{Messages, NumberFormat};
use crate::parser::{format_amount, parse_amount};

/// Price cell as it came out of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Price {
    Amount(f64),
    Text(String), // locale formatted, e.g. "R$ 1.234,56"
}

impl Default for Price {
    fn default() -> Self {
        Price::Amount(0.0)
    }
}

impl Price {
    pub fn amount(&self, format: &NumberFormat) -> f64 {
        match self {
            Price::Amount(value) if value.is_finite() => *value,
            Price::Amount(_) => 0.0,
            Price::Text(text) => parse_amount(text, format),
        }
    }
}

/// One normalized sheet row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub name: String,
    pub code: String,
    pub price: Price,
}

/// A record prepared for the result region.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub code_line: String,
    pub price: String,
}

impl Product {
    pub fn from_record(record: &Record, format: &NumberFormat, messages: &Messages) -> Self {
        let name = if record.name.is_empty() {
            messages.no_name.clone()
        } else {
            record.name.clone()
        };
        Self {
            name,
            code_line: format!("{}{}", messages.code_label, record.code),
            price: format_amount(record.price.amount(format), format),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Identifies one shown notice, so a timer armed for it cannot hide a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DismissTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    Keep,
    Cancel,
    Arm(DismissTicket), // replaces whatever timer was armed
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub(crate) ticket: DismissTicket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub(crate) u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub id: RequestId,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found,
    NotFound,
    Failed,
    Superseded, // a newer search started before this one finished
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading(RequestId),
    ShowingResult(Product),
    ShowingError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerPhase {
    Closed,
    Opening, // modal shown, camera not started yet
    Scanning,
    Closing,
}

/// What the page shows right now, derived from the view state in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regions<'a> {
    pub result: Option<&'a Product>,
    pub banner: Option<&'a Notice>,
    pub scanner_modal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    EmptyQuery,
    FetchFormat,
    FetchConnection,
    NotFound,
    Camera,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::EmptyQuery => write!(f, "query is empty"),
            LookupError::FetchFormat => write!(f, "sheet payload has no table rows"),
            LookupError::FetchConnection => write!(f, "sheet request failed to load"),
            LookupError::NotFound => write!(f, "no record matches the query"),
            LookupError::Camera => write!(f, "camera could not be started"),
        }
    }
}

impl std::error::Error for LookupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_record() {
        let record = Record {
            name: "Milk".to_string(),
            code: "123".to_string(),
            price: Price::Amount(5.5),
        };
        let product = Product::from_record(&record, &NumberFormat::pt_br(), &Messages::pt_br());
        assert_eq!(product.name, "Milk");
        assert_eq!(product.code_line, "EAN: 123");
        assert_eq!(product.price, "5,50");
    }

    #[test]
    fn test_product_without_name_uses_fallback() {
        let record = Record {
            code: "9".to_string(),
            ..Record::default()
        };
        let messages = Messages::en_us();
        let product = Product::from_record(&record, &NumberFormat::en_us(), &messages);
        assert_eq!(product.name, messages.no_name);
        assert_eq!(product.price, "0.00");
    }

    #[test]
    fn test_text_and_numeric_price_render_the_same() {
        let format = NumberFormat::pt_br();
        let text = Price::Text("R$ 1.234,56".to_string());
        let number = Price::Amount(1234.56);
        assert_eq!(format_amount(text.amount(&format), &format), "1.234,56");
        assert_eq!(format_amount(number.amount(&format), &format), "1.234,56");
    }

    #[test]
    fn test_non_finite_price_is_zero() {
        let format = NumberFormat::pt_br();
        assert_eq!(Price::Amount(f64::NAN).amount(&format), 0.0);
        assert_eq!(Price::Amount(f64::INFINITY).amount(&format), 0.0);
        assert_eq!(Price::default().amount(&format), 0.0);
    }
}
