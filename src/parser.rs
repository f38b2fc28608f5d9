// src/parser.rs
use log::{debug, warn};
use serde::Deserialize;

use crate::config::NumberFormat;
use crate::structs::{LookupError, Price, Record};

pub const CALLBACK_PREFIX: &str = "priceLookupCallback";

// Shape of the gviz payload. Everything except table.rows[].c[].v is ignored.

#[derive(Debug, Deserialize)]
pub struct GvizResponse {
    pub status: Option<String>,
    pub table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
pub struct GvizTable {
    pub rows: Option<Vec<GvizRow>>,
}

#[derive(Debug, Deserialize)]
pub struct GvizRow {
    pub c: Option<Vec<Option<GvizCell>>>,
}

#[derive(Debug, Deserialize)]
pub struct GvizCell {
    pub v: Option<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    fn to_text(&self) -> String {
        match self {
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => (*n as i64).to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    fn to_price(&self) -> Price {
        match self {
            CellValue::Bool(b) => Price::Amount(if *b { 1.0 } else { 0.0 }),
            CellValue::Number(n) if n.is_finite() => Price::Amount(*n),
            CellValue::Number(_) => Price::Amount(0.0),
            CellValue::Text(s) => Price::Text(s.clone()),
        }
    }
}

/// Unique name for one JSONP handler. `seq` keeps calls within the same millisecond apart.
pub fn callback_name(stamp_ms: u64, seq: u64) -> String {
    format!("{}_{}_{}", CALLBACK_PREFIX, stamp_ms, seq)
}

fn cell_value(cells: &[Option<GvizCell>], index: usize) -> Option<&CellValue> {
    cells.get(index)?.as_ref()?.v.as_ref()
}

/// Maps cells 0, 1, 2 to name, code, price. `None` for rows without cells.
pub fn record_from_row(row: &GvizRow) -> Option<Record> {
    let cells = row.c.as_ref()?;
    let text = |index| {
        cell_value(cells, index)
            .map(|v| v.to_text().trim().to_string())
            .unwrap_or_default()
    };
    Some(Record {
        name: text(0),
        code: text(1),
        price: cell_value(cells, 2).map(CellValue::to_price).unwrap_or_default(),
    })
}

pub fn records_from_response(response: Option<GvizResponse>) -> Result<Vec<Record>, LookupError> {
    let response = response.ok_or(LookupError::FetchFormat)?;
    if response.status.as_deref() == Some("error") {
        warn!("sheet endpoint answered with an error status");
        return Err(LookupError::FetchFormat);
    }
    let rows = response
        .table
        .and_then(|table| table.rows)
        .ok_or(LookupError::FetchFormat)?;

    let records: Vec<Record> = rows
        .iter()
        .filter_map(record_from_row)
        .filter(|record| !record.code.is_empty())
        .collect();
    debug!("sheet returned {} rows, {} usable records", rows.len(), records.len());
    Ok(records)
}

/// Reads a locale formatted amount such as "R$ 1.234,56". Unreadable text is zero.
pub fn parse_amount(text: &str, format: &NumberFormat) -> f64 {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix(format.currency_prefix.as_str())
        .unwrap_or(trimmed)
        .trim();
    let without_grouping = || {
        digits
            .chars()
            .filter(|c| *c != format.grouping_separator && !c.is_whitespace())
            .collect::<String>()
    };

    let parsed = if digits.contains(format.decimal_separator) {
        without_grouping()
            .replace(format.decimal_separator, ".")
            .parse::<f64>()
            .ok()
    } else {
        digits
            .parse::<f64>()
            .ok()
            .or_else(|| without_grouping().parse::<f64>().ok())
    };

    match parsed {
        Some(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Two decimals with thousands grouping, e.g. 1234.5 -> "1.234,50" for pt-BR.
/// Half-cent ties round away from zero.
pub fn format_amount(value: f64, format: &NumberFormat) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = format!("{:03.0}", (value.abs() * 100.0).round());
    let (integer, fraction) = cents.split_at(cents.len() - 2);

    let mut out = String::new();
    if value < 0.0 && cents.bytes().any(|b| b != b'0') {
        out.push('-');
    }
    let len = integer.len();
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(format.grouping_separator);
        }
        out.push(ch);
    }
    out.push(format.decimal_separator);
    out.push_str(fraction);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(payload: serde_json::Value) -> Result<Vec<Record>, LookupError> {
        let response: Option<GvizResponse> =
            serde_json::from_value(payload).map_err(|_| LookupError::FetchFormat)?;
        records_from_response(response)
    }

    #[test]
    fn test_rows_map_positionally() {
        let records = decode(json!({
            "version": "0.6",
            "status": "ok",
            "table": {
                "cols": [],
                "rows": [
                    { "c": [ { "v": " Milk " }, { "v": "123" }, { "v": 5.5, "f": "5,5" } ] },
                    { "c": [ { "v": "Bread" }, { "v": 7891000100103.0 }, { "v": "R$ 2,00" } ] }
                ]
            }
        }))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Milk");
        assert_eq!(records[0].code, "123");
        assert_eq!(records[0].price, Price::Amount(5.5));
        assert_eq!(records[1].code, "7891000100103");
        assert_eq!(records[1].price, Price::Text("R$ 2,00".to_string()));
    }

    #[test]
    fn test_short_rows_take_defaults() {
        let records = decode(json!({
            "table": { "rows": [
                { "c": [ null, { "v": "42" } ] },
                { "c": [ { "v": "Soap" }, { "v": "77" }, { "v": null } ] }
            ] }
        }))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "");
        assert_eq!(records[0].code, "42");
        assert_eq!(records[0].price, Price::Amount(0.0));
        assert_eq!(records[1].price, Price::Amount(0.0));
    }

    #[test]
    fn test_rows_without_code_are_dropped() {
        let records = decode(json!({
            "table": { "rows": [
                { "c": [ { "v": "No code" } ] },
                { "c": [ { "v": "Blank" }, { "v": "   " }, { "v": 1 } ] },
                { "c": null },
                { "c": [ { "v": "Kept" }, { "v": "1" }, { "v": 1 } ] }
            ] }
        }))
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Kept");
    }

    #[test]
    fn test_duplicate_codes_keep_table_order() {
        let records = decode(json!({
            "table": { "rows": [
                { "c": [ { "v": "First" }, { "v": "9" } ] },
                { "c": [ { "v": "Second" }, { "v": "9" } ] }
            ] }
        }))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "First");
    }

    #[test]
    fn test_malformed_payloads() {
        assert_eq!(decode(json!(null)), Err(LookupError::FetchFormat));
        assert_eq!(decode(json!({})), Err(LookupError::FetchFormat));
        assert_eq!(decode(json!({ "table": {} })), Err(LookupError::FetchFormat));
        assert_eq!(decode(json!({ "table": { "rows": "nope" } })), Err(LookupError::FetchFormat));
        assert_eq!(
            decode(json!({ "status": "error", "errors": [ { "reason": "access_denied" } ] })),
            Err(LookupError::FetchFormat)
        );
    }

    #[test]
    fn test_empty_table_is_not_an_error() {
        assert_eq!(decode(json!({ "table": { "rows": [] } })), Ok(vec![]));
    }

    #[test]
    fn test_format_amount_pt_br() {
        let format = NumberFormat::pt_br();
        assert_eq!(format_amount(10.0, &format), "10,00");
        assert_eq!(format_amount(5.5, &format), "5,50");
        assert_eq!(format_amount(1234.56, &format), "1.234,56");
        assert_eq!(format_amount(1234567.891, &format), "1.234.567,89");
        assert_eq!(format_amount(-5.0, &format), "-5,00");
        assert_eq!(format_amount(-0.001, &format), "0,00");
        assert_eq!(format_amount(f64::NAN, &format), "0,00");
        assert_eq!(format_amount(0.0, &format), "0,00");
        assert_eq!(format_amount(0.07, &format), "0,07");
    }

    #[test]
    fn test_format_amount_rounds_half_cents_up() {
        let format = NumberFormat::pt_br();
        assert_eq!(format_amount(0.125, &format), "0,13");
        assert_eq!(format_amount(10.125, &format), "10,13");
        assert_eq!(format_amount(-10.125, &format), "-10,13");
        assert_eq!(format_amount(parse_amount("R$ 10,125", &format), &format), "10,13");
    }

    #[test]
    fn test_format_amount_en_us() {
        let format = NumberFormat::en_us();
        assert_eq!(format_amount(1234.5, &format), "1,234.50");
        assert_eq!(format_amount(999.999, &format), "1,000.00");
    }

    #[test]
    fn test_parse_amount() {
        let format = NumberFormat::pt_br();
        assert_eq!(parse_amount("R$ 1.234,56", &format), 1234.56);
        assert_eq!(parse_amount("R$1.234,56", &format), 1234.56);
        assert_eq!(parse_amount(" 12,5 ", &format), 12.5);
        assert_eq!(parse_amount("5.5", &format), 5.5);
        assert_eq!(parse_amount("1.234.567", &format), 1234567.0);
        assert_eq!(parse_amount("", &format), 0.0);
        assert_eq!(parse_amount("abc", &format), 0.0);

        let format = NumberFormat::en_us();
        assert_eq!(parse_amount("$ 1,234.56", &format), 1234.56);
    }

    #[test]
    fn test_callback_names_are_unique() {
        assert_ne!(callback_name(1000, 1), callback_name(1000, 2));
        assert_eq!(callback_name(5, 0), "priceLookupCallback_5_0");
    }
}
