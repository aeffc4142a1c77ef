//! First-matching-key field resolution over NSE rows.
//!
//! NSE renames fields between endpoints and API revisions, so every logical
//! field is looked up through an ordered list of candidate keys. The lists
//! are kept as named constants: the index and stock percent-change lists
//! differ in order, and a row carrying several of those keys resolves
//! differently depending on which list is used.

use crate::models::{RawRow, StockRow};
use serde_json::Value;

pub const INDEX_PERCENT_CHANGE_KEYS: &[&str] = &["percentChange", "percChange", "pChange"];
pub const STOCK_PERCENT_CHANGE_KEYS: &[&str] = &["pChange", "perChange", "percentChange", "percChange"];
pub const LAST_PRICE_KEYS: &[&str] = &["lastPrice", "last", "lastprice"];
pub const VOLUME_KEYS: &[&str] = &["totalTradedVolume", "tradedQuantity", "volume"];
pub const INDEX_NAME_KEYS: &[&str] = &["index", "indexSymbol", "indexName"];
pub const SYMBOL_KEYS: &[&str] = &["symbol"];

/// Return the first candidate that is present, non-null and coercible.
///
/// A candidate that fails coercion is skipped, not fatal: the next key in
/// the list still gets a chance.
pub fn resolve<T>(row: &RawRow, candidates: &[&str], coerce: impl Fn(&Value) -> Option<T>) -> Option<T> {
    candidates
        .iter()
        .filter_map(|key| row.get(*key))
        .filter(|value| !value.is_null())
        .find_map(|value| coerce(value))
}

/// Numbers pass through; strings are parsed after trimming and dropping
/// thousands separators ("1,234.50").
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Names and symbols pass through as text; an empty string is still a value.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Any non-null value, untouched.
pub fn as_raw(value: &Value) -> Option<Value> {
    Some(value.clone())
}

/// Comparison key for index names; display keeps the API's casing.
pub fn name_key(name: &str) -> String {
    name.trim().to_uppercase()
}

pub fn index_name(row: &RawRow) -> Option<String> {
    resolve(row, INDEX_NAME_KEYS, as_text)
}

pub fn index_percent_change(row: &RawRow) -> Option<f64> {
    resolve(row, INDEX_PERCENT_CHANGE_KEYS, as_f64)
}

pub fn stock_percent_change(row: &RawRow) -> Option<f64> {
    resolve(row, STOCK_PERCENT_CHANGE_KEYS, as_f64)
}

/// Build a [`StockRow`], or `None` if symbol, price or change is missing.
/// A blank symbol counts as missing.
pub fn stock_row(row: &RawRow) -> Option<StockRow> {
    let symbol = resolve(row, SYMBOL_KEYS, as_text).filter(|s| !s.is_empty())?;
    Some(StockRow {
        symbol,
        last_price: resolve(row, LAST_PRICE_KEYS, as_f64)?,
        percent_change: stock_percent_change(row)?,
        volume: resolve(row, VOLUME_KEYS, as_raw),
    })
}
