//! Price resolution for loosely-typed kit and product records.
//!
//! Kits have been created by several generations of admin forms and import
//! scripts, so their price may live under any of a dozen keys, be a formatted
//! string such as `"$58.000,00"`, or be missing entirely in favour of an
//! `items` list. Everything here is a pure function over `serde_json::Value`
//! and walks keys in document order.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Product, QuoteItem};

/// Keys tried, in order, before any scanning.
const KIT_PRICE_KEYS: [&str; 17] = [
    "kitPrice",
    "kit_price",
    "salePrice",
    "sale_price",
    "finalPrice",
    "final_price",
    "precioFinal",
    "precio_final",
    "price",
    "basePrice",
    "base_price",
    "amount",
    "total",
    "cost",
    "valor",
    "originalPrice",
    "original_price",
];

/// Fragments that mark a key as price-like (matched case-insensitively).
const PRICE_KEY_HINTS: [&str; 9] = [
    "sale", "final", "price", "precio", "total", "amount", "cost", "valor", "kitprice",
];

/// Keys tried when pricing a kit line of a quote and extraction found nothing.
const KIT_UNIT_PRICE_KEYS: [&str; 8] = [
    "kitPrice",
    "basePrice",
    "price",
    "precio",
    "salePrice",
    "specialPrice",
    "ahorro",
    "total",
];

/// Keys that may reference the product of a kit item.
const ITEM_PRODUCT_KEYS: [&str; 5] = ["productId", "id", "product", "ref", "refId"];

const MAX_SEARCH_DEPTH: usize = 4;

/// Where an extracted price came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceSource {
    NoKit,
    /// One of the well-known price keys
    Key(String),
    /// A top-level key whose name looks price-like
    HintedKey(String),
    DeepSearch,
    /// Nothing found, but the kit lists items to aggregate
    HasItems,
    NotFound,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::NoKit => write!(f, "no-kit"),
            PriceSource::Key(key) => write!(f, "found {}", key),
            PriceSource::HintedKey(key) => write!(f, "found key {}", key),
            PriceSource::DeepSearch => write!(f, "deepSearch"),
            PriceSource::HasItems => write!(f, "has-items"),
            PriceSource::NotFound => write!(f, "not-found"),
        }
    }
}

impl Serialize for PriceSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of [`extract_price_from_kit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceExtraction {
    pub price: f64,
    pub source: PriceSource,
}

impl PriceExtraction {
    fn new(price: f64, source: PriceSource) -> Self {
        Self { price, source }
    }
}

/// Best-effort numeric reading of any JSON value.
///
/// Strings keep only digits, `.`, `,` and `-`. When both separators appear the
/// later one is the decimal separator (`"1.234,5"` is 1234.5, `"1,234.5"` is
/// 1234.5); a lone comma is a decimal comma. Arrays and objects yield their
/// first value that parses.
pub fn parse_number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Null | Value::Bool(_) => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_str(s),
        Value::Array(items) => items.iter().find_map(parse_number_from_value),
        Value::Object(map) => map.values().find_map(parse_number_from_value),
    }
}

fn parse_number_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replacen(',', ".", 1),
        _ => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Scan a kit record for something that looks like its price.
pub fn extract_price_from_kit(kit: &Value) -> PriceExtraction {
    let Some(obj) = kit.as_object() else {
        return PriceExtraction::new(0.0, PriceSource::NoKit);
    };

    for key in KIT_PRICE_KEYS {
        if let Some(price) = obj.get(key).and_then(parse_number_from_value) {
            return PriceExtraction::new(price, PriceSource::Key(key.to_string()));
        }
    }

    for (key, value) in obj {
        if is_price_key(key) {
            if let Some(price) = parse_number_from_value(value) {
                return PriceExtraction::new(price, PriceSource::HintedKey(key.clone()));
            }
        }
    }

    // Item quantities are not prices; items are aggregated separately.
    let searchable: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| key.as_str() != "items")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if let Some(price) = deep_search(&Value::Object(searchable), 0) {
        return PriceExtraction::new(price, PriceSource::DeepSearch);
    }

    if kit_items(obj).is_some() {
        PriceExtraction::new(0.0, PriceSource::HasItems)
    } else {
        PriceExtraction::new(0.0, PriceSource::NotFound)
    }
}

/// Base price of a kit: the extracted price, else the sum of its priced
/// items, else the largest positive number anywhere in the record.
pub fn compute_kit_base_price(kit: &Value, products: &[Product]) -> f64 {
    let Some(obj) = kit.as_object() else {
        return 0.0;
    };

    let extracted = extract_price_from_kit(kit);
    if extracted.price > 0.0 {
        return extracted.price;
    }

    if let Some(items) = kit_items(obj) {
        let sum: f64 = items.iter().map(|item| item_value(item, products)).sum();
        if sum > 0.0 {
            return sum;
        }
    }

    let mut numbers = Vec::new();
    collect_numbers(kit, 0, &mut numbers);
    numbers
        .into_iter()
        .filter(|n| *n > 0.0)
        .fold(None, |max: Option<f64>, n| Some(max.map_or(n, |m| m.max(n))))
        .unwrap_or(0.0)
}

/// Unit price of a kit line in a quote or in the item selector.
pub fn resolve_kit_unit_price(kit: &Value, products: &[Product]) -> f64 {
    let extracted = extract_price_from_kit(kit);
    if extracted.price > 0.0 {
        return extracted.price;
    }

    let Some(obj) = kit.as_object() else {
        return 0.0;
    };

    let fallback = KIT_UNIT_PRICE_KEYS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
        .and_then(coerce_number)
        .unwrap_or(0.0);
    if fallback > 0.0 {
        return fallback;
    }

    if kit_items(obj).is_some() {
        compute_kit_base_price(kit, products)
    } else {
        0.0
    }
}

/// Savings of a kit against its original price (or the sum of its products
/// when no original price is recorded). Never negative.
pub fn calculate_kit_savings(products_total: f64, original_price: f64, kit_price: f64) -> f64 {
    let original = if original_price > 0.0 {
        original_price
    } else {
        products_total
    };
    let price = if kit_price > 0.0 { kit_price } else { original };
    (original - price).max(0.0)
}

/// Whole-percent discount of `kit_price` against `original_price`.
pub fn kit_discount_percent(original_price: f64, kit_price: f64) -> Option<i64> {
    if original_price > 0.0 && kit_price > 0.0 {
        Some(((original_price - kit_price) / original_price * 100.0).round() as i64)
    } else {
        None
    }
}

pub fn line_total(base_price: f64, quantity: u32) -> f64 {
    base_price * f64::from(quantity)
}

/// Estimated total of a quote. A line's `totalPrice` wins when positive.
pub fn quote_total(items: &[QuoteItem]) -> f64 {
    items
        .iter()
        .map(|item| {
            if item.total_price > 0.0 {
                item.total_price
            } else {
                line_total(item.base_price, item.quantity)
            }
        })
        .sum()
}

fn is_price_key(key: &str) -> bool {
    let key = key.to_lowercase();
    PRICE_KEY_HINTS.iter().any(|hint| key.contains(hint))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn kit_items(obj: &Map<String, Value>) -> Option<&Vec<Value>> {
    obj.get("items")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
}

fn deep_search(value: &Value, depth: usize) -> Option<f64> {
    if depth > MAX_SEARCH_DEPTH || is_falsy(value) {
        return None;
    }

    let children: Vec<&Value> = match value {
        Value::Object(map) => {
            let hinted = map
                .iter()
                .filter(|(key, _)| is_price_key(key))
                .find_map(|(_, v)| parse_number_from_value(v));
            if hinted.is_some() {
                return hinted;
            }
            map.values().collect()
        }
        Value::Array(items) => items.iter().collect(),
        scalar => return parse_number_from_value(scalar),
    };

    children.into_iter().find_map(|child| match child {
        Value::Array(items) => items.iter().find_map(|item| deep_search(item, depth + 1)),
        Value::Object(_) => deep_search(child, depth + 1),
        scalar => parse_number_from_value(scalar),
    })
}

fn collect_numbers(value: &Value, depth: usize, out: &mut Vec<f64>) {
    if depth > MAX_SEARCH_DEPTH || is_falsy(value) {
        return;
    }
    match value {
        Value::Number(n) => out.extend(n.as_f64()),
        Value::String(s) => out.extend(parse_number_str(s)),
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_numbers(item, depth + 1, out)),
        Value::Object(map) => map
            .values()
            .for_each(|item| collect_numbers(item, depth + 1, out)),
        Value::Null | Value::Bool(_) => {}
    }
}

/// Unit price times quantity of one kit item; unknown products count as 0.
fn item_value(item: &Value, products: &[Product]) -> f64 {
    let Some(obj) = item.as_object() else {
        return 0.0;
    };
    let Some(reference) = ITEM_PRODUCT_KEYS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !is_falsy(v)))
    else {
        return 0.0;
    };

    let quantity = obj
        .get("quantity")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("qty").filter(|v| !v.is_null()))
        .and_then(coerce_number)
        .filter(|q| *q != 0.0)
        .unwrap_or(1.0);

    let unit = reference
        .as_str()
        .and_then(|id| products.iter().find(|p| p.id == id))
        .map(|p| p.base_price)
        .unwrap_or(0.0);

    unit * quantity
}

/// Strict numeric coercion: numbers, plain numeric strings and booleans.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
