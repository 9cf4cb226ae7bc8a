//! Conversion between decimal amounts and the gateway's minor-unit wire
//! format.
//!
//! The gateway expresses every amount as an integer string of 1/100 units
//! ("centified"). Conversion is keyed purely by field name: the fixed
//! allow-list below is the only locus of conversion, at any nesting depth.

use crate::core::{Error, Result};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Field names whose values are converted. Everything else passes through
/// unchanged (nested structures still traversed).
pub const CONVERTIBLE_FIELDS: [&str; 5] =
    ["amount", "total", "available", "unitPrice", "totalAmount"];

fn is_convertible(key: &str) -> bool {
    CONVERTIBLE_FIELDS.contains(&key)
}

fn parse_amount(value: &Value) -> Result<Decimal> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::validation(format!("non-numeric amount value: {}", value)))
}

/// Convert decimal amounts in `data` to the gateway's minor-unit strings.
///
/// Builds a new tree; the input is never mutated. A `null` under a
/// convertible key passes through unchanged. Fractions beyond the minor
/// unit are truncated.
pub fn to_minor_units(data: &Value) -> Result<Value> {
    match data {
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, value) in fields {
                if is_convertible(key) && !value.is_null() {
                    let minor = (parse_amount(value)? * Decimal::ONE_HUNDRED).trunc();
                    out.insert(key.clone(), Value::String(minor.to_string()));
                } else {
                    out.insert(key.clone(), to_minor_units(value)?);
                }
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(to_minor_units).collect::<Result<_>>()?,
        )),
        scalar => Ok(scalar.clone()),
    }
}

/// Exact inverse of [`to_minor_units`]: divides convertible values by 100
/// and renders them as decimal strings, which `Decimal` fields deserialize
/// from directly.
pub fn to_major_units(data: &Value) -> Result<Value> {
    match data {
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, value) in fields {
                if is_convertible(key) && !value.is_null() {
                    let major = parse_amount(value)? / Decimal::ONE_HUNDRED;
                    out.insert(key.clone(), Value::String(major.normalize().to_string()));
                } else {
                    out.insert(key.clone(), to_major_units(value)?);
                }
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(to_major_units).collect::<Result<_>>()?,
        )),
        scalar => Ok(scalar.clone()),
    }
}
