//! Type Inference Engine
//!
//! Classifies a raw JSON value into a [`DataType`]. Inference is total: every
//! input produces exactly one tag, `undefined` for null.
//!
//! ## String Cascade
//!
//! Strings run through format predicates in a fixed order and the first
//! match wins:
//!
//! date → email → object-id → uuid → json → credit-card → currency → url →
//! port → ip → mime → mac → jwt → lat/long → iso2 → iso3 → postal-code →
//! string
//!
//! Stricter formats come before broad ones that could also accept the same
//! text, so the order is part of the contract.
//!
//! ## Numbers
//!
//! Numbers are classified from their textual form: decimal (fractional
//! digits) → float (exponent notation) → integer → number.

use crate::models::DataType;
use crate::utils::formats;
use serde_json::{Number, Value};

type FormatCheck = (fn(&str) -> bool, DataType);

const STRING_CASCADE: &[FormatCheck] = &[
    (formats::is_date, DataType::DateTime),
    (formats::is_email, DataType::Email),
    (formats::is_object_id, DataType::ObjectId),
    (formats::is_uuid, DataType::Uuid),
    (formats::is_json, DataType::Json),
    (formats::is_credit_card, DataType::CreditCard),
    (formats::is_currency, DataType::Currency),
    (formats::is_url, DataType::Url),
    (formats::is_port, DataType::Port),
    (formats::is_ip, DataType::IpAddress),
    (formats::is_mime_type, DataType::Mime),
    (formats::is_mac_address, DataType::MacAddress),
    (formats::is_jwt, DataType::Jwt),
    (formats::is_lat_long, DataType::LatLong),
    (formats::is_iso_alpha2, DataType::Iso2),
    (formats::is_iso_alpha3, DataType::Iso3),
    (formats::is_postal_code, DataType::PostalCode),
];

/// Classify any JSON value
pub fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Undefined,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => infer_number(n),
        Value::String(s) => infer_string(s),
        Value::Array(items) => infer_array(items),
        Value::Object(_) => DataType::Object,
    }
}

/// Run the string format cascade
pub fn infer_string(s: &str) -> DataType {
    STRING_CASCADE
        .iter()
        .find(|(check, _)| check(s))
        .map_or(DataType::String, |(_, data_type)| *data_type)
}

pub fn infer_number(n: &Number) -> DataType {
    let text = n.to_string();
    if formats::is_decimal(&text) {
        DataType::Decimal
    } else if formats::is_float(&text) && n.is_f64() {
        DataType::Float
    } else if formats::is_int(&text) {
        DataType::Integer
    } else {
        DataType::Number
    }
}

/// Typed array when every element shares one shape; empty arrays are generic
pub fn infer_array(items: &[Value]) -> DataType {
    if items.is_empty() {
        DataType::Array
    } else if items.iter().all(Value::is_number) {
        DataType::ArrayOfNumber
    } else if items.iter().all(Value::is_string) {
        DataType::ArrayOfString
    } else if items.iter().all(Value::is_boolean) {
        DataType::ArrayOfBoolean
    } else if items.iter().all(Value::is_object) {
        DataType::ArrayOfObject
    } else {
        DataType::Array
    }
}

/// Whether `value` satisfies a field declared as `declared`
///
/// Empty arrays satisfy every array type. A string declared as one of the
/// cascade formats is checked against that format's own predicate, so a
/// value claimed by an earlier format (a ZIP code read as a port) still
/// satisfies its declared type.
pub fn type_matches(declared: DataType, value: &Value) -> bool {
    match value {
        Value::Array(items) if items.is_empty() => {
            if declared.is_array() || declared == DataType::Set {
                return true;
            }
        }
        Value::String(s) => {
            if format_check(declared).is_some_and(|check| check(s)) {
                return true;
            }
        }
        _ => {}
    }
    declared.accepts(infer_type(value))
}

/// Predicate of a cascade format type
fn format_check(data_type: DataType) -> Option<fn(&str) -> bool> {
    STRING_CASCADE
        .iter()
        .find(|(_, tag)| *tag == data_type)
        .map(|(check, _)| *check)
}
