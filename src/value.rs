//! Field values and their validation rules.
//!
//! A [`Value`] is what callers put into (and read out of) a transaction
//! record: hex or raw text for byte-string fields, small integers for chain
//! id and the recovery parameter, and nested lists for access lists. The
//! serde representation is untagged so field maps can be taken straight from
//! JSON-shaped input (null / string / number / array).

use serde::{Deserialize, Serialize};

use crate::codec::Item;
use crate::error::Error;
use crate::schema::FieldRule;

/// A single field value as accepted and stored by a transaction record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicitly absent; setting a field to `Null` stores nothing.
    Null,
    /// Scalar payload: hex (`0x`-prefixed or bare) or raw text.
    Text(String),
    /// Small machine integer (chain id, recovery parameter, counters).
    Uint(u64),
    /// Nested list, used by the access-list field.
    List(Vec<Value>),
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Value {
    /// Convert to the canonical wire item.
    ///
    /// `0x`-prefixed hex text becomes its bytes (odd digit counts gain a
    /// leading zero nibble); bare text is taken as raw bytes; integers become
    /// minimal big-endian bytes with zero collapsing to empty.
    pub(crate) fn to_item(&self) -> Item {
        match self {
            Value::Null => Item::Bytes(Vec::new()),
            Value::Text(text) => Item::Bytes(text_bytes(text)),
            Value::Uint(n) => Item::Bytes(uint_bytes(*n)),
            Value::List(items) => Item::List(items.iter().map(Value::to_item).collect()),
        }
    }

    /// Whether the value canonicalizes to the empty byte string.
    pub(crate) fn is_vacant(&self) -> bool {
        match self.to_item() {
            Item::Bytes(bytes) => bytes.is_empty(),
            Item::List(_) => false,
        }
    }

    /// Interpret the canonical bytes as a big-endian integer.
    pub(crate) fn as_u64(&self, field: &'static str) -> Result<u64, Error> {
        match self.to_item() {
            Item::Bytes(bytes) => {
                if bytes.len() > 8 {
                    return Err(Error::ValueTooLarge { field });
                }
                let mut buf = [0u8; 8];
                buf[8 - bytes.len()..].copy_from_slice(&bytes);
                Ok(u64::from_be_bytes(buf))
            }
            Item::List(_) => Err(Error::UnexpectedList { field }),
        }
    }
}

/// Whether a string is hex, with or without a `0x` prefix.
pub(crate) fn is_hex(text: &str) -> bool {
    strip_hex_prefix(text).bytes().all(|b| b.is_ascii_hexdigit())
}

/// Strip a leading `0x` if present.
pub(crate) fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x").unwrap_or(text)
}

/// Minimal big-endian bytes of an integer; zero is the empty string.
pub(crate) fn uint_bytes(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes.get(start..).map(<[u8]>::to_vec).unwrap_or_default()
}

fn text_bytes(text: &str) -> Vec<u8> {
    // Only 0x-prefixed strings are hex on the wire; bare text is raw bytes.
    match text.strip_prefix("0x") {
        Some(digits) if digits.bytes().all(|b| b.is_ascii_hexdigit()) => hex_digit_bytes(digits),
        _ => text.as_bytes().to_vec(),
    }
}

fn hex_digit_bytes(digits: &str) -> Vec<u8> {
    if digits.len() % 2 == 1 {
        let mut padded = String::with_capacity(digits.len() + 1);
        padded.push('0');
        padded.push_str(digits);
        hex::decode(&padded).unwrap_or_default()
    } else {
        hex::decode(digits).unwrap_or_default()
    }
}

fn is_zero_digits(text: &str) -> bool {
    strip_hex_prefix(text).bytes().all(|b| b == b'0')
}

fn collapse_zero_scalar(value: Value) -> Value {
    match value {
        Value::Text(text) if is_zero_digits(&text) => Value::Text(String::new()),
        Value::Uint(0) => Value::Text(String::new()),
        other => other,
    }
}

/// Validate and normalize a value against a field rule.
///
/// Length checks branch on representation: hex input is measured in hex
/// digits against twice the byte maximum, raw input in bytes against the
/// maximum itself. Scalars that spell numeric zero collapse to the empty
/// string unless the field allows stored zero; inside a permitted list the
/// same collapse applies element-wise.
pub(crate) fn validate(field: &'static str, rule: &FieldRule, value: Value) -> Result<Value, Error> {
    match value {
        Value::List(items) => {
            if !rule.allow_list {
                return Err(Error::UnexpectedList { field });
            }
            if !rule.allow_short {
                if let Some(max) = rule.max_len {
                    if items.len() > max * 2 {
                        return Err(Error::FieldTooLong { field });
                    }
                }
            }
            if !rule.allow_zero {
                return Ok(Value::List(items.into_iter().map(collapse_zero_scalar).collect()));
            }
            Ok(Value::List(items))
        }
        Value::Uint(n) => {
            if !rule.allow_short {
                if let Some(max) = rule.max_len {
                    if uint_bytes(n).len() > max {
                        return Err(Error::FieldTooLong { field });
                    }
                }
            }
            if !rule.allow_zero && n == 0 {
                return Ok(Value::Text(String::new()));
            }
            Ok(Value::Uint(n))
        }
        Value::Text(text) => {
            if !rule.allow_short {
                if let Some(max) = rule.max_len {
                    let digits = strip_hex_prefix(&text);
                    let limit = if is_hex(&text) { max * 2 } else { max };
                    if digits.len() > limit {
                        return Err(Error::FieldTooLong { field });
                    }
                }
            }
            if !rule.allow_zero && is_zero_digits(&text) {
                return Ok(Value::Text(String::new()));
            }
            Ok(Value::Text(text))
        }
        Value::Null => Ok(Value::Null),
    }
}
