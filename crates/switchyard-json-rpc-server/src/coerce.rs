//! Value coercion from wire values into typed procedure arguments.
//!
//! Two entry points exist, one per transport:
//!
//! - [`coerce_text`] for query-string / form values, which are always text
//! - [`coerce_json`] for JSON-RPC parameters
//!
//! The textual rules are compatibility heuristics that existing clients rely
//! on, and are checked in a fixed order: `0x` hex prefix, then a
//! double-quoted JSON string literal, then the raw text.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use std::fmt;
use std::num::ParseIntError;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Static shape of a procedure argument.
///
/// Selects the coercion strategy; nothing else about the argument's type is
/// visible to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgShape {
    /// Signed 64-bit integer
    Integer,
    /// Raw byte sequence
    Bytes,
    /// UTF-8 text
    Text,
    /// Boolean
    Bool,
    /// Arbitrary JSON document. Only reachable through JSON-RPC.
    Structured,
}

impl ArgShape {
    pub fn name(&self) -> &'static str {
        match self {
            ArgShape::Integer => "integer",
            ArgShape::Bytes => "bytes",
            ArgShape::Text => "text",
            ArgShape::Bool => "boolean",
            ArgShape::Structured => "structured",
        }
    }

    /// The value bound when a non-optional argument is missing from the request.
    pub fn zero_value(&self) -> ArgValue {
        match self {
            ArgShape::Integer => ArgValue::Integer(0),
            ArgShape::Bytes => ArgValue::Bytes(Vec::new()),
            ArgShape::Text => ArgValue::Text(String::new()),
            ArgShape::Bool => ArgValue::Bool(false),
            ArgShape::Structured => ArgValue::Structured(Value::Null),
        }
    }
}

impl fmt::Display for ArgShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concretely-typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// An optional argument that the caller did not supply
    Absent,
    Integer(i64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Structured(Value),
}

impl ArgValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ArgValue::Absent)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ArgValue::Bytes(v) => Some(v),
            ArgValue::Text(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ArgValue::Structured(v) => Some(v),
            _ => None,
        }
    }
}

/// Why a wire value could not be turned into an argument.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("invalid integer: {0}")]
    InvalidInteger(#[from] ParseIntError),

    #[error("invalid hex: {0}")]
    InvalidHex(faster_hex::Error),

    #[error("invalid quoted string: {0}")]
    InvalidQuotedString(#[from] serde_json::Error),

    #[error("invalid UTF-8 text: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("invalid boolean: {0:?}")]
    InvalidBoolean(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("expected {expected}, got JSON {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The procedure declares a shape this transport cannot produce. This is
    /// a registration mistake rather than a client mistake.
    #[error("unsupported argument type {0}")]
    UnsupportedShape(ArgShape),
}

impl CoerceError {
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, CoerceError::UnsupportedShape(_))
    }
}

/// Coerces a query-string value into `shape`.
pub fn coerce_text(shape: ArgShape, text: &str) -> Result<ArgValue, CoerceError> {
    match shape {
        ArgShape::Integer => decode_integer(text).map(ArgValue::Integer),
        ArgShape::Bytes => decode_string(text).map(ArgValue::Bytes),
        ArgShape::Text => Ok(ArgValue::Text(String::from_utf8(decode_string(text)?)?)),
        ArgShape::Bool => decode_bool(text).map(ArgValue::Bool),
        ArgShape::Structured => Err(CoerceError::UnsupportedShape(shape)),
    }
}

/// Coerces a JSON-RPC parameter into `shape`.
///
/// Integers may arrive as JSON strings holding base-10 digits; byte
/// sequences arrive as standard base64 strings.
pub fn coerce_json(shape: ArgShape, value: &Value) -> Result<ArgValue, CoerceError> {
    match (shape, value) {
        (ArgShape::Integer, Value::String(s)) => Ok(ArgValue::Integer(s.parse::<i64>()?)),
        (ArgShape::Integer, Value::Number(n)) => {
            n.as_i64()
                .map(ArgValue::Integer)
                .ok_or(CoerceError::TypeMismatch {
                    expected: "integer",
                    found: "non-integral number",
                })
        }
        (ArgShape::Bytes, Value::String(s)) => Ok(ArgValue::Bytes(STANDARD.decode(s)?)),
        (ArgShape::Text, Value::String(s)) => Ok(ArgValue::Text(s.clone())),
        (ArgShape::Bool, Value::Bool(b)) => Ok(ArgValue::Bool(*b)),
        (ArgShape::Structured, v) => Ok(ArgValue::Structured(v.clone())),
        (shape, other) => Err(CoerceError::TypeMismatch {
            expected: shape.name(),
            found: json_kind(other),
        }),
    }
}

/// Decodes a base-10 integer, tolerating one pair of surrounding double quotes.
pub fn decode_integer(s: &str) -> Result<i64, CoerceError> {
    let digits = if is_quoted_string(s) {
        &s[1..s.len() - 1]
    } else {
        s
    };
    Ok(digits.parse::<i64>()?)
}

/// Decodes text into bytes: `0x`-prefixed hex, a quoted JSON string, or the
/// raw text unchanged, in that order.
pub fn decode_string(s: &str) -> Result<Vec<u8>, CoerceError> {
    if s.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x")) {
        let hex = &s.as_bytes()[2..];
        let mut out = vec![0u8; hex.len() / 2];
        faster_hex::hex_decode(hex, &mut out).map_err(CoerceError::InvalidHex)?;
        return Ok(out);
    }
    if is_quoted_string(s) {
        let decoded: String = serde_json::from_str(s)?;
        return Ok(decoded.into_bytes());
    }
    Ok(s.as_bytes().to_vec())
}

/// Accepts the conventional textual boolean spellings.
pub fn decode_bool(s: &str) -> Result<bool, CoerceError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(CoerceError::InvalidBoolean(other.to_string())),
    }
}

fn is_quoted_string(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
