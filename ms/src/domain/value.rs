//! Target types and value conversion
//!
//! Record values arrive as raw JSON. Before two value collections can be
//! compared they are converted into the declared type of the target
//! attribute using the table below. `null` converts to "no value" for
//! every type.
//!
//! | target     | string            | number            | bool         | object            |
//! |------------|-------------------|-------------------|--------------|-------------------|
//! | string     | as-is             | decimal text      | text         | error             |
//! | polystring | orig = text       | orig = text       | orig = text  | `{"orig": ..}`    |
//! | int        | parse, fits i32   | integral, i32     | error        | error             |
//! | long       | parse i64         | integral i64      | error        | error             |
//! | double     | parse f64         | as f64            | error        | error             |
//! | boolean    | `true`/`false`    | error             | as-is        | error             |
//! | timestamp  | RFC 3339 → UTC    | epoch millis      | error        | error             |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Declared type of a target attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    #[default]
    String,
    PolyString,
    Int,
    Long,
    Double,
    Boolean,
    Timestamp,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::PolyString => write!(f, "polystring"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Double => write!(f, "double"),
            Self::Boolean => write!(f, "boolean"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Errors from converting a raw value into a target type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Cannot convert {found} to {target}")]
    Incompatible { target: TargetType, found: &'static str },

    #[error("Cannot parse '{value}' as {target}: {reason}")]
    Unparseable {
        target: TargetType,
        value: String,
        reason: String,
    },

    #[error("Value {value} is out of range for {target}")]
    OutOfRange { target: TargetType, value: String },
}

/// Polystring value; only the original text takes part in comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyString {
    pub orig: String,
}

impl PolyString {
    pub fn new(orig: impl Into<String>) -> Self {
        Self { orig: orig.into() }
    }
}

/// A value converted into a target type
#[derive(Debug, Clone)]
pub enum RealValue {
    String(String),
    PolyString(PolyString),
    Int(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

// Doubles compare by total order so NaN equals NaN and -0.0 differs from 0.0
impl PartialEq for RealValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::PolyString(a), Self::PolyString(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b).is_eq(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl TargetType {
    /// Convert a raw value into this type; `Ok(None)` for `null`
    pub fn convert(&self, value: &Value) -> Result<Option<RealValue>, ConversionError> {
        if value.is_null() {
            return Ok(None);
        }

        let converted = match self {
            Self::String => RealValue::String(self.as_text(value)?),
            Self::PolyString => match value {
                Value::Object(map) => match map.get("orig") {
                    Some(Value::String(orig)) => RealValue::PolyString(PolyString::new(orig.clone())),
                    _ => return Err(self.incompatible(value)),
                },
                other => RealValue::PolyString(PolyString::new(self.as_text(other)?)),
            },
            Self::Int => {
                let long = self.as_integer(value)?;
                let int = i32::try_from(long).map_err(|_| ConversionError::OutOfRange {
                    target: *self,
                    value: long.to_string(),
                })?;
                RealValue::Int(int)
            }
            Self::Long => RealValue::Long(self.as_integer(value)?),
            Self::Double => match value {
                Value::Number(n) => RealValue::Double(n.as_f64().ok_or_else(|| self.incompatible(value))?),
                Value::String(s) => RealValue::Double(s.trim().parse::<f64>().map_err(|e| self.unparseable(s, e))?),
                _ => return Err(self.incompatible(value)),
            },
            Self::Boolean => match value {
                Value::Bool(b) => RealValue::Boolean(*b),
                Value::String(s) if s.trim().eq_ignore_ascii_case("true") => RealValue::Boolean(true),
                Value::String(s) if s.trim().eq_ignore_ascii_case("false") => RealValue::Boolean(false),
                Value::String(s) => return Err(self.unparseable(s, "expected 'true' or 'false'")),
                _ => return Err(self.incompatible(value)),
            },
            Self::Timestamp => match value {
                Value::String(s) => {
                    let parsed = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| self.unparseable(s, e))?;
                    RealValue::Timestamp(parsed.with_timezone(&Utc))
                }
                Value::Number(n) => {
                    let millis = n.as_i64().ok_or_else(|| self.unparseable(&n.to_string(), "not an integer"))?;
                    let ts = DateTime::from_timestamp_millis(millis).ok_or_else(|| ConversionError::OutOfRange {
                        target: *self,
                        value: millis.to_string(),
                    })?;
                    RealValue::Timestamp(ts)
                }
                _ => return Err(self.incompatible(value)),
            },
        };

        Ok(Some(converted))
    }

    fn as_text(&self, value: &Value) -> Result<String, ConversionError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(self.incompatible(value)),
        }
    }

    fn as_integer(&self, value: &Value) -> Result<i64, ConversionError> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(i)
                } else if n.is_u64() {
                    Err(ConversionError::OutOfRange {
                        target: *self,
                        value: n.to_string(),
                    })
                } else {
                    Err(self.unparseable(&n.to_string(), "not an integer"))
                }
            }
            Value::String(s) => s.trim().parse::<i64>().map_err(|e| self.unparseable(s, e)),
            _ => Err(self.incompatible(value)),
        }
    }

    fn incompatible(&self, value: &Value) -> ConversionError {
        ConversionError::Incompatible {
            target: *self,
            found: json_kind(value),
        }
    }

    fn unparseable(&self, value: &str, reason: impl fmt::Display) -> ConversionError {
        ConversionError::Unparseable {
            target: *self,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
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

/// Text form of a raw value for service examples; `None` for `null`
pub fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("orig") {
            Some(Value::String(orig)) => Some(orig.clone()),
            _ => Some(value.to_string()),
        },
        other => Some(other.to_string()),
    }
}
