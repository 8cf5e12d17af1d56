//! Request parameters and their wire encodings.
//!
//! # Design
//! `ParameterValue` is a closed set of values with two renderings: a string
//! for query items (`Display`) and a JSON value for request bodies
//! (`to_json`). Sequences and structured values nest. Structured values are
//! captured as `serde_json::Value` when the parameter is created, so a type
//! that cannot serialize fails at that point instead of inside the builder.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// Format used for `ParameterValue::Date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    String(String),
    /// Rendered as `yyyy-MM-dd`.
    Date(NaiveDate),
    /// Rendered as the comma-joined renderings of its elements.
    List(Vec<ParameterValue>),
    /// Rendered as compact JSON text in a query, embedded as-is in a body.
    Json(Value),
}

impl ParameterValue {
    /// Capture any serializable structure as a `Json` parameter.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(ParameterValue::Json)
    }

    /// JSON representation used for request bodies.
    ///
    /// Fails for non-finite floats, which JSON cannot represent.
    pub fn to_json(&self) -> Result<Value, String> {
        Ok(match self {
            ParameterValue::Int(v) => Value::from(*v),
            ParameterValue::UInt(v) => Value::from(*v),
            ParameterValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .ok_or_else(|| format!("{v} has no JSON representation"))?,
            ParameterValue::Bool(v) => Value::Bool(*v),
            ParameterValue::String(v) => Value::String(v.clone()),
            ParameterValue::Date(v) => Value::String(v.format(DATE_FORMAT).to_string()),
            ParameterValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(ParameterValue::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            ParameterValue::Json(v) => v.clone(),
        })
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::UInt(v) => write!(f, "{v}"),
            ParameterValue::Float(v) => write!(f, "{v}"),
            ParameterValue::Bool(v) => f.write_str(if *v { "true" } else { "false" }),
            ParameterValue::String(v) => f.write_str(v),
            ParameterValue::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            ParameterValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            ParameterValue::Json(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for ParameterValue {
            fn from(v: $t) -> Self {
                ParameterValue::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for ParameterValue {
            fn from(v: $t) -> Self {
                ParameterValue::UInt(u64::from(v))
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<isize> for ParameterValue {
    fn from(v: isize) -> Self {
        // isize is at most 64 bits on every supported target
        ParameterValue::Int(v as i64)
    }
}

impl From<usize> for ParameterValue {
    fn from(v: usize) -> Self {
        ParameterValue::UInt(v as u64)
    }
}

impl From<f32> for ParameterValue {
    fn from(v: f32) -> Self {
        ParameterValue::Float(f64::from(v))
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::String(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::String(v)
    }
}

impl From<NaiveDate> for ParameterValue {
    fn from(v: NaiveDate) -> Self {
        ParameterValue::Date(v)
    }
}

impl From<DateTime<Utc>> for ParameterValue {
    fn from(v: DateTime<Utc>) -> Self {
        ParameterValue::Date(v.date_naive())
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(v: Vec<T>) -> Self {
        ParameterValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for ParameterValue {
    fn from(v: Value) -> Self {
        ParameterValue::Json(v)
    }
}

/// Named parameters; a `None` value marks the parameter as absent.
///
/// Iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(BTreeMap<String, Option<ParameterValue>>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.0.insert(key.into(), Some(value.into()));
        self
    }

    pub fn with_optional<V: Into<ParameterValue>>(
        mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        self.0.insert(key.into(), value.map(Into::into));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<ParameterValue>) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.0.get(key).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All entries, including absent ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParameterValue>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Entries whose value is present.
    pub fn present(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Parameters(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

/// How parameters attach to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParameters {
    /// Appended to the URL as query items.
    Query(Parameters),
    /// Serialized as a JSON object body.
    Body(Parameters),
    /// Sent verbatim as the body.
    Data(Vec<u8>),
    None,
}
