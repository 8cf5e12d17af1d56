//! JSON response decoding.
//!
//! # Design
//! The key strategy is fixed per decoder and the decoder is fixed per
//! service. With `ConvertFromSnakeCase`, object keys are rewritten before the
//! target type sees them, so `{"air_date": ..}` fills a field that the target
//! declares as `airDate` (e.g. via `#[serde(rename_all = "camelCase")]`).

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// How object keys in a response map onto the target type's field names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDecodingStrategy {
    /// Keys are used as they appear on the wire.
    #[default]
    UseDefaultKeys,
    /// `snake_case` keys become `camelCase` before decoding.
    ConvertFromSnakeCase,
}

/// Decodes validated response bodies into typed values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonDecoder {
    key_decoding: KeyDecodingStrategy,
}

impl JsonDecoder {
    pub fn new(key_decoding: KeyDecodingStrategy) -> Self {
        Self { key_decoding }
    }

    pub fn key_decoding(&self) -> KeyDecodingStrategy {
        self.key_decoding
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::EmptyBody);
        }
        match self.key_decoding {
            KeyDecodingStrategy::UseDefaultKeys => Ok(serde_json::from_slice(bytes)?),
            KeyDecodingStrategy::ConvertFromSnakeCase => {
                let value: Value = serde_json::from_slice(bytes)?;
                Ok(serde_json::from_value(camel_case_keys(value))?)
            }
        }
    }
}

fn camel_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = match convert_from_snake_case(&key) {
                        Cow::Borrowed(_) => key,
                        Cow::Owned(converted) => converted,
                    };
                    (key, camel_case_keys(value))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camel_case_keys).collect()),
        other => other,
    }
}

/// `air_date` -> `airDate`, `_private_key_` -> `_privateKey_`.
///
/// Keys with a single word (no inner underscore) are returned unchanged.
pub fn convert_from_snake_case(key: &str) -> Cow<'_, str> {
    let core = key.trim_matches('_');
    if core.is_empty() {
        return Cow::Borrowed(key);
    }
    let mut words = core.split('_').filter(|word| !word.is_empty());
    let Some(first) = words.next() else {
        return Cow::Borrowed(key);
    };
    let rest: Vec<&str> = words.collect();
    if rest.is_empty() {
        return Cow::Borrowed(key);
    }

    let leading = key.len() - key.trim_start_matches('_').len();
    let trailing = key.len() - key.trim_end_matches('_').len();

    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..leading]);
    out.push_str(&first.to_lowercase());
    for word in rest {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(&key[key.len() - trailing..]);
    Cow::Owned(out)
}
