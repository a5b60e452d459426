//! Query-string builder.
//!
//! Absent values are dropped rather than serialized as empty parameters.
//! Keys and values use `application/x-www-form-urlencoded` encoding, so a
//! space becomes `+` and `~` becomes `%7E`, not the `%20`/`~` of RFC 3986
//! component encoding. Servers decode both forms the same way for query
//! strings.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use ::url::{form_urlencoded, Url};

/// A scalar query value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::Float(n) => write!(f, "{}", n),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

/// Raised when a JSON value cannot be expressed as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("query parameters must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("query parameter '{key}' has unsupported type {kind}")]
    UnsupportedValue { key: String, kind: &'static str },
}

/// Ordered key/value pairs; `None` marks an absent value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Option<QueryValue>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.entries.push((key.into(), Some(value.into())));
        self
    }

    /// Add a key whose value may be absent.
    pub fn set_opt<V: Into<QueryValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.entries.push((key.into(), value.map(Into::into)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Present entries only.
    pub fn present(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// Convert a JSON object of scalars and nulls.
    pub fn from_json(value: &Value) -> Result<Self, EncodingError> {
        let object = match value {
            Value::Object(map) => map,
            other => return Err(EncodingError::NotAnObject(json_kind(other))),
        };

        let mut params = QueryParams::new();
        for (key, value) in object {
            let value = match value {
                Value::Null => None,
                Value::Bool(b) => Some(QueryValue::Bool(*b)),
                Value::String(s) => Some(QueryValue::Str(s.clone())),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => Some(QueryValue::Int(i)),
                    None => n.as_f64().map(QueryValue::Float),
                },
                other => {
                    return Err(EncodingError::UnsupportedValue {
                        key: key.clone(),
                        kind: json_kind(other),
                    })
                }
            };
            params.entries.push((key.clone(), value));
        }
        Ok(params)
    }
}

impl<K: Into<String>> FromIterator<(K, Option<QueryValue>)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, Option<QueryValue>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
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

/// Append every present parameter of `params` to the query of `base`.
///
/// Returns `base` untouched when nothing is present. Absolute URLs are
/// rebuilt through [`Url`], so parameters land before any fragment.
/// Relative or unparseable bases are joined as text.
pub fn build_url(base: &str, params: &QueryParams) -> String {
    let mut present = params.present().peekable();
    if present.peek().is_none() {
        return base.to_string();
    }

    match Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .extend_pairs(present.map(|(key, value)| (key, value.to_string())));
            url.into()
        }
        Err(_) => {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in present {
                serializer.append_pair(key, &value.to_string());
            }
            join_raw(base, &serializer.finish())
        }
    }
}

fn join_raw(base: &str, query: &str) -> String {
    let (head, fragment) = match base.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (base, None),
    };
    let separator = if !head.contains('?') {
        "?"
    } else if head.ends_with('?') || head.ends_with('&') {
        ""
    } else {
        "&"
    };

    let mut out = format!("{}{}{}", head, separator, query);
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
