//! XML-RPC value model.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A decoded XML-RPC value.
///
/// `DateTime` and `Base64` keep their wire text; the gateway only relays
/// them and never needs the decoded form.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValue {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(String),
    Array(Vec<RpcValue>),
    Struct(BTreeMap<String, RpcValue>),
    Nil,
}

impl RpcValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RpcValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RpcValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RpcValue]> {
        match self {
            RpcValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a member of a struct value.
    pub fn member(&self, name: &str) -> Option<&RpcValue> {
        match self {
            RpcValue::Struct(members) => members.get(name),
            _ => None,
        }
    }

    /// Convert into the JSON shape returned to HTTP callers.
    ///
    /// Non-finite doubles have no JSON representation and become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            RpcValue::Int(i) => Value::Number((*i).into()),
            RpcValue::Bool(b) => Value::Bool(*b),
            RpcValue::String(s) | RpcValue::DateTime(s) | RpcValue::Base64(s) => {
                Value::String(s.clone())
            }
            RpcValue::Double(d) => Number::from_f64(*d).map_or(Value::Null, Value::Number),
            RpcValue::Array(items) => Value::Array(items.iter().map(RpcValue::to_json).collect()),
            RpcValue::Struct(members) => Value::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            RpcValue::Nil => Value::Null,
        }
    }
}

impl From<&str> for RpcValue {
    fn from(s: &str) -> Self {
        RpcValue::String(s.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(s: String) -> Self {
        RpcValue::String(s)
    }
}

impl From<bool> for RpcValue {
    fn from(b: bool) -> Self {
        RpcValue::Bool(b)
    }
}

impl From<i64> for RpcValue {
    fn from(i: i64) -> Self {
        RpcValue::Int(i)
    }
}

impl From<i32> for RpcValue {
    fn from(i: i32) -> Self {
        RpcValue::Int(i64::from(i))
    }
}

impl From<f64> for RpcValue {
    fn from(d: f64) -> Self {
        RpcValue::Double(d)
    }
}

impl<T: Into<RpcValue>> From<Vec<T>> for RpcValue {
    fn from(items: Vec<T>) -> Self {
        RpcValue::Array(items.into_iter().map(Into::into).collect())
    }
}
