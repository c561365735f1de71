//! Dynamic values held by render scopes and passed to and from helpers

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;

use crate::locale::Locale;

/// Map type used for object values
pub type Map = BTreeMap<String, Value>;

/// A value in the render scope or returned from a helper
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Map),
    /// A stateful iterator, drained by sections and reset afterwards
    Iter(SharedEnumerator),
}

/// The shape of a [`Value`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    Iter,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Iter(_) => ValueKind::Iter,
        }
    }

    /// Section gating rule: null, `false`, empty lists and empty strings are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Str(value) => !value.is_empty(),
            Value::List(values) => !values.is_empty(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a key when this value is a map
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Renders the value as text using the locale's number conventions
    ///
    /// Lists and maps are written as JSON; null and iterators produce nothing.
    pub fn format(&self, locale: &Locale) -> String {
        match self {
            Value::Null | Value::Iter(_) => String::new(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => locale.format_float(*value),
            Value::Str(value) => value.clone(),
            Value::List(_) | Value::Map(_) => self.to_json().to_string(),
        }
    }

    /// Converts to JSON; iterators and non-finite floats become `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Iter(_) => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::Int(value) => serde_json::Value::from(*value),
            Value::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(value) => serde_json::Value::String(value.clone()),
            Value::List(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Builds a value from anything serde can serialize
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Int(value),
                None => number.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(value) => Value::Str(value),
            serde_json::Value::Array(values) => {
                Value::List(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(Value::Int)
            .unwrap_or(Value::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<SharedEnumerator> for Value {
    fn from(value: SharedEnumerator) -> Self {
        Value::Iter(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A resettable source of values, consumed one at a time
pub trait Enumerator: Send {
    fn next_value(&mut self) -> Option<Value>;

    /// Rewinds to the first value
    fn reset(&mut self);
}

/// An [`Enumerator`] over a fixed list of values
#[derive(Debug, Clone)]
pub struct ListEnumerator {
    values: Vec<Value>,
    position: usize,
}

impl ListEnumerator {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl Enumerator for ListEnumerator {
    fn next_value(&mut self) -> Option<Value> {
        let value = self.values.get(self.position).cloned();
        if value.is_some() {
            self.position += 1;
        }
        value
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}

/// A shared handle to an [`Enumerator`]
///
/// Clones share position. Calls are not coordinated across threads beyond the
/// lock around each single step.
#[derive(Clone)]
pub struct SharedEnumerator(Arc<Mutex<dyn Enumerator>>);

impl SharedEnumerator {
    pub fn new(enumerator: impl Enumerator + 'static) -> Self {
        Self(Arc::new(Mutex::new(enumerator)))
    }

    pub fn from_values<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::new(ListEnumerator::new(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    fn lock(&self) -> MutexGuard<'_, dyn Enumerator + 'static> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn next_value(&self) -> Option<Value> {
        self.lock().next_value()
    }

    pub fn reset(&self) {
        self.lock().reset()
    }
}

impl fmt::Debug for SharedEnumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedEnumerator(..)")
    }
}

impl PartialEq for SharedEnumerator {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Map(Map::new()).is_truthy());
        assert!(Value::from(SharedEnumerator::from_values(Vec::<i64>::new())).is_truthy());
    }

    #[test]
    fn converts_json_numbers() {
        let value = Value::from(json!({ "count": 10, "price": 1.5, "tags": ["a"] }));
        assert_eq!(value.get("count"), Some(&Value::Int(10)));
        assert_eq!(value.get("price"), Some(&Value::Float(1.5)));
        assert_eq!(
            value.get("tags"),
            Some(&Value::List(vec![Value::from("a")]))
        );
    }

    #[test]
    fn formats_collections_as_json() {
        let value = Value::from(json!({ "a": [1, 2] }));
        assert_eq!(value.format(&Locale::INVARIANT), r#"{"a":[1,2]}"#);
        assert_eq!(Value::Float(1.21).format(&Locale::RU_RU), "1,21");
    }

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: u32,
    }

    #[test]
    fn builds_from_serialize() {
        let value = Value::from_serialize(&Person {
            name: "King".to_string(),
            age: 42,
        })
        .unwrap();
        assert_eq!(value.get("name"), Some(&Value::from("King")));
        assert_eq!(value.get("age"), Some(&Value::Int(42)));
    }

    #[test]
    fn enumerator_resets() {
        let values = SharedEnumerator::from_values([1, 2]);
        assert_eq!(values.next_value(), Some(Value::Int(1)));
        assert_eq!(values.next_value(), Some(Value::Int(2)));
        assert_eq!(values.next_value(), None);
        values.reset();
        assert_eq!(values.clone().next_value(), Some(Value::Int(1)));
    }
}
