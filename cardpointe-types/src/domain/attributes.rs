//! Dynamic key/value container backing every request and response.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::cast::Cast;

pub use serde_json::Value;

/// Plain JSON object, the shape everything is serialized to.
pub type Map = serde_json::Map<String, Value>;

static NULL: Value = Value::Null;

/// A bag of gateway fields.
///
/// Unknown keys are always accepted; which keys matter is decided by the
/// [`Schema`](super::Schema) of the request or response wrapping it.
/// Serializing an `Attributes` directly emits the stored values as-is; cast
/// rules only apply through [`Attributes::to_serializable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map);

impl Attributes {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns the stored value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the stored value for `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.0.get(key) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    /// Returns the value for `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the value for `key` if it is an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Returns `true` if `key` has been set, even to `null`.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Stores `value` under `key`, overwriting any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Consuming variant of [`set`](Self::set) for fluent construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `true`.
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.with(key, true)
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Fills in every key from `defaults` that is not already set.
    ///
    /// Values already present win over the defaults.
    pub fn with_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in defaults {
            self.0.entry(key.into()).or_insert_with(|| value.into());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrows the raw, uncast map.
    pub fn as_map(&self) -> &Map {
        &self.0
    }

    pub fn into_map(self) -> Map {
        self.0
    }

    /// Returns a plain map with `casts` applied.
    ///
    /// Stored values are left untouched.
    pub fn to_serializable(&self, casts: &[(&str, Cast)]) -> Map {
        let mut data = self.0.clone();
        for (key, cast) in casts {
            if let Some(value) = data.get_mut(*key) {
                *value = cast.apply(value);
            }
        }
        data
    }
}

impl From<Map> for Attributes {
    fn from(map: Map) -> Self {
        Self(map)
    }
}

impl From<Attributes> for Map {
    fn from(attrs: Attributes) -> Self {
        attrs.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl Index<&str> for Attributes {
    type Output = Value;

    /// Missing keys read as `null`.
    fn index(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }
}

impl IndexMut<&str> for Attributes {
    fn index_mut(&mut self, key: &str) -> &mut Value {
        self.0.entry(key).or_insert(Value::Null)
    }
}
