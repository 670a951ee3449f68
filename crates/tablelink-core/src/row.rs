use crate::Value;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// An output row: output field names mapped to values or nested rows, in
/// field declaration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    fields: IndexMap<String, Field>,
}

/// The value of one output field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A value passed through from the source record
    Value(Value),

    /// Rows resolved from a reference field, in reference order
    Rows(Vec<Row>),
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an output field. A later field with the same output name
    /// replaces the earlier value but keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, field: impl Into<Field>) {
        self.fields.insert(name.into(), field.into());
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if the named field is present and truthy.
    ///
    /// Resolved fields are lists, so they are truthy even when empty.
    pub fn is_truthy(&self, name: &str) -> bool {
        match self.get(name) {
            Some(Field::Value(value)) => value.is_truthy(),
            Some(Field::Rows(_)) => true,
            None => false,
        }
    }
}

impl<K: Into<String>, F: Into<Field>> FromIterator<(K, F)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, F)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, f)| (k.into(), f.into()))
                .collect(),
        }
    }
}

impl Field {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<Row>> for Field {
    fn from(rows: Vec<Row>) -> Self {
        Self::Rows(rows)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Rows(rows) => serializer.collect_seq(rows),
        }
    }
}
