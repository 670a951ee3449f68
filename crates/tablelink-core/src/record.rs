use crate::{TableRef, Value};

use indexmap::IndexMap;

/// A record returned by a driver: its id and the raw values of its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style helper to set a field.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the raw value of the named field, or `None` if the record
    /// has no value for it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Identifies a record across bases and tables.
///
/// Record ids are only unique within a table of a base, so the key carries
/// all three parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub base_id: String,
    pub table_name: String,
    pub record_id: String,
}

impl RecordKey {
    pub fn new(table: &TableRef, record_id: impl Into<String>) -> Self {
        Self {
            base_id: table.base_id.clone(),
            table_name: table.table_name.clone(),
            record_id: record_id.into(),
        }
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "base={} table={} id={}",
            self.base_id, self.table_name, self.record_id
        )
    }
}
