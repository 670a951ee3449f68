//! An in-memory table driver.
//!
//! Tables are held as ordered record lists and served page by page, with
//! the record offset as continuation token, the same way a remote source
//! pages through a view.

use indexmap::IndexMap;
use tablelink_core::{
    async_trait, bail,
    driver::{Driver, Page, SelectPage},
    Error, Record, RecordKey, Result, TableRef, Value,
};

/// Page size used by remote tabular APIs when none is requested.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Memory {
    tables: IndexMap<(String, String), Vec<Record>>,
    page_size: usize,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the number of records returned per page. Values below one are
    /// treated as one.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a table, replacing any table with the same base and name.
    pub fn table(
        mut self,
        base_id: impl Into<String>,
        table_name: impl Into<String>,
        records: impl IntoIterator<Item = Record>,
    ) -> Self {
        self.tables.insert(
            (base_id.into(), table_name.into()),
            records.into_iter().collect(),
        );
        self
    }

    /// Load tables from a JSON fixture of the form
    /// `{ "<baseId>": { "<tableName>": [{ "id": "...", "fields": { ... } }] } }`.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(bases) = json else {
            bail!("fixture must be an object of bases");
        };

        let mut memory = Self::new();

        for (base_id, tables) in bases {
            let serde_json::Value::Object(tables) = tables else {
                bail!("base `{base_id}` must be an object of tables");
            };

            for (table_name, records) in tables {
                let serde_json::Value::Array(records) = records else {
                    bail!("table `{base_id}/{table_name}` must be a list of records");
                };

                let records = records
                    .into_iter()
                    .enumerate()
                    .map(|(index, record)| parse_record(record).map_err(|err| {
                        err.context(format!("record {index} of `{base_id}/{table_name}`"))
                    }))
                    .collect::<Result<Vec<_>>>()?;

                memory = memory.table(base_id.clone(), table_name, records);
            }
        }

        Ok(memory)
    }

    fn records(&self, table: &TableRef) -> Result<&[Record]> {
        self.tables
            .get(&(table.base_id.clone(), table.table_name.clone()))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::driver(UnknownTable(table.to_string())))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for Memory {
    async fn select_page(&self, select: &SelectPage) -> Result<Page> {
        let records = self.records(&select.table)?;

        let limit = match select.table.max_records {
            Some(max) => records.len().min(usize::try_from(max).unwrap_or(usize::MAX)),
            None => records.len(),
        };

        let start = match &select.offset {
            Some(offset) => offset
                .parse::<usize>()
                .map_err(|_| Error::driver(InvalidOffset(offset.clone())))?,
            None => 0,
        };

        let end = start.saturating_add(self.page_size).min(limit);
        let page = records
            .get(start..end)
            .map(<[Record]>::to_vec)
            .unwrap_or_default();

        tracing::trace!(
            table = %select.table,
            view = %select.table.view,
            start,
            len = page.len(),
            "memory select page"
        );

        Ok(Page::new(page, (end < limit).then(|| end.to_string())))
    }

    async fn find(&self, table: &TableRef, id: &str) -> Result<Record> {
        self.records(table)?
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| Error::record_not_found(RecordKey::new(table, id).to_string()))
    }
}

fn parse_record(json: serde_json::Value) -> Result<Record> {
    let serde_json::Value::Object(mut object) = json else {
        bail!("record must be an object");
    };

    let Some(serde_json::Value::String(id)) = object.remove("id") else {
        bail!("record must have a string `id`");
    };

    let fields = match object.remove("fields") {
        Some(serde_json::Value::Object(fields)) => fields,
        None => Default::default(),
        Some(_) => bail!("record `{id}` has `fields` that is not an object"),
    };

    Ok(Record {
        id,
        fields: fields
            .into_iter()
            .map(|(name, value)| (name, Value::from(value)))
            .collect(),
    })
}

#[derive(Debug)]
struct UnknownTable(String);

impl std::error::Error for UnknownTable {}

impl core::fmt::Display for UnknownTable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "could not find table {}", self.0)
    }
}

#[derive(Debug)]
struct InvalidOffset(String);

impl std::error::Error for InvalidOffset {}

impl core::fmt::Display for InvalidOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid page offset `{}`", self.0)
    }
}
