//! Table options: which table to read, which fields to keep, and how
//! reference fields resolve into other tables.
//!
//! Options are usually parsed from a JSON source artifact:
//!
//! ```json
//! {
//!     "baseId": "appXXXX",
//!     "tableName": "Projects",
//!     "fields": [
//!         { "name": "Name" },
//!         { "name": "Owner", "mapToName": "owner", "resolve": {
//!             "baseId": "appXXXX",
//!             "tableName": "People",
//!             "fields": [{ "name": "Name" }]
//!         }}
//!     ],
//!     "cacheTables": [{ "baseId": "appXXXX", "tableName": "People" }],
//!     "includeFilterFieldName": "Published"
//! }
//! ```

use crate::{Error, Result};

use serde::Deserialize;

/// The view used when the options do not name one.
pub const DEFAULT_VIEW: &str = "Grid view";

/// Name used for a field entry that does not name its source field.
const UNKNOWN_FIELD: &str = "unknown";

/// Identifies a queryable remote table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub base_id: String,
    pub table_name: String,
    pub max_records: Option<u64>,
    pub view: String,
}

/// How one output field is produced from a source record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// Pass the source value through unchanged.
    Direct { source: String, output: String },

    /// Treat the source value as a list of record ids in another table and
    /// resolve each into a nested row.
    Resolved {
        source: String,
        output: String,
        nested: Box<TableOptions>,
    },
}

/// The declared field list of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    Specs(Vec<FieldSpec>),

    /// The source options had a `fields` value that is not a list of field
    /// entries. Records of this table resolve to empty rows.
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub table: TableRef,
    pub fields: Fields,

    /// Tables read in full before resolution so reference lookups into
    /// them are served from the cache.
    pub cache_tables: Vec<TableRef>,

    /// Output field that must be truthy for a row to be kept.
    pub include_filter: Option<String>,

    /// Request a stats report from the caller.
    pub show_stats: bool,
}

impl TableRef {
    pub fn new(base_id: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            table_name: table_name.into(),
            max_records: None,
            view: DEFAULT_VIEW.to_string(),
        }
    }

    pub fn max_records(mut self, max_records: u64) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    /// Checks that the reference names both a base and a table.
    pub fn validate(&self) -> Result<()> {
        if self.base_id.is_empty() {
            return Err(Error::invalid_table_options(format!(
                "table `{}` is missing `baseId`",
                self.table_name
            )));
        }

        if self.table_name.is_empty() {
            return Err(Error::invalid_table_options(format!(
                "a table in base `{}` is missing `tableName`",
                self.base_id
            )));
        }

        Ok(())
    }
}

impl core::fmt::Display for TableRef {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}/{}", self.base_id, self.table_name)
    }
}

impl FieldSpec {
    pub fn direct(source: impl Into<String>) -> Self {
        let source = source.into();
        Self::Direct {
            output: source.clone(),
            source,
        }
    }

    pub fn resolved(source: impl Into<String>, nested: TableOptions) -> Self {
        let source = source.into();
        Self::Resolved {
            output: source.clone(),
            source,
            nested: Box::new(nested),
        }
    }

    /// Renames the output field. An empty name keeps the source name.
    pub fn map_to(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            match &mut self {
                Self::Direct { output, .. } | Self::Resolved { output, .. } => *output = name,
            }
        }
        self
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Direct { source, .. } | Self::Resolved { source, .. } => source,
        }
    }

    pub fn output(&self) -> &str {
        match self {
            Self::Direct { output, .. } | Self::Resolved { output, .. } => output,
        }
    }
}

impl Fields {
    pub fn as_specs(&self) -> Option<&[FieldSpec]> {
        match self {
            Self::Specs(specs) => Some(specs),
            Self::Malformed => None,
        }
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self::Specs(vec![])
    }
}

impl TableOptions {
    pub fn new(base_id: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self::from_table(TableRef::new(base_id, table_name))
    }

    pub fn from_table(table: TableRef) -> Self {
        Self {
            table,
            fields: Fields::default(),
            cache_tables: vec![],
            include_filter: None,
            show_stats: false,
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        match &mut self.fields {
            Fields::Specs(specs) => specs.push(spec),
            Fields::Malformed => self.fields = Fields::Specs(vec![spec]),
        }
        self
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn cache_table(mut self, table: TableRef) -> Self {
        self.cache_tables.push(table);
        self
    }

    pub fn include_filter(mut self, name: impl Into<String>) -> Self {
        self.include_filter = Some(name.into());
        self
    }

    /// Parses options from a JSON source artifact.
    pub fn from_json_str(src: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(src)
            .map_err(|err| Error::from(err).context("table options are not valid JSON"))?;
        Self::from_json(json)
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let raw: RawTableOptions = serde_json::from_value(json)
            .map_err(|err| Error::invalid_table_options(err.to_string()))?;
        raw.into_options()
    }

    /// Checks this table, its cache tables and every nested table.
    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;

        for table in &self.cache_tables {
            table.validate()?;
        }

        for spec in self.fields.as_specs().unwrap_or_default() {
            if let FieldSpec::Resolved { nested, .. } = spec {
                nested.validate()?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTableRef {
    base_id: Option<String>,
    table_name: Option<String>,
    max_records: Option<u64>,
    view: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTableOptions {
    #[serde(flatten)]
    table: RawTableRef,

    // Kept untyped so a malformed list degrades per record instead of
    // failing the whole parse.
    #[serde(default)]
    fields: serde_json::Value,

    #[serde(default)]
    cache_tables: Vec<RawTableRef>,

    include_filter_field_name: Option<String>,

    #[serde(default)]
    show_stats: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(alias = "airtableName")]
    name: Option<String>,
    map_to_name: Option<String>,
    resolve: Option<serde_json::Value>,
}

impl RawTableRef {
    fn into_table_ref(self) -> Result<TableRef> {
        let table = TableRef {
            base_id: self.base_id.unwrap_or_default(),
            table_name: self.table_name.unwrap_or_default(),
            max_records: self.max_records,
            view: self
                .view
                .filter(|view| !view.is_empty())
                .unwrap_or_else(|| DEFAULT_VIEW.to_string()),
        };
        table.validate()?;
        Ok(table)
    }
}

impl RawTableOptions {
    fn into_options(self) -> Result<TableOptions> {
        let table = self.table.into_table_ref()?;

        let fields = match self.fields {
            serde_json::Value::Null => Fields::default(),
            serde_json::Value::Array(entries) => parse_fields(entries)?,
            _ => Fields::Malformed,
        };

        let cache_tables = self
            .cache_tables
            .into_iter()
            .map(RawTableRef::into_table_ref)
            .collect::<Result<Vec<_>>>()?;

        Ok(TableOptions {
            table,
            fields,
            cache_tables,
            include_filter: self.include_filter_field_name.filter(|name| !name.is_empty()),
            show_stats: self.show_stats,
        })
    }
}

fn parse_fields(entries: Vec<serde_json::Value>) -> Result<Fields> {
    let mut specs = Vec::with_capacity(entries.len());

    for entry in entries {
        let Ok(raw) = serde_json::from_value::<RawField>(entry) else {
            return Ok(Fields::Malformed);
        };

        let source = raw
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        let spec = match raw.resolve {
            Some(nested) if !nested.is_null() => {
                let nested = TableOptions::from_json(nested).map_err(|err| {
                    err.context(format!("in `resolve` of field `{source}`"))
                })?;
                FieldSpec::resolved(source, nested)
            }
            _ => FieldSpec::direct(source),
        };

        specs.push(spec.map_to(raw.map_to_name.unwrap_or_default()));
    }

    Ok(Fields::Specs(specs))
}
