use crate::RecordKey;

/// A non-fatal problem found while resolving a record.
///
/// The affected field resolves to an empty list of rows (or the record to
/// an empty row) and the session carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A reference field held something other than a list of record ids.
    NotAList {
        record: RecordKey,
        field: String,
        found: &'static str,
    },

    /// The table's `fields` option is not a list of field entries.
    MalformedFields { record: RecordKey },

    /// A reference points back at a record already being resolved above it.
    Cycle {
        record: RecordKey,
        field: String,
        target: RecordKey,
    },

    /// A reference field sits deeper than the configured nesting limit.
    DepthExceeded {
        record: RecordKey,
        field: String,
        depth: usize,
    },
}

impl Warning {
    /// The record the warning was raised for.
    pub fn record(&self) -> &RecordKey {
        match self {
            Self::NotAList { record, .. }
            | Self::MalformedFields { record }
            | Self::Cycle { record, .. }
            | Self::DepthExceeded { record, .. } => record,
        }
    }
}

impl core::fmt::Display for Warning {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::NotAList {
                record,
                field,
                found,
            } => write!(
                f,
                "field `{field}` of {record} should be a list of record ids, found {found}; resolved as empty"
            ),
            Self::MalformedFields { record } => write!(
                f,
                "`fields` is not a list of field entries; {record} resolved as an empty row"
            ),
            Self::Cycle {
                record,
                field,
                target,
            } => write!(
                f,
                "field `{field}` of {record} refers back to {target}; reference skipped"
            ),
            Self::DepthExceeded {
                record,
                field,
                depth,
            } => write!(
                f,
                "field `{field}` of {record} is nested {depth} levels deep; resolved as empty"
            ),
        }
    }
}
