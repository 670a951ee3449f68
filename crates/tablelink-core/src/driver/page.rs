use crate::{Record, TableRef};

/// A request for one page of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPage {
    pub table: TableRef,

    /// Continuation token returned with the previous page
    pub offset: Option<String>,
}

/// One page of records, in the order the source returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,

    /// Continuation token for the next page, `None` on the last page
    pub offset: Option<String>,
}

impl SelectPage {
    pub fn first(table: TableRef) -> Self {
        Self {
            table,
            offset: None,
        }
    }

    /// The request for the page following `offset`.
    pub fn next(&self, offset: String) -> Self {
        Self {
            table: self.table.clone(),
            offset: Some(offset),
        }
    }
}

impl Page {
    pub fn new(records: Vec<Record>, offset: Option<String>) -> Self {
        Self { records, offset }
    }

    pub fn last(records: Vec<Record>) -> Self {
        Self::new(records, None)
    }

    pub fn is_last(&self) -> bool {
        self.offset.is_none()
    }
}
