mod page;
pub use page::{Page, SelectPage};

use crate::{async_trait, Record, TableRef};

use std::{fmt::Debug, sync::Arc};

/// A client for a remote tabular data source.
///
/// Authentication, transport and retries are the driver's concern. The
/// engine only asks for pages of a table and for single records by id.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Fetch one page of a table's records.
    ///
    /// `select.offset` is `None` for the first page and the continuation
    /// token of the previous page afterwards. The returned page carries the
    /// token for the next page, or `None` once the table is exhausted.
    async fn select_page(&self, select: &SelectPage) -> crate::Result<Page>;

    /// Fetch a single record by id.
    ///
    /// Returns an error for which [`crate::Error::is_record_not_found`]
    /// holds when the table has no record with this id.
    async fn find(&self, table: &TableRef, id: &str) -> crate::Result<Record>;
}

#[async_trait]
impl<T: Driver + ?Sized> Driver for Arc<T> {
    async fn select_page(&self, select: &SelectPage) -> crate::Result<Page> {
        (**self).select_page(select).await
    }

    async fn find(&self, table: &TableRef, id: &str) -> crate::Result<Record> {
        (**self).find(table, id).await
    }
}

#[async_trait]
impl<T: Driver + ?Sized> Driver for Box<T> {
    async fn select_page(&self, select: &SelectPage) -> crate::Result<Page> {
        (**self).select_page(select).await
    }

    async fn find(&self, table: &TableRef, id: &str) -> crate::Result<Record> {
        (**self).find(table, id).await
    }
}
