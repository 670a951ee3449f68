use crate::RecordCache;

use std::{
    pin::pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tablelink_core::{
    driver::{Driver, Page, SelectPage},
    Record, Result, TableRef,
};
use tokio_stream::{Stream, StreamExt};

/// Issues remote calls on behalf of a session, counting them and routing
/// single-record lookups through the session cache.
#[derive(Debug, Clone, Copy)]
pub struct Fetcher<'a> {
    driver: &'a dyn Driver,
    cache: &'a RecordCache,
}

impl<'a> Fetcher<'a> {
    pub fn new(driver: &'a dyn Driver, cache: &'a RecordCache) -> Self {
        Self { driver, cache }
    }

    pub fn cache(&self) -> &'a RecordCache {
        self.cache
    }

    /// Reads every record of a table, in source order.
    ///
    /// The paginated select counts as one request. With `cache_too`, each
    /// record is cached as its page arrives so later lookups by id are
    /// served locally. If any page fails, the records collected so far are
    /// dropped and the error is returned.
    pub async fn select_all(&self, table: &TableRef, cache_too: bool) -> Result<Vec<Arc<Record>>> {
        self.cache.record_request();

        let limit = table
            .max_records
            .map(|max| usize::try_from(max).unwrap_or(usize::MAX));

        let mut records = vec![];
        let mut num_pages = 0;
        let mut pages = pin!(self.pages(table));

        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| err.context(format!("selecting records from {table}")))?;
            num_pages += 1;

            for record in page.records {
                let record = Arc::new(record);
                if cache_too {
                    self.cache.put(table, record.clone());
                }
                records.push(record);
            }

            if limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }
        }

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        tracing::debug!(
            %table,
            view = %table.view,
            num_pages,
            num_records = records.len(),
            cache_too,
            "selected table"
        );

        Ok(records)
    }

    /// Looks a record up by id, from the cache when possible.
    ///
    /// Concurrent lookups of the same uncached record share a single remote
    /// call; the callers that waited on it count as cache hits.
    pub async fn select_one(&self, id: &str, table: &TableRef) -> Result<Arc<Record>> {
        if let Some(record) = self.cache.get(table, id) {
            tracing::trace!(%table, id, "cache hit");
            return Ok(record);
        }

        let slot = self.cache.slot(table, id);
        let issued = AtomicBool::new(false);

        let record = slot
            .get_or_try_init(|| {
                let issued = &issued;
                async move {
                    issued.store(true, Ordering::Relaxed);
                    self.find(table, id).await
                }
            })
            .await?
            .clone();

        if !issued.load(Ordering::Relaxed) {
            tracing::trace!(%table, id, "joined in-flight lookup");
            self.cache.record_hit();
        }

        Ok(record)
    }

    async fn find(&self, table: &TableRef, id: &str) -> Result<Arc<Record>> {
        self.cache.record_request();
        tracing::debug!(%table, id, "fetching record");

        let record = self
            .driver
            .find(table, id)
            .await
            .map_err(|err| err.context(format!("finding record `{id}` in {table}")))?;

        Ok(Arc::new(record))
    }

    fn pages<'b>(&'b self, table: &'b TableRef) -> impl Stream<Item = Result<Page>> + Send + 'b {
        async_stream::try_stream! {
            let mut select = SelectPage::first(table.clone());

            loop {
                let page = self.driver.select_page(&select).await?;
                let offset = page.offset.clone();

                yield page;

                match offset {
                    Some(offset) => select = select.next(offset),
                    None => break,
                }
            }
        }
    }
}
