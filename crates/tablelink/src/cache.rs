//! Session-scoped record cache.
//!
//! Records are keyed by base, table and record id. Entries are never
//! evicted; a cache lives exactly as long as the session that owns it.

use crate::Stats;

use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tablelink_core::{Record, RecordKey, TableRef};
use tokio::sync::OnceCell;

/// A cache slot. Concurrent lookups of the same key share one slot so a
/// record is fetched at most once.
pub(crate) type Slot = Arc<OnceCell<Arc<Record>>>;

#[derive(Debug, Default)]
pub struct RecordCache {
    records: DashMap<RecordKey, Slot>,

    /// Remote calls issued, counted by the fetcher
    requests: AtomicU64,

    /// Lookups answered without a remote call
    cache_hits: AtomicU64,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record, counting a cache hit when there is one.
    pub fn get(&self, table: &TableRef, id: &str) -> Option<Arc<Record>> {
        let record = self
            .records
            .get(&RecordKey::new(table, id))
            .and_then(|slot| slot.value().get().cloned())?;

        self.record_hit();
        Some(record)
    }

    /// Stores a record under its own id, replacing any earlier entry.
    pub fn put(&self, table: &TableRef, record: Arc<Record>) {
        let key = RecordKey::new(table, &record.id);
        self.records.insert(key, Arc::new(OnceCell::from(record)));
    }

    /// Returns the slot for a key, creating an empty one if needed.
    pub(crate) fn slot(&self, table: &TableRef, id: &str) -> Slot {
        self.records
            .entry(RecordKey::new(table, id))
            .or_default()
            .clone()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            requests: self.requests(),
            cache_hits: self.cache_hits(),
        }
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
