//! An in-memory record store.
//!
//! Useful for tests and for callers that keep their lists in memory. Records
//! live behind a `tokio::sync::Mutex`; ids are assigned from 1.

use crate::group::GroupKey;
use crate::meta::OrderingMeta;
use crate::record::{OrderedRecord, RecordId};
use crate::store::{OrderingFilter, RecordStore};
use orderly_core::{OrderlyError, OrderlyResult};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<RecordId, OrderedRecord>,
    next_id: RecordId,
}

/// A [`RecordStore`] that keeps records in a map.
///
/// # Examples
///
/// ```
/// use orderly_db::memory::InMemoryStore;
/// use orderly_db::meta::OrderingMeta;
/// use orderly_db::store::RecordStore;
///
/// let store = InMemoryStore::new(OrderingMeta::new("menu_item", ["menu_id"]));
/// assert_eq!(store.meta().gap, 100);
/// ```
#[derive(Debug)]
pub struct InMemoryStore {
    meta: OrderingMeta,
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store for `meta`.
    pub fn new(meta: OrderingMeta) -> Self {
        Self {
            meta,
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.records.is_empty()
    }

    fn not_found(&self, id: RecordId) -> OrderlyError {
        OrderlyError::DoesNotExist(format!("{} matching id={id} does not exist", self.meta.db_table))
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryStore {
    fn meta(&self) -> &OrderingMeta {
        &self.meta
    }

    async fn get(&self, id: RecordId) -> OrderlyResult<OrderedRecord> {
        self.inner
            .lock()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| self.not_found(id))
    }

    async fn filter(
        &self,
        group: &GroupKey,
        filter: OrderingFilter,
    ) -> OrderlyResult<Vec<OrderedRecord>> {
        self.meta.check_group_key(group)?;
        let inner = self.inner.lock().await;
        let mut matched = Vec::new();
        for record in inner.records.values().filter(|r| &r.group_key == group) {
            let ordering = record.ordering_value()?;
            if filter.matches(ordering) {
                matched.push((ordering, record.clone()));
            }
        }
        // BTreeMap iteration is id-ascending and the sort is stable.
        matched.sort_by_key(|(ordering, _)| *ordering);
        Ok(matched.into_iter().map(|(_, r)| r).collect())
    }

    async fn max_ordering(&self, group: &GroupKey) -> OrderlyResult<Option<i64>> {
        self.meta.check_group_key(group)?;
        let inner = self.inner.lock().await;
        Ok(inner
            .records
            .values()
            .filter(|r| &r.group_key == group)
            .filter_map(|r| r.ordering)
            .max())
    }

    async fn insert(&self, record: &mut OrderedRecord) -> OrderlyResult<RecordId> {
        self.meta.check_group_key(&record.group_key)?;
        if record.is_saved() {
            return Err(OrderlyError::Usage(format!(
                "record {:?} is already saved",
                record.id
            )));
        }
        record.ordering_value()?;

        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        record.id = Some(id);
        inner.records.insert(id, record.clone());
        tracing::debug!(table = %self.meta.db_table, id, ordering = ?record.ordering, "inserted record");
        Ok(id)
    }

    async fn save(&self, record: &OrderedRecord) -> OrderlyResult<()> {
        let id = record.saved_id()?;
        let ordering = record.ordering_value()?;
        let mut inner = self.inner.lock().await;
        let stored = inner.records.get_mut(&id).ok_or_else(|| self.not_found(id))?;
        stored.ordering = Some(ordering);
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> OrderlyResult<bool> {
        Ok(self.inner.lock().await.records.remove(&id).is_some())
    }

    async fn group_keys(&self) -> OrderlyResult<Vec<GroupKey>> {
        let inner = self.inner.lock().await;
        let mut keys: Vec<GroupKey> = Vec::new();
        for record in inner.records.values() {
            if !keys.contains(&record.group_key) {
                keys.push(record.group_key.clone());
            }
        }
        Ok(keys)
    }
}
