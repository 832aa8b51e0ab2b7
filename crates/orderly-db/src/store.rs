//! The record store interface consumed by the ranker.
//!
//! A [`RecordStore`] owns the persisted [`OrderedRecord`]s of one ordered
//! model. It answers group-scoped queries sorted by `(ordering, id)` and
//! persists single records. Two implementations ship with this crate:
//! [`InMemoryStore`](crate::memory::InMemoryStore) and
//! [`SqlRecordStore`](crate::sql_store::SqlRecordStore).

use crate::group::GroupKey;
use crate::meta::OrderingMeta;
use crate::record::{OrderedRecord, RecordId};
use orderly_core::OrderlyResult;

/// Restricts a group query by ordering value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingFilter {
    /// Every record in the group.
    All,
    /// Records with `ordering > n`.
    Above(i64),
    /// Records with `ordering < n`.
    Below(i64),
}

impl OrderingFilter {
    /// Returns `true` if a record with `ordering` passes the filter.
    pub const fn matches(self, ordering: i64) -> bool {
        match self {
            Self::All => true,
            Self::Above(n) => ordering > n,
            Self::Below(n) => ordering < n,
        }
    }
}

/// Async storage for the records of one ordered model.
///
/// Every query is scoped to a group; results are sorted by
/// `(ordering ASC, id ASC)`.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the model's ordering metadata.
    fn meta(&self) -> &OrderingMeta;

    /// Loads one record. Returns `DoesNotExist` if there is none.
    async fn get(&self, id: RecordId) -> OrderlyResult<OrderedRecord>;

    /// Returns the records of `group` passing `filter`, in group order.
    async fn filter(
        &self,
        group: &GroupKey,
        filter: OrderingFilter,
    ) -> OrderlyResult<Vec<OrderedRecord>>;

    /// Returns the largest ordering in `group`, or `None` if it is empty.
    async fn max_ordering(&self, group: &GroupKey) -> OrderlyResult<Option<i64>>;

    /// Persists a new record and writes the assigned id back into it.
    async fn insert(&self, record: &mut OrderedRecord) -> OrderlyResult<RecordId>;

    /// Persists the ordering of an existing record.
    async fn save(&self, record: &OrderedRecord) -> OrderlyResult<()>;

    /// Deletes a record. Returns `false` if it did not exist.
    async fn delete(&self, id: RecordId) -> OrderlyResult<bool>;

    /// Returns every distinct group holding at least one record.
    async fn group_keys(&self) -> OrderlyResult<Vec<GroupKey>>;
}

#[async_trait::async_trait]
impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn meta(&self) -> &OrderingMeta {
        (**self).meta()
    }

    async fn get(&self, id: RecordId) -> OrderlyResult<OrderedRecord> {
        (**self).get(id).await
    }

    async fn filter(
        &self,
        group: &GroupKey,
        filter: OrderingFilter,
    ) -> OrderlyResult<Vec<OrderedRecord>> {
        (**self).filter(group, filter).await
    }

    async fn max_ordering(&self, group: &GroupKey) -> OrderlyResult<Option<i64>> {
        (**self).max_ordering(group).await
    }

    async fn insert(&self, record: &mut OrderedRecord) -> OrderlyResult<RecordId> {
        (**self).insert(record).await
    }

    async fn save(&self, record: &OrderedRecord) -> OrderlyResult<()> {
        (**self).save(record).await
    }

    async fn delete(&self, id: RecordId) -> OrderlyResult<bool> {
        (**self).delete(id).await
    }

    async fn group_keys(&self) -> OrderlyResult<Vec<GroupKey>> {
        (**self).group_keys().await
    }
}
