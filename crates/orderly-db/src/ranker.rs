//! Sparse-key ordering of records within groups.
//!
//! Every record carries an integer `ordering`; records of one group sort by
//! `(ordering, id)`. Fresh keys are spaced `gap` apart (100 by default), so
//! moving a record usually rewrites only that record: it takes the midpoint
//! of its new neighbours' keys. When two neighbours are adjacent integers
//! the group is rebalanced to `gap, 2*gap, ...` and the move is retried once.
//!
//! The ranker holds no locks. Run each operation inside
//! [`atomic`](crate::transactions::atomic) (or an equivalent scope) so the
//! read of a group and the writes that follow cannot interleave with another
//! reorder of the same group.
//!
//! # Examples
//!
//! ```
//! use orderly_db::group::GroupKey;
//! use orderly_db::memory::InMemoryStore;
//! use orderly_db::meta::OrderingMeta;
//! use orderly_db::ranker::OrderedGroupRanker;
//! use orderly_db::record::OrderedRecord;
//!
//! # tokio_test_block_on(async {
//! let store = InMemoryStore::new(OrderingMeta::new("menu_item", ["menu_id"]));
//! let ranker = OrderedGroupRanker::new(store);
//! let menu = GroupKey::new([("menu_id", 1)]);
//!
//! let mut soup = OrderedRecord::new(menu.clone());
//! let mut salad = OrderedRecord::new(menu.clone());
//! ranker.create(&mut soup).await?;
//! ranker.create(&mut salad).await?;
//! assert_eq!((soup.ordering, salad.ordering), (Some(100), Some(200)));
//!
//! ranker.move_up(&mut salad).await?;
//! assert_eq!(salad.ordering, Some(50));
//! # Ok::<(), orderly_core::OrderlyError>(())
//! # }).unwrap();
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use crate::group::GroupKey;
use crate::record::{OrderedRecord, RecordId};
use crate::store::{OrderingFilter, RecordStore};
use orderly_core::logging::operation_span;
use orderly_core::{OrderlyError, OrderlyResult};
use tracing::Instrument;

/// Where a record should end up, relative to the rest of its group.
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// Immediately after the record with this id.
    After(RecordId),
    /// At this index among the other records; past the end means last.
    Index(usize),
    /// After every other record.
    Last,
    /// One slot towards the front.
    Up,
    /// One slot towards the back.
    Down,
}

/// Maintains ordering keys for the records of one ordered model.
///
/// The store carries the model's [`OrderingMeta`](crate::meta::OrderingMeta);
/// the ranker adds no state of its own.
#[derive(Debug)]
pub struct OrderedGroupRanker<S> {
    store: S,
}

impl<S: RecordStore> OrderedGroupRanker<S> {
    /// Creates a ranker over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the ranker, returning the store.
    pub fn into_inner(self) -> S {
        self.store
    }

    fn gap(&self) -> i64 {
        self.store.meta().gap
    }

    /// Gives an unordered record the key after the current end of its group.
    ///
    /// Sets `ordering` to `max + gap`, or `gap` for an empty group. Records
    /// that already have an ordering are left alone. Nothing is persisted.
    pub async fn assign_initial_ordering(&self, record: &mut OrderedRecord) -> OrderlyResult<()> {
        if record.ordering.is_some() {
            return Ok(());
        }
        let gap = self.gap();
        let max = self.store.max_ordering(&record.group_key).await?;
        record.ordering = Some(max.map_or(gap, |m| m.saturating_add(gap)));
        Ok(())
    }

    /// Assigns an initial ordering if needed and inserts the record.
    pub async fn create(&self, record: &mut OrderedRecord) -> OrderlyResult<RecordId> {
        self.assign_initial_ordering(record).await?;
        self.store.insert(record).await
    }

    /// Returns the records of `group` in their current order.
    pub async fn group(&self, group: &GroupKey) -> OrderlyResult<Vec<OrderedRecord>> {
        self.store.filter(group, OrderingFilter::All).await
    }

    /// Moves `record` to sit immediately after `after`, or first when `after`
    /// is `None`.
    ///
    /// Both records must be saved and belong to the same group. Only
    /// `record` is written unless the group has to be rebalanced, in which
    /// case the in-memory orderings of both arguments are refreshed too.
    pub async fn reorder(
        &self,
        record: &mut OrderedRecord,
        after: Option<&mut OrderedRecord>,
    ) -> OrderlyResult<()> {
        let id = record.saved_id()?;
        let span = operation_span("reorder", &self.store.meta().db_table);
        match after {
            None => self.place(record, None, Placement::Index(0)).instrument(span).await,
            Some(after) => {
                let after_id = after.saved_id()?;
                if after.group_key != record.group_key {
                    return Err(OrderlyError::Usage(format!(
                        "Cannot reorder record {id} in group ({}) after record {after_id} in group ({})",
                        record.group_key, after.group_key
                    )));
                }
                if after_id == id {
                    return Ok(());
                }
                self.place(record, Some(after), Placement::After(after_id))
                    .instrument(span)
                    .await
            }
        }
    }

    /// Moves `record` one slot towards the front. No-op if it is first.
    pub async fn move_up(&self, record: &mut OrderedRecord) -> OrderlyResult<()> {
        record.saved_id()?;
        let span = operation_span("move_up", &self.store.meta().db_table);
        self.place(record, None, Placement::Up).instrument(span).await
    }

    /// Moves `record` one slot towards the back. No-op if it is last.
    pub async fn move_down(&self, record: &mut OrderedRecord) -> OrderlyResult<()> {
        record.saved_id()?;
        let span = operation_span("move_down", &self.store.meta().db_table);
        self.place(record, None, Placement::Down).instrument(span).await
    }

    /// Moves `record` to `index` among the other records of its group.
    ///
    /// `Some(0)` places it first. `None`, or an index past the end, places
    /// it last.
    pub async fn move_to(&self, record: &mut OrderedRecord, index: Option<usize>) -> OrderlyResult<()> {
        record.saved_id()?;
        let placement = index.map_or(Placement::Last, Placement::Index);
        let span = operation_span("move_to", &self.store.meta().db_table);
        self.place(record, None, placement).instrument(span).await
    }

    /// Rewrites the orderings of `group` to `gap, 2*gap, ...` in current order.
    ///
    /// Only records whose value changes are saved. Records in
    /// `records_to_sync` are matched by id and get their in-memory ordering
    /// updated. Returns the number of records rewritten.
    pub async fn rebalance(
        &self,
        group: &GroupKey,
        records_to_sync: &mut [&mut OrderedRecord],
    ) -> OrderlyResult<usize> {
        let gap = self.gap();
        let records = self.store.filter(group, OrderingFilter::All).await?;

        let mut rewritten = 0;
        let mut next = 0_i64;
        for mut record in records {
            next = next.checked_add(gap).ok_or_else(|| {
                OrderlyError::DatabaseError(format!("ordering overflow rebalancing group ({group})"))
            })?;
            if record.ordering != Some(next) {
                record.ordering = Some(next);
                self.store.save(&record).await?;
                rewritten += 1;
            }
            if let Some(synced) = records_to_sync
                .iter_mut()
                .find(|r| r.id.is_some() && r.id == record.id)
            {
                synced.ordering = Some(next);
            }
        }

        tracing::info!(
            table = %self.store.meta().db_table,
            group = %group,
            rewritten,
            "rebalanced group"
        );
        Ok(rewritten)
    }

    /// Rebalances every group in the store. Returns the number of groups.
    pub async fn rebalance_all_groups(&self) -> OrderlyResult<usize> {
        let groups = self.store.group_keys().await?;
        for group in &groups {
            self.rebalance(group, &mut []).await?;
        }
        tracing::info!(
            table = %self.store.meta().db_table,
            groups = groups.len(),
            "rebalanced all groups"
        );
        Ok(groups.len())
    }

    /// Moves `record` according to `placement`, rebalancing at most once.
    async fn place(
        &self,
        record: &mut OrderedRecord,
        mut after: Option<&mut OrderedRecord>,
        placement: Placement,
    ) -> OrderlyResult<()> {
        let id = record.saved_id()?;
        let gap = self.gap();
        let mut rebalanced = false;

        loop {
            let (others, current) = self.siblings(record, id).await?;
            let new_idx = match Self::target_index(placement, &others, current) {
                Ok(idx) => idx,
                Err(anchor) => return Err(self.missing_anchor(anchor).await),
            };
            if new_idx == current {
                tracing::debug!(id, index = current, "record already in place");
                return Ok(());
            }

            let pre = match new_idx.checked_sub(1) {
                Some(prev) => others[prev].ordering_value()?,
                None => 0,
            };
            let post = match others.get(new_idx) {
                Some(next) => next.ordering_value()?,
                None => pre.saturating_add(gap.saturating_mul(2)),
            };

            let room = post.checked_sub(pre).unwrap_or(0);
            if room <= 1 {
                if rebalanced {
                    return Err(OrderlyError::DatabaseError(format!(
                        "no room between orderings {pre} and {post} after rebalancing group ({}); \
                         the group was modified concurrently",
                        record.group_key
                    )));
                }
                let group = record.group_key.clone();
                let mut sync: Vec<&mut OrderedRecord> = vec![&mut *record];
                if let Some(anchor) = after.as_deref_mut() {
                    sync.push(anchor);
                }
                self.rebalance(&group, &mut sync).await?;
                rebalanced = true;
                continue;
            }

            let ordering = pre + room / 2;
            record.ordering = Some(ordering);
            self.store.save(record).await?;
            tracing::debug!(id, from = current, to = new_idx, ordering, "moved record");
            return Ok(());
        }
    }

    /// Reads the record's group and splits out the record itself.
    ///
    /// Returns the other records in group order and the record's index.
    async fn siblings(
        &self,
        record: &OrderedRecord,
        id: RecordId,
    ) -> OrderlyResult<(Vec<OrderedRecord>, usize)> {
        let mut others = self.store.filter(&record.group_key, OrderingFilter::All).await?;
        let Some(current) = others.iter().position(|r| r.id == Some(id)) else {
            // Surface a missing record as DoesNotExist before blaming the group.
            let stored = self.store.get(id).await?;
            return Err(OrderlyError::Usage(format!(
                "record {id} belongs to group ({}), not ({})",
                stored.group_key, record.group_key
            )));
        };
        others.remove(current);
        Ok((others, current))
    }

    /// Returns the record's new index among `others`, or the anchor id of
    /// [`Placement::After`] when that anchor is not among them.
    fn target_index(
        placement: Placement,
        others: &[OrderedRecord],
        current: usize,
    ) -> Result<usize, RecordId> {
        Ok(match placement {
            Placement::After(anchor) => {
                others
                    .iter()
                    .position(|r| r.id == Some(anchor))
                    .ok_or(anchor)?
                    + 1
            }
            Placement::Index(idx) => idx.min(others.len()),
            Placement::Last => others.len(),
            Placement::Up => current.saturating_sub(1),
            Placement::Down => (current + 1).min(others.len()),
        })
    }

    /// Explains why `anchor` was not found in the record's group.
    ///
    /// A deleted anchor surfaces as the store's `DoesNotExist`.
    async fn missing_anchor(&self, anchor: RecordId) -> OrderlyError {
        match self.store.get(anchor).await {
            Err(err) => err,
            Ok(_) => OrderlyError::Usage(format!(
                "record {anchor} is not in the same group; the records belong to different lists"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::meta::OrderingMeta;

    fn ranker() -> OrderedGroupRanker<InMemoryStore> {
        OrderedGroupRanker::new(InMemoryStore::new(OrderingMeta::new(
            "menu_item",
            ["menu_id"],
        )))
    }

    fn menu(id: i64) -> GroupKey {
        GroupKey::new([("menu_id", id)])
    }

    async fn create_n(ranker: &OrderedGroupRanker<InMemoryStore>, group: i64, n: usize) -> Vec<OrderedRecord> {
        let mut records = Vec::with_capacity(n);
        for _ in 0..n {
            let mut record = OrderedRecord::new(menu(group));
            ranker.create(&mut record).await.unwrap();
            records.push(record);
        }
        records
    }

    async fn create_with(
        ranker: &OrderedGroupRanker<InMemoryStore>,
        group: i64,
        orderings: &[i64],
    ) -> Vec<OrderedRecord> {
        let mut records = Vec::with_capacity(orderings.len());
        for &ordering in orderings {
            let mut record = OrderedRecord::new(menu(group)).with_ordering(ordering);
            ranker.create(&mut record).await.unwrap();
            records.push(record);
        }
        records
    }

    async fn order_of(ranker: &OrderedGroupRanker<InMemoryStore>, group: i64) -> Vec<RecordId> {
        ranker
            .group(&menu(group))
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect()
    }

    async fn orderings_of(ranker: &OrderedGroupRanker<InMemoryStore>, group: i64) -> Vec<i64> {
        ranker
            .group(&menu(group))
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.ordering)
            .collect()
    }

    fn ids(records: &[OrderedRecord]) -> Vec<RecordId> {
        records.iter().filter_map(|r| r.id).collect()
    }

    // ── Initial ordering ────────────────────────────────────────────

    #[tokio::test]
    async fn test_creation_order_spaced_by_gap() {
        let ranker = ranker();
        let records = create_n(&ranker, 1, 4).await;
        let orderings: Vec<_> = records.iter().filter_map(|r| r.ordering).collect();
        assert_eq!(orderings, vec![100, 200, 300, 400]);
        assert_eq!(order_of(&ranker, 1).await, ids(&records));
    }

    #[tokio::test]
    async fn test_initial_ordering_is_per_group() {
        let ranker = ranker();
        create_n(&ranker, 1, 3).await;
        let other = create_n(&ranker, 2, 1).await;
        assert_eq!(other[0].ordering, Some(100));
    }

    #[tokio::test]
    async fn test_initial_ordering_follows_max() {
        let ranker = ranker();
        create_with(&ranker, 1, &[730]).await;
        let next = create_n(&ranker, 1, 1).await;
        assert_eq!(next[0].ordering, Some(830));
    }

    #[tokio::test]
    async fn test_explicit_ordering_kept() {
        let ranker = ranker();
        let mut record = OrderedRecord::new(menu(1)).with_ordering(42);
        ranker.assign_initial_ordering(&mut record).await.unwrap();
        assert_eq!(record.ordering, Some(42));
        assert!(record.id.is_none());
    }

    #[tokio::test]
    async fn test_custom_gap() {
        let ranker = OrderedGroupRanker::new(InMemoryStore::new(
            OrderingMeta::new("page", Vec::<String>::new()).with_gap(10),
        ));
        let mut a = OrderedRecord::new(GroupKey::empty());
        let mut b = OrderedRecord::new(GroupKey::empty());
        ranker.create(&mut a).await.unwrap();
        ranker.create(&mut b).await.unwrap();
        assert_eq!((a.ordering, b.ordering), (Some(10), Some(20)));

        ranker.reorder(&mut b, None).await.unwrap();
        assert_eq!(b.ordering, Some(5));
    }

    // ── reorder ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_reorder_after_takes_midpoint() {
        let ranker = ranker();
        let mut r = create_with(&ranker, 1, &[5, 7, 9]).await;
        let (first, rest) = r.split_at_mut(1);
        ranker
            .reorder(&mut first[0], Some(&mut rest[0]))
            .await
            .unwrap();
        assert_eq!(first[0].ordering, Some(8));
        assert_eq!(orderings_of(&ranker, 1).await, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_reorder_to_front() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        ranker.reorder(&mut r[2], None).await.unwrap();
        assert_eq!(r[2].ordering, Some(50));
        assert_eq!(order_of(&ranker, 1).await, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_reorder_after_last_uses_double_gap() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        let (head, tail) = r.split_at_mut(2);
        ranker.reorder(&mut head[0], Some(&mut tail[0])).await.unwrap();
        // pre = 300, post = 300 + 2 * 100
        assert_eq!(head[0].ordering, Some(400));
        assert_eq!(order_of(&ranker, 1).await, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_reorder_self_is_noop() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        let mut same = r[1].clone();
        ranker.reorder(&mut r[1], Some(&mut same)).await.unwrap();
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn test_reorder_after_predecessor_is_noop() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        let (head, tail) = r.split_at_mut(2);
        ranker.reorder(&mut tail[0], Some(&mut head[1])).await.unwrap();
        ranker.reorder(&mut head[0], None).await.unwrap();
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn test_reorder_round_trip_restores_order() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 4).await;
        let before = order_of(&ranker, 1).await;

        let (head, tail) = r.split_at_mut(3);
        ranker.reorder(&mut head[1], Some(&mut tail[0])).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![1, 3, 4, 2]);

        let (head, _) = r.split_at_mut(2);
        let (a, b) = head.split_at_mut(1);
        ranker.reorder(&mut b[0], Some(&mut a[0])).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, before);
    }

    #[tokio::test]
    async fn test_reorder_across_groups_rejected() {
        let ranker = ranker();
        let mut a = create_n(&ranker, 1, 2).await;
        let mut b = create_n(&ranker, 2, 1).await;
        let err = ranker.reorder(&mut a[0], Some(&mut b[0])).await.unwrap_err();
        assert!(err.is_usage());
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200]);
        assert_eq!(orderings_of(&ranker, 2).await, vec![100]);
    }

    #[tokio::test]
    async fn test_reorder_after_record_from_other_list_rejected() {
        let ranker = ranker();
        let mut a = create_n(&ranker, 1, 2).await;
        let mut b = create_n(&ranker, 2, 1).await;
        // Same group key in memory, but the store disagrees.
        b[0].group_key = menu(1);
        let err = ranker.reorder(&mut a[0], Some(&mut b[0])).await.unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("different lists"));
    }

    #[tokio::test]
    async fn test_reorder_unsaved_rejected() {
        let ranker = ranker();
        let mut saved = create_n(&ranker, 1, 1).await;
        let mut unsaved = OrderedRecord::new(menu(1)).with_ordering(10);

        let err = ranker.reorder(&mut unsaved, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Usage error: Cannot order unsaved items.");
        assert!(ranker
            .reorder(&mut saved[0], Some(&mut unsaved))
            .await
            .unwrap_err()
            .is_usage());
        assert!(ranker.move_up(&mut unsaved).await.is_err());
        assert!(ranker.move_down(&mut unsaved).await.is_err());
        assert!(ranker.move_to(&mut unsaved, None).await.is_err());
    }

    #[tokio::test]
    async fn test_reorder_deleted_record_not_found() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 2).await;
        ranker.store().delete(1).await.unwrap();
        let err = ranker.reorder(&mut r[0], None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reorder_after_deleted_anchor_not_found() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        ranker.store().delete(2).await.unwrap();
        let (first, rest) = r.split_at_mut(1);
        let err = ranker.reorder(&mut first[0], Some(&mut rest[0])).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 300]);
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_ordering() {
        let ranker = ranker();
        for ordering in [0, i64::MIN] {
            let mut record = OrderedRecord::new(menu(1)).with_ordering(ordering);
            let err = ranker.create(&mut record).await.unwrap_err();
            assert!(matches!(err, OrderlyError::IntegrityError(_)));
        }
        assert!(ranker.group(&menu(1)).await.unwrap().is_empty());
    }

    // ── Gap exhaustion ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_reorder_after_max_ordering_rebalances() {
        let ranker = ranker();
        let mut r = create_with(&ranker, 1, &[5, i64::MAX]).await;
        let (first, rest) = r.split_at_mut(1);
        ranker.reorder(&mut first[0], Some(&mut rest[0])).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![2, 1]);
        assert_eq!(orderings_of(&ranker, 1).await, vec![200, 300]);
        assert_eq!(first[0].ordering, Some(300));
    }

    #[tokio::test]
    async fn test_exhausted_gap_rebalances_then_moves() {
        let ranker = ranker();
        let mut r = create_with(&ranker, 1, &[5, 6, 7]).await;
        let (first, rest) = r.split_at_mut(1);
        ranker.reorder(&mut first[0], Some(&mut rest[0])).await.unwrap();

        assert_eq!(order_of(&ranker, 1).await, vec![2, 1, 3]);
        let stored = orderings_of(&ranker, 1).await;
        assert_eq!(stored[0] % 100, 0);
        assert_eq!(stored[2] % 100, 0);
        assert!(stored[0] < stored[1] && stored[1] < stored[2]);
        assert_eq!(stored, vec![200, 250, 300]);

        // Both arguments were refreshed in memory.
        assert_eq!(first[0].ordering, Some(250));
        assert_eq!(rest[0].ordering, Some(200));
    }

    #[tokio::test]
    async fn test_colliding_orderings_are_separated() {
        let ranker = ranker();
        let mut r = create_with(&ranker, 1, &[100, 100, 100]).await;
        let (first, rest) = r.split_at_mut(1);
        ranker.reorder(&mut first[0], Some(&mut rest[0])).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![2, 1, 3]);
        assert_eq!(orderings_of(&ranker, 1).await, vec![200, 250, 300]);
    }

    // ── move_up / move_down ─────────────────────────────────────────

    #[tokio::test]
    async fn test_move_up_walks_to_front() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 5).await;
        let mut seen = Vec::new();
        for _ in 0..5 {
            ranker.move_up(&mut r[4]).await.unwrap();
            seen.push(r[4].ordering.unwrap());
        }
        assert_eq!(seen, vec![350, 250, 150, 50, 50]);
        assert_eq!(order_of(&ranker, 1).await, vec![5, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_move_down_walks_to_back() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 5).await;
        let mut seen = Vec::new();
        for _ in 0..5 {
            ranker.move_down(&mut r[0]).await.unwrap();
            seen.push(r[0].ordering.unwrap());
        }
        assert_eq!(seen, vec![250, 350, 450, 600, 600]);
        assert_eq!(order_of(&ranker, 1).await, vec![2, 3, 4, 5, 1]);
    }

    #[tokio::test]
    async fn test_boundary_moves_are_noops() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        ranker.move_up(&mut r[0]).await.unwrap();
        ranker.move_down(&mut r[2]).await.unwrap();
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200, 300]);

        let mut single = create_n(&ranker, 2, 1).await;
        ranker.move_up(&mut single[0]).await.unwrap();
        ranker.move_down(&mut single[0]).await.unwrap();
        assert_eq!(orderings_of(&ranker, 2).await, vec![100]);
    }

    #[tokio::test]
    async fn test_move_up_with_adjacent_keys_rebalances() {
        let ranker = ranker();
        let mut r = create_with(&ranker, 1, &[1, 2, 3]).await;
        ranker.move_up(&mut r[2]).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![1, 3, 2]);
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 150, 200]);
    }

    // ── move_to ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_move_to_index() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 4).await;
        ranker.move_to(&mut r[0], Some(2)).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![2, 3, 1, 4]);
        assert_eq!(r[0].ordering, Some(350));

        ranker.move_to(&mut r[3], Some(0)).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![4, 2, 3, 1]);
    }

    #[tokio::test]
    async fn test_move_to_end_and_clamping() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        ranker.move_to(&mut r[0], None).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![2, 3, 1]);
        assert_eq!(r[0].ordering, Some(400));

        ranker.move_to(&mut r[1], Some(99)).await.unwrap();
        assert_eq!(order_of(&ranker, 1).await, vec![3, 1, 2]);

        let before = orderings_of(&ranker, 1).await;
        ranker.move_to(&mut r[1], None).await.unwrap();
        assert_eq!(orderings_of(&ranker, 1).await, before);
    }

    #[tokio::test]
    async fn test_move_to_current_index_is_noop() {
        let ranker = ranker();
        let mut r = create_n(&ranker, 1, 3).await;
        ranker.move_to(&mut r[1], Some(1)).await.unwrap();
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200, 300]);
    }

    // ── rebalance ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_rebalance_preserves_order() {
        let ranker = ranker();
        let mut r = create_with(&ranker, 1, &[7, 3, 3, 900]).await;
        let before = order_of(&ranker, 1).await;
        assert_eq!(before, vec![2, 3, 1, 4]);

        let (head, _) = r.split_at_mut(1);
        let mut sync = vec![&mut head[0]];
        let rewritten = ranker.rebalance(&menu(1), &mut sync).await.unwrap();
        assert_eq!(rewritten, 4);
        assert_eq!(r[0].ordering, Some(300));

        assert_eq!(order_of(&ranker, 1).await, before);
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200, 300, 400]);
    }

    #[tokio::test]
    async fn test_rebalance_skips_unchanged_rows() {
        let ranker = ranker();
        create_with(&ranker, 1, &[100, 200, 250]).await;
        let rewritten = ranker.rebalance(&menu(1), &mut []).await.unwrap();
        assert_eq!(rewritten, 1);
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn test_rebalance_empty_group() {
        let ranker = ranker();
        assert_eq!(ranker.rebalance(&menu(9), &mut []).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rebalance_all_groups() {
        let ranker = ranker();
        create_with(&ranker, 1, &[5, 6]).await;
        create_with(&ranker, 2, &[40, 10, 20]).await;
        assert_eq!(ranker.rebalance_all_groups().await.unwrap(), 2);
        assert_eq!(orderings_of(&ranker, 1).await, vec![100, 200]);
        assert_eq!(orderings_of(&ranker, 2).await, vec![100, 200, 300]);
        assert_eq!(order_of(&ranker, 2).await, vec![4, 5, 3]);
    }

    #[tokio::test]
    async fn test_rebalance_all_groups_empty_store() {
        assert_eq!(ranker().rebalance_all_groups().await.unwrap(), 0);
    }
}
