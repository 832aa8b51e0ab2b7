//! The ordered record entity.

use crate::group::GroupKey;
use orderly_core::{OrderlyError, OrderlyResult};

/// Identifier assigned by a record store.
pub type RecordId = i64;

/// A record positioned within its group by an integer ordering key.
///
/// Smaller keys sort first. `id` is `None` until the record is inserted;
/// `ordering` is `None` until [`assign_initial_ordering`] or the caller sets it.
///
/// [`assign_initial_ordering`]: crate::ranker::OrderedGroupRanker::assign_initial_ordering
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderedRecord {
    /// Store-assigned identifier.
    pub id: Option<RecordId>,
    /// Sort key within the group; positive once assigned.
    pub ordering: Option<i64>,
    /// Values of the order-within fields.
    pub group_key: GroupKey,
}

impl OrderedRecord {
    /// Creates an unsaved record in `group_key` with no ordering.
    pub const fn new(group_key: GroupKey) -> Self {
        Self {
            id: None,
            ordering: None,
            group_key,
        }
    }

    /// Sets an explicit ordering.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: i64) -> Self {
        self.ordering = Some(ordering);
        self
    }

    /// Returns `true` once the store has assigned an id.
    pub const fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the id, or a usage error for unsaved records.
    pub fn saved_id(&self) -> OrderlyResult<RecordId> {
        self.id
            .ok_or_else(|| OrderlyError::Usage("Cannot order unsaved items.".to_string()))
    }

    /// Returns the ordering of a persisted record.
    ///
    /// Orderings are positive; a missing or non-positive value is an
    /// integrity error.
    pub fn ordering_value(&self) -> OrderlyResult<i64> {
        match self.ordering {
            Some(ordering) if ordering > 0 => Ok(ordering),
            Some(ordering) => Err(OrderlyError::IntegrityError(format!(
                "record {:?} in group ({}) has non-positive ordering {ordering}",
                self.id, self.group_key
            ))),
            None => Err(OrderlyError::IntegrityError(format!(
                "record {:?} in group ({}) has no ordering",
                self.id, self.group_key
            ))),
        }
    }
}
