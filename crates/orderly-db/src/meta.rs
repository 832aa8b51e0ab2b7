//! Per-model ordering metadata.
//!
//! [`OrderingMeta`] is the static configuration of an ordered model: where
//! its records live, which fields partition it into groups, and the spacing
//! between ordering keys.

use crate::group::GroupKey;
use crate::value::Value;
use orderly_core::settings::{OrderedModelSettings, Settings, DEFAULT_ORDERING_GAP};
use orderly_core::{OrderlyError, OrderlyResult};

/// Metadata describing one ordered model.
///
/// # Examples
///
/// ```
/// use orderly_db::meta::OrderingMeta;
///
/// let meta = OrderingMeta::new("menu_item", ["menu_id"]);
/// assert_eq!(meta.gap, 100);
/// let key = meta.group_key([5]).unwrap();
/// assert_eq!(key.to_string(), "menu_id=5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderingMeta {
    /// The table (or collection) holding the records.
    pub db_table: String,
    /// The fields whose values identify a group, in key order.
    pub order_within_fields: Vec<String>,
    /// Spacing between consecutive ordering keys.
    pub gap: i64,
}

impl OrderingMeta {
    /// Creates metadata with the default gap.
    pub fn new<S: Into<String>>(
        db_table: impl Into<String>,
        order_within_fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            db_table: db_table.into(),
            order_within_fields: order_within_fields.into_iter().map(Into::into).collect(),
            gap: DEFAULT_ORDERING_GAP,
        }
    }

    /// Sets the gap.
    ///
    /// # Panics
    ///
    /// Panics if `gap` is less than 2; a midpoint needs at least one free integer.
    #[must_use]
    pub fn with_gap(mut self, gap: i64) -> Self {
        assert!(gap >= 2, "ordering gap must be at least 2, got {gap}");
        self.gap = gap;
        self
    }

    /// Builds metadata from a model declared in settings.
    pub fn from_settings(label: &str, settings: &Settings) -> OrderlyResult<Self> {
        let model: &OrderedModelSettings = settings.ordered_model(label).ok_or_else(|| {
            OrderlyError::ConfigurationError(format!("Unknown ordered model '{label}'"))
        })?;
        Ok(Self {
            db_table: model.db_table.clone(),
            order_within_fields: model.order_within_fields.clone(),
            gap: settings.gap_for(model),
        })
    }

    /// Builds a group key by pairing `values` with the order-within fields.
    pub fn group_key<V: Into<Value>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> OrderlyResult<GroupKey> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != self.order_within_fields.len() {
            return Err(OrderlyError::Usage(format!(
                "'{}' is ordered within {} field(s), got {} value(s)",
                self.db_table,
                self.order_within_fields.len(),
                values.len()
            )));
        }
        Ok(GroupKey::new(
            self.order_within_fields.iter().map(String::as_str).zip(values),
        ))
    }

    /// Rearranges `key` into order-within field order.
    ///
    /// Used for keys assembled from `field=value` assignments given in any
    /// order. Every field must be present exactly once and no other field
    /// may appear.
    pub fn align_group_key(&self, key: &GroupKey) -> OrderlyResult<GroupKey> {
        if let Some(unknown) = key
            .fields()
            .find(|f| !self.order_within_fields.iter().any(|o| o == f))
        {
            return Err(OrderlyError::Usage(format!(
                "'{}' is not an order-within field of '{}'",
                unknown, self.db_table
            )));
        }
        if key.len() != self.order_within_fields.len() {
            return Err(OrderlyError::Usage(format!(
                "Group ({key}) must give exactly one value for each of [{}]",
                self.order_within_fields.join(", ")
            )));
        }
        let mut values = Vec::with_capacity(key.len());
        for field in &self.order_within_fields {
            let value = key.get(field).ok_or_else(|| {
                OrderlyError::Usage(format!("Missing group value for '{field}'"))
            })?;
            values.push(value.clone());
        }
        self.group_key(values)
    }

    /// Checks that `key` names exactly the order-within fields, in order.
    pub fn check_group_key(&self, key: &GroupKey) -> OrderlyResult<()> {
        if key.fields().eq(self.order_within_fields.iter().map(String::as_str)) {
            Ok(())
        } else {
            Err(OrderlyError::Usage(format!(
                "Group key ({key}) does not match the order-within fields [{}] of '{}'",
                self.order_within_fields.join(", "),
                self.db_table
            )))
        }
    }
}
