//! Group keys: the values of a record's order-within fields.

use std::fmt;

use crate::value::Value;
use orderly_core::{OrderlyError, OrderlyResult};

/// Identifies one independently ordered partition of a table.
///
/// A `GroupKey` is an ordered list of `(field, value)` pairs, one per
/// order-within field of the model. Two records can only be reordered
/// relative to each other when their keys are equal. The empty key is the
/// single group of a model without order-within fields.
///
/// Boolean values are stored as integers so a key read back from a backend
/// without a boolean type still compares equal to the one the caller built.
///
/// # Examples
///
/// ```
/// use orderly_db::group::GroupKey;
/// use orderly_db::value::Value;
///
/// let key = GroupKey::new([("menu_id", 5)]);
/// assert_eq!(key.get("menu_id"), Some(&Value::Int(5)));
/// assert_eq!(key.to_string(), "menu_id=5");
/// ```
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct GroupKey(Vec<(String, Value)>);

impl GroupKey {
    /// Builds a key from `(field, value)` pairs.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), canonical(v.into())))
                .collect(),
        )
    }

    /// The key of a model without order-within fields.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parses `field=value` assignments, as given on the command line.
    ///
    /// Values go through [`Value::parse_literal`].
    pub fn parse_assignments<S: AsRef<str>>(items: &[S]) -> OrderlyResult<Self> {
        items
            .iter()
            .map(|item| {
                let item = item.as_ref();
                item.split_once('=')
                    .filter(|(field, _)| !field.trim().is_empty())
                    .map(|(field, value)| (field.trim(), Value::parse_literal(value.trim())))
                    .ok_or_else(|| {
                        OrderlyError::Usage(format!(
                            "Invalid group assignment '{item}': expected field=value"
                        ))
                    })
            })
            .collect::<OrderlyResult<Vec<_>>>()
            .map(Self::new)
    }

    /// Returns the value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    /// Iterates over the field names in key order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(f, _)| f.as_str())
    }

    /// Iterates over the values in key order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    /// Returns the number of fields in the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<all>");
        }
        for (i, (field, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}={value}")?;
        }
        Ok(())
    }
}

fn canonical(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::Int(i64::from(b)),
        other => other,
    }
}
