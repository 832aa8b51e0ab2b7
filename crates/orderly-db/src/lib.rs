//! # orderly-db
//!
//! Ordered records and the ranker that keeps them in order. An
//! [`OrderedGroupRanker`](ranker::OrderedGroupRanker) maintains sparse integer
//! ordering keys for records partitioned into groups, on top of any
//! [`RecordStore`](store::RecordStore).
//!
//! ## Architecture
//!
//! The ranker never touches a database directly. It reads a group through
//! the store, computes a new key from the neighbours of the target slot and
//! saves the moved record. [`SqlRecordStore`](sql_store::SqlRecordStore)
//! turns those calls into SQL for a [`DbExecutor`](executor::DbExecutor);
//! [`InMemoryStore`](memory::InMemoryStore) keeps records in a map.
//!
//! ## Module Overview
//!
//! - [`ranker`] - The [`OrderedGroupRanker`](ranker::OrderedGroupRanker)
//! - [`store`] - The [`RecordStore`](store::RecordStore) trait
//! - [`memory`] - In-memory store
//! - [`sql_store`] - SQL store over a [`DbExecutor`](executor::DbExecutor)
//! - [`meta`], [`group`], [`record`] - Model metadata, group keys and records
//! - [`executor`], [`transactions`] - Database executor trait and `atomic`
//! - [`value`], [`row`] - Backend-agnostic values and result rows

// - doc_markdown: backtick requirements for documentation items are too strict
// - significant_drop_tightening: false positives with async Mutex guards
// - missing_const_for_fn: async trait plumbing makes most suggestions moot
#![allow(clippy::doc_markdown)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_const_for_fn)]

pub mod executor;
pub mod group;
pub mod memory;
pub mod meta;
pub mod ranker;
pub mod record;
pub mod row;
pub mod sql_store;
pub mod store;
pub mod transactions;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use executor::DbExecutor;
pub use group::GroupKey;
pub use memory::InMemoryStore;
pub use meta::OrderingMeta;
pub use ranker::OrderedGroupRanker;
pub use record::{OrderedRecord, RecordId};
pub use row::{FromValue, Row};
pub use sql_store::SqlRecordStore;
pub use store::{OrderingFilter, RecordStore};
pub use transactions::{atomic, TransactionManager};
pub use value::Value;
