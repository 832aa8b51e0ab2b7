//! # orderly
//!
//! Sparse integer ordering keys for records partitioned into groups.
//!
//! This is the meta-crate that re-exports the workspace crates. Depend on
//! `orderly` to get everything, or on individual crates for finer-grained
//! control.
//!
//! ```
//! use orderly::db::{GroupKey, InMemoryStore, OrderedGroupRanker, OrderedRecord, OrderingMeta};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let ranker = OrderedGroupRanker::new(InMemoryStore::new(OrderingMeta::new("todo", ["list_id"])));
//! let list = GroupKey::new([("list_id", 1)]);
//! let mut first = OrderedRecord::new(list.clone());
//! let mut second = OrderedRecord::new(list.clone());
//! ranker.create(&mut first).await?;
//! ranker.create(&mut second).await?;
//!
//! ranker.reorder(&mut second, None).await?;
//! let ids: Vec<_> = ranker.group(&list).await?.iter().filter_map(|r| r.id).collect();
//! assert_eq!(ids, vec![2, 1]);
//! # Ok::<(), orderly::core::OrderlyError>(())
//! # }).unwrap();
//! ```

/// Error type, settings, and logging setup.
pub use orderly_core as core;

/// Ordered records, record stores, transactions and the group ranker.
#[cfg(feature = "db")]
pub use orderly_db as db;

/// Database backends (`SQLite`).
#[cfg(feature = "sqlite")]
pub use orderly_db_backends as db_backends;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use orderly_cli as cli;
