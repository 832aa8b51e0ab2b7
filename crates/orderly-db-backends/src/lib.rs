//! # orderly-db-backends
//!
//! Database backends implementing [`DbExecutor`](orderly_db::DbExecutor).
//!
//! Supported backends:
//! - `SQLite` (feature `sqlite`, enabled by default)

#![allow(clippy::doc_markdown)]

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
