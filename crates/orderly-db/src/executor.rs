//! Database executor trait.
//!
//! [`DbExecutor`] is the minimal async interface the SQL record store needs
//! from a database. Backends in `orderly-db-backends` implement it, and so
//! does [`TransactionManager`](crate::transactions::TransactionManager), which
//! lets a store run unchanged inside an [`atomic`](crate::transactions::atomic)
//! block.

use crate::row::Row;
use crate::value::Value;
use orderly_core::{OrderlyError, OrderlyResult};

/// Minimal async database executor trait.
#[async_trait::async_trait]
pub trait DbExecutor: Send + Sync {
    /// Returns the vendor name (e.g. "sqlite").
    fn vendor(&self) -> &str;

    /// Runs a SQL statement that does not return rows.
    /// Returns the number of rows affected.
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> OrderlyResult<u64>;

    /// Runs a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> OrderlyResult<Vec<Row>>;

    /// Runs a SQL query and returns exactly one row.
    /// Returns `DoesNotExist` if no rows, `MultipleObjectsReturned` if more than one.
    async fn query_one(&self, sql: &str, params: &[Value]) -> OrderlyResult<Row> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            0 => Err(OrderlyError::DoesNotExist("No rows returned".to_string())),
            1 => Ok(rows.remove(0)),
            n => Err(OrderlyError::MultipleObjectsReturned(format!(
                "Expected 1 row, got {n}"
            ))),
        }
    }

    /// Executes an INSERT and returns the last inserted row ID.
    ///
    /// The default runs the statement and then asks for `last_insert_rowid()`,
    /// which is only correct when both run on the same connection.
    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> OrderlyResult<i64> {
        self.execute_sql(sql, params).await?;
        let row = self.query_one("SELECT last_insert_rowid() AS id", &[]).await?;
        row.get::<i64>("id")
    }
}
