//! Transaction support.
//!
//! Ranker operations read a group's orderings and then write new ones; the
//! read and the writes must be atomic with respect to other reorders of the
//! same group. The ranker does no locking itself, so callers run each
//! operation inside [`atomic()`].
//!
//! Transactions are managed through the [`TransactionManager`] which wraps a
//! [`DbExecutor`] and tracks nesting depth. Nested `begin` calls create
//! savepoints rather than nested transactions.
//!
//! # Examples
//!
//! ```ignore
//! use orderly_db::transactions::atomic;
//!
//! atomic(&backend, |txn| async move {
//!     let store = SqlRecordStore::new(txn.as_ref(), meta);
//!     OrderedGroupRanker::new(store).move_up(&mut item).await
//! })
//! .await?;
//! ```

use crate::executor::DbExecutor;
use crate::row::Row;
use crate::value::Value;
use orderly_core::{OrderlyError, OrderlyResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Counter for generating unique savepoint names.
static SAVEPOINT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A named savepoint on the open-savepoint stack.
#[derive(Debug, Clone)]
pub struct Savepoint {
    /// The unique name of this savepoint.
    pub name: String,
}

impl Savepoint {
    /// Creates a new savepoint with an auto-generated unique name.
    pub fn new() -> Self {
        let id = SAVEPOINT_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            name: format!("sp_{id}"),
        }
    }
}

impl Default for Savepoint {
    fn default() -> Self {
        Self::new()
    }
}

/// A list of callbacks to be executed after a transaction commits.
type OnCommitCallbacks = Vec<Box<dyn FnOnce() + Send + 'static>>;

/// Manages transaction state for a database connection.
pub struct TransactionManager<'a> {
    db: &'a dyn DbExecutor,
    /// 0 = no transaction, 1 = outermost, 2+ = savepoint.
    depth: Mutex<u32>,
    savepoints: Mutex<Vec<Savepoint>>,
    on_commit_callbacks: Mutex<OnCommitCallbacks>,
}

impl<'a> TransactionManager<'a> {
    /// Creates a new transaction manager for the given executor.
    pub fn new(db: &'a dyn DbExecutor) -> Self {
        Self {
            db,
            depth: Mutex::new(0),
            savepoints: Mutex::new(Vec::new()),
            on_commit_callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current transaction nesting depth.
    pub async fn depth(&self) -> u32 {
        *self.depth.lock().await
    }

    /// Begins a new transaction or creates a savepoint if already in one.
    pub async fn begin(&self) -> OrderlyResult<()> {
        let mut depth = self.depth.lock().await;
        if *depth == 0 {
            self.db.execute_sql("BEGIN", &[]).await?;
        } else {
            let sp = Savepoint::new();
            let sql = format!("SAVEPOINT {}", sp.name);
            self.db.execute_sql(&sql, &[]).await?;
            self.savepoints.lock().await.push(sp);
        }
        *depth += 1;
        tracing::trace!(depth = *depth, "transaction begin");
        Ok(())
    }

    /// Commits the current transaction or releases the current savepoint.
    pub async fn commit(&self) -> OrderlyResult<()> {
        let mut depth = self.depth.lock().await;
        if *depth == 0 {
            return Err(OrderlyError::DatabaseError(
                "Cannot commit: not in a transaction".to_string(),
            ));
        }

        if *depth == 1 {
            self.db.execute_sql("COMMIT", &[]).await?;
            *depth = 0;

            let callbacks: OnCommitCallbacks =
                std::mem::take(&mut *self.on_commit_callbacks.lock().await);
            for cb in callbacks {
                cb();
            }
        } else {
            let mut savepoints = self.savepoints.lock().await;
            if let Some(sp) = savepoints.pop() {
                let sql = format!("RELEASE SAVEPOINT {}", sp.name);
                self.db.execute_sql(&sql, &[]).await?;
            }
            *depth -= 1;
        }

        Ok(())
    }

    /// Rolls back the current transaction or savepoint.
    pub async fn rollback(&self) -> OrderlyResult<()> {
        let mut depth = self.depth.lock().await;
        if *depth == 0 {
            return Err(OrderlyError::DatabaseError(
                "Cannot rollback: not in a transaction".to_string(),
            ));
        }

        if *depth == 1 {
            self.db.execute_sql("ROLLBACK", &[]).await?;
            *depth = 0;
            self.on_commit_callbacks.lock().await.clear();
        } else {
            let mut savepoints = self.savepoints.lock().await;
            if let Some(sp) = savepoints.pop() {
                let sql = format!("ROLLBACK TO SAVEPOINT {}", sp.name);
                self.db.execute_sql(&sql, &[]).await?;
            }
            *depth -= 1;
        }
        tracing::debug!(depth = *depth, "transaction rolled back");

        Ok(())
    }

    /// Registers a callback to run after the outermost transaction commits.
    ///
    /// If no transaction is active, the callback is executed immediately.
    /// If the transaction is rolled back, the callback is discarded.
    pub async fn on_commit<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let depth = self.depth.lock().await;
        if *depth == 0 {
            drop(depth);
            callback();
        } else {
            self.on_commit_callbacks.lock().await.push(Box::new(callback));
        }
    }

    /// Returns the number of pending on_commit callbacks.
    pub async fn pending_callbacks(&self) -> usize {
        self.on_commit_callbacks.lock().await.len()
    }
}

#[async_trait::async_trait]
impl DbExecutor for TransactionManager<'_> {
    fn vendor(&self) -> &str {
        self.db.vendor()
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> OrderlyResult<u64> {
        self.db.execute_sql(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> OrderlyResult<Vec<Row>> {
        self.db.query(sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[Value]) -> OrderlyResult<Row> {
        self.db.query_one(sql, params).await
    }

    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> OrderlyResult<i64> {
        self.db.insert_returning_id(sql, params).await
    }
}

/// Executes a closure within a database transaction.
///
/// If the closure returns `Ok`, the transaction is committed. If it returns
/// `Err`, the transaction is rolled back and the original error returned.
pub async fn atomic<'a, F, Fut, T>(db: &'a dyn DbExecutor, f: F) -> OrderlyResult<T>
where
    F: FnOnce(Arc<TransactionManager<'a>>) -> Fut,
    Fut: std::future::Future<Output = OrderlyResult<T>>,
{
    let txn = Arc::new(TransactionManager::new(db));
    txn.begin().await?;

    match f(Arc::clone(&txn)).await {
        Ok(result) => {
            txn.commit().await?;
            Ok(result)
        }
        Err(e) => {
            // A failed rollback must not mask the original error.
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
