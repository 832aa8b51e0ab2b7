//! SQLite database backend using `rusqlite`.
//!
//! [`SqliteBackend`] implements [`DbExecutor`] over a single `rusqlite`
//! connection held in a `tokio::sync::Mutex`. Every call runs in
//! `tokio::task::spawn_blocking` so the async runtime is never blocked.
//!
//! File databases use WAL journaling. `:memory:` opens a private in-memory
//! database, which is what the tests use.

use orderly_core::settings::DatabaseSettings;
use orderly_core::{OrderlyError, OrderlyResult};
use orderly_db::value::Value;
use orderly_db::{DbExecutor, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const MEMORY: &str = ":memory:";

/// A SQLite database backend.
pub struct SqliteBackend {
    path: PathBuf,
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Opens the database at `path`, creating it if needed.
    ///
    /// `:memory:` opens an in-memory database.
    pub fn open(path: impl Into<PathBuf>) -> OrderlyResult<Self> {
        let path = path.into();
        let in_memory = path.to_str() == Some(MEMORY);
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| OrderlyError::OperationalError(format!("SQLite open failed: {e}")))?;

        if !in_memory {
            conn.execute_batch("PRAGMA journal_mode=WAL;")
                .map_err(|e| OrderlyError::OperationalError(format!("Failed to set pragmas: {e}")))?;
        }
        tracing::debug!(path = %path.display(), "opened sqlite database");

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database.
    pub fn memory() -> OrderlyResult<Self> {
        Self::open(MEMORY)
    }

    /// Opens the database described by a settings entry.
    pub fn from_settings(settings: &DatabaseSettings) -> OrderlyResult<Self> {
        if settings.engine != "sqlite" {
            return Err(OrderlyError::ConfigurationError(format!(
                "Unsupported database engine '{}'; only 'sqlite' is available",
                settings.engine
            )));
        }
        Self::open(&settings.name)
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> OrderlyResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
            }
            .map_err(|e| OrderlyError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> OrderlyResult<Row> {
        let mut values = Vec::with_capacity(column_names.len());
        for (i, name) in column_names.iter().enumerate() {
            let value = match sqlite_row.get_ref(i).map_err(map_err)? {
                rusqlite::types::ValueRef::Null => Value::Null,
                rusqlite::types::ValueRef::Integer(v) => Value::Int(v),
                rusqlite::types::ValueRef::Real(v) => Value::Float(v),
                rusqlite::types::ValueRef::Text(b) => {
                    Value::String(String::from_utf8_lossy(b).into_owned())
                }
                rusqlite::types::ValueRef::Blob(_) => {
                    return Err(OrderlyError::DatabaseError(format!(
                        "column '{name}' holds a BLOB, which orderly does not read"
                    )))
                }
            };
            values.push(value);
        }
        Ok(Row::new(column_names.to_vec(), values))
    }

    /// Runs `f` on the connection in a blocking task.
    async fn with_conn<T, F>(&self, f: F) -> OrderlyResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> OrderlyResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| OrderlyError::DatabaseError(format!("Task join error: {e}")))?
    }
}

fn map_err(e: rusqlite::Error) -> OrderlyError {
    match e {
        rusqlite::Error::SqliteFailure(ref code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            OrderlyError::IntegrityError(e.to_string())
        }
        other => OrderlyError::DatabaseError(other.to_string()),
    }
}

#[async_trait::async_trait]
impl DbExecutor for SqliteBackend {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> OrderlyResult<u64> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(map_err)?;
            Self::bind_params(&mut stmt, &params)?;
            let count = stmt.raw_execute().map_err(map_err)?;
            Ok(count as u64)
        })
        .await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> OrderlyResult<Vec<Row>> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(map_err)?;
            let column_names: Vec<String> =
                stmt.column_names().into_iter().map(String::from).collect();
            Self::bind_params(&mut stmt, &params)?;

            let mut raw_rows = stmt.raw_query();
            let mut rows = Vec::new();
            while let Some(row) = raw_rows.next().map_err(map_err)? {
                rows.push(Self::convert_row(row, &column_names)?);
            }
            Ok(rows)
        })
        .await
    }

    /// Runs the INSERT and reads `last_insert_rowid()` under one lock.
    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> OrderlyResult<i64> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(map_err)?;
            Self::bind_params(&mut stmt, &params)?;
            stmt.raw_execute().map_err(map_err)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}
