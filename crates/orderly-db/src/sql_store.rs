//! A record store backed by SQL.
//!
//! [`SqlRecordStore`] renders SQLite-dialect statements with `?` placeholders
//! and runs them through any [`DbExecutor`]. Pass a
//! [`TransactionManager`](crate::transactions::TransactionManager) as the
//! executor to run the store inside [`atomic`](crate::transactions::atomic).
//!
//! The table layout is
//!
//! ```sql
//! CREATE TABLE "menu_item" (
//!     "id" INTEGER PRIMARY KEY AUTOINCREMENT,
//!     "menu_id",
//!     "ordering" INTEGER NOT NULL CHECK ("ordering" > 0)
//! );
//! ```
//!
//! Order-within columns are declared without a type so they keep whatever
//! value type the group key carries.

use crate::executor::DbExecutor;
use crate::group::GroupKey;
use crate::meta::OrderingMeta;
use crate::record::{OrderedRecord, RecordId};
use crate::row::Row;
use crate::store::{OrderingFilter, RecordStore};
use crate::value::Value;
use orderly_core::{OrderlyError, OrderlyResult};

/// A [`RecordStore`] over a SQL table.
pub struct SqlRecordStore<'a> {
    db: &'a dyn DbExecutor,
    meta: OrderingMeta,
}

impl<'a> SqlRecordStore<'a> {
    /// Creates a store for `meta` on `db`.
    pub fn new(db: &'a dyn DbExecutor, meta: OrderingMeta) -> Self {
        Self { db, meta }
    }

    /// Returns the statements creating the table and its group index.
    pub fn create_table_sql(&self) -> Vec<String> {
        let table = quote(&self.meta.db_table);
        let mut columns = vec!["\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
        columns.extend(self.meta.order_within_fields.iter().map(|f| quote(f)));
        columns.push("\"ordering\" INTEGER NOT NULL CHECK (\"ordering\" > 0)".to_string());

        let mut indexed: Vec<String> =
            self.meta.order_within_fields.iter().map(|f| quote(f)).collect();
        indexed.push("\"ordering\"".to_string());

        vec![
            format!("CREATE TABLE IF NOT EXISTS {table} ({})", columns.join(", ")),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table} ({})",
                quote(&format!("{}_group_ordering", self.meta.db_table)),
                indexed.join(", ")
            ),
        ]
    }

    /// Creates the table and index if they do not exist.
    pub async fn create_table(&self) -> OrderlyResult<()> {
        for sql in self.create_table_sql() {
            self.db.execute_sql(&sql, &[]).await?;
        }
        tracing::debug!(table = %self.meta.db_table, "ensured ordered table");
        Ok(())
    }

    fn select_columns(&self) -> String {
        let mut columns = vec!["\"id\"".to_string()];
        columns.extend(self.meta.order_within_fields.iter().map(|f| quote(f)));
        columns.push("\"ordering\"".to_string());
        columns.join(", ")
    }

    /// Renders the group predicate and its parameters.
    ///
    /// `IS ?` makes a NULL group value match NULL.
    fn group_predicate(&self, group: &GroupKey) -> OrderlyResult<(Vec<String>, Vec<Value>)> {
        self.meta.check_group_key(group)?;
        let clauses = group.fields().map(|f| format!("{} IS ?", quote(f))).collect();
        let params = group.values().cloned().collect();
        Ok((clauses, params))
    }

    fn record_from_row(&self, row: &Row) -> OrderlyResult<OrderedRecord> {
        let mut pairs = Vec::with_capacity(self.meta.order_within_fields.len());
        for field in &self.meta.order_within_fields {
            pairs.push((field.as_str(), row.get::<Value>(field)?));
        }
        Ok(OrderedRecord {
            id: Some(row.get::<i64>("id")?),
            ordering: Some(row.get::<i64>("ordering")?),
            group_key: GroupKey::new(pairs),
        })
    }

    fn not_found(&self, id: RecordId) -> OrderlyError {
        OrderlyError::DoesNotExist(format!(
            "{} matching id={id} does not exist",
            self.meta.db_table
        ))
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn where_clause(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

#[async_trait::async_trait]
impl RecordStore for SqlRecordStore<'_> {
    fn meta(&self) -> &OrderingMeta {
        &self.meta
    }

    async fn get(&self, id: RecordId) -> OrderlyResult<OrderedRecord> {
        let sql = format!(
            "SELECT {} FROM {} WHERE \"id\" = ?",
            self.select_columns(),
            quote(&self.meta.db_table)
        );
        match self.db.query_one(&sql, &[Value::Int(id)]).await {
            Ok(row) => self.record_from_row(&row),
            Err(OrderlyError::DoesNotExist(_)) => Err(self.not_found(id)),
            Err(e) => Err(e),
        }
    }

    async fn filter(
        &self,
        group: &GroupKey,
        filter: OrderingFilter,
    ) -> OrderlyResult<Vec<OrderedRecord>> {
        let (mut clauses, mut params) = self.group_predicate(group)?;
        match filter {
            OrderingFilter::All => {}
            OrderingFilter::Above(n) => {
                clauses.push("\"ordering\" > ?".to_string());
                params.push(Value::Int(n));
            }
            OrderingFilter::Below(n) => {
                clauses.push("\"ordering\" < ?".to_string());
                params.push(Value::Int(n));
            }
        }
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY \"ordering\" ASC, \"id\" ASC",
            self.select_columns(),
            quote(&self.meta.db_table),
            where_clause(&clauses)
        );
        self.db
            .query(&sql, &params)
            .await?
            .iter()
            .map(|row| self.record_from_row(row))
            .collect()
    }

    async fn max_ordering(&self, group: &GroupKey) -> OrderlyResult<Option<i64>> {
        let (clauses, params) = self.group_predicate(group)?;
        let sql = format!(
            "SELECT MAX(\"ordering\") AS \"max_ordering\" FROM {}{}",
            quote(&self.meta.db_table),
            where_clause(&clauses)
        );
        self.db
            .query_one(&sql, &params)
            .await?
            .get::<Option<i64>>("max_ordering")
    }

    async fn insert(&self, record: &mut OrderedRecord) -> OrderlyResult<RecordId> {
        self.meta.check_group_key(&record.group_key)?;
        if record.is_saved() {
            return Err(OrderlyError::Usage(format!(
                "record {:?} is already saved",
                record.id
            )));
        }
        let ordering = record.ordering_value()?;

        let mut columns: Vec<String> = record.group_key.fields().map(quote).collect();
        columns.push("\"ordering\"".to_string());
        let mut params: Vec<Value> = record.group_key.values().cloned().collect();
        params.push(Value::Int(ordering));
        let placeholders = vec!["?"; params.len()].join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            quote(&self.meta.db_table),
            columns.join(", ")
        );
        let id = self.db.insert_returning_id(&sql, &params).await?;
        record.id = Some(id);
        tracing::debug!(table = %self.meta.db_table, id, ordering, "inserted record");
        Ok(id)
    }

    async fn save(&self, record: &OrderedRecord) -> OrderlyResult<()> {
        let id = record.saved_id()?;
        let ordering = record.ordering_value()?;
        let sql = format!(
            "UPDATE {} SET \"ordering\" = ? WHERE \"id\" = ?",
            quote(&self.meta.db_table)
        );
        let affected = self
            .db
            .execute_sql(&sql, &[Value::Int(ordering), Value::Int(id)])
            .await?;
        if affected == 0 {
            return Err(self.not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> OrderlyResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE \"id\" = ?",
            quote(&self.meta.db_table)
        );
        Ok(self.db.execute_sql(&sql, &[Value::Int(id)]).await? > 0)
    }

    async fn group_keys(&self) -> OrderlyResult<Vec<GroupKey>> {
        let table = quote(&self.meta.db_table);
        if self.meta.order_within_fields.is_empty() {
            let row = self
                .db
                .query_one(&format!("SELECT COUNT(*) AS \"n\" FROM {table}"), &[])
                .await?;
            return Ok(if row.get::<i64>("n")? > 0 {
                vec![GroupKey::empty()]
            } else {
                Vec::new()
            });
        }

        let columns = self
            .meta
            .order_within_fields
            .iter()
            .map(|f| quote(f))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT DISTINCT {columns} FROM {table} ORDER BY {columns}");
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter()
            .map(|row| {
                let mut pairs = Vec::with_capacity(self.meta.order_within_fields.len());
                for field in &self.meta.order_within_fields {
                    pairs.push((field.as_str(), row.get::<Value>(field)?));
                }
                Ok(GroupKey::new(pairs))
            })
            .collect()
    }
}
