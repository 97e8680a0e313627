//! PostgreSQL implementation of QueryExecutor.

const DEFAULT_MAX_CONNECTIONS: u32 = 16;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Arguments, Postgres, Transaction};
use std::ops::Deref;

use snippet_store::{
    Delete, Filter, Order, Query, QueryExecutor, Storable, StoreError, TransactionExecutor, Value,
};

use crate::serde_bind::{bind_insert_values, bind_update_values, deserialize_row};

/// Wrapper around sqlx::PgPool that implements QueryExecutor.
#[derive(Clone, Debug)]
pub struct PgPool(sqlx::PgPool);

impl PgPool {
    /// Create a new PgPool from an sqlx PgPool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self(pool)
    }

    /// Connect to a PostgreSQL database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(url)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(Self(pool))
    }

    /// Get the inner sqlx::PgPool.
    pub fn inner(&self) -> &sqlx::PgPool {
        &self.0
    }
}

impl Deref for PgPool {
    type Target = sqlx::PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Build a WHERE clause from filters, numbering placeholders from `start_param`.
fn build_where_clause(filters: &[Filter], start_param: usize) -> String {
    if filters.is_empty() {
        return String::new();
    }

    let mut clauses = Vec::new();
    let mut param_idx = start_param;

    for filter in filters {
        let clause = match filter {
            Filter::Eq(field, _) => {
                let c = format!("{} = ${}", field, param_idx);
                param_idx += 1;
                c
            }
        };
        clauses.push(clause);
    }

    format!(" WHERE {}", clauses.join(" AND "))
}

/// Bind filter values to PgArguments.
fn bind_filters(args: &mut PgArguments, filters: &[Filter]) -> Result<(), StoreError> {
    for filter in filters {
        match filter {
            Filter::Eq(_, value) => bind_value(args, value)?,
        }
    }
    Ok(())
}

/// Bind a Value to PgArguments.
fn bind_value(args: &mut PgArguments, value: &Value) -> Result<(), StoreError> {
    match value {
        Value::String(s) => {
            args.add(s.as_str())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        Value::Int(n) => {
            args.add(*n)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        Value::Bool(b) => {
            args.add(*b)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        Value::Datetime(dt) => {
            args.add(*dt.inner())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        Value::Null => {
            args.add(None::<String>)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
    }
    Ok(())
}

/// Build ORDER BY clause.
fn build_order_clause(order_by: &[(String, Order)]) -> String {
    if order_by.is_empty() {
        return String::new();
    }

    let clauses: Vec<String> = order_by
        .iter()
        .map(|(field, order)| {
            let dir = match order {
                Order::Asc => "ASC",
                Order::Desc => "DESC",
            };
            format!("{} {}", field, dir)
        })
        .collect();

    format!(" ORDER BY {}", clauses.join(", "))
}

#[async_trait]
impl QueryExecutor for PgPool {
    type Transaction = PgTransaction;

    async fn fetch<T: Storable>(&self, query: Query<T>) -> Result<Vec<T>, StoreError> {
        let where_clause = build_where_clause(&query.filters, 1);
        let order_clause = build_order_clause(&query.order_by);

        let mut sql = format!("SELECT * FROM {}{}{}", query.table, where_clause, order_clause);
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut args = PgArguments::default();
        bind_filters(&mut args, &query.filters)?;

        let rows = sqlx::query_with(&sql, args)
            .fetch_all(&self.0)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        rows.iter().map(|row| deserialize_row::<T>(row)).collect()
    }

    async fn fetch_optional<T: Storable>(&self, query: Query<T>) -> Result<Option<T>, StoreError> {
        let mut q = query;
        q.limit = Some(1);

        let results = self.fetch(q).await?;
        Ok(results.into_iter().next())
    }

    async fn exists<T: Storable>(&self, query: Query<T>) -> Result<bool, StoreError> {
        let where_clause = build_where_clause(&query.filters, 1);
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {}{})",
            query.table, where_clause
        );

        let mut args = PgArguments::default();
        bind_filters(&mut args, &query.filters)?;

        let row = sqlx::query_with(&sql, args)
            .fetch_one(&self.0)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        use sqlx::Row;
        Ok(row.get::<bool, _>(0))
    }

    async fn delete<T: Storable>(&self, delete: Delete<T>) -> Result<u64, StoreError> {
        let where_clause = build_where_clause(&delete.filters, 1);
        let sql = format!("DELETE FROM {}{}", delete.table, where_clause);

        let mut args = PgArguments::default();
        bind_filters(&mut args, &delete.filters)?;

        let result = sqlx::query_with(&sql, args)
            .execute(&self.0)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn insert<T: Storable>(&self, item: &T) -> Result<u64, StoreError> {
        bind_insert_values(&self.0, item).await
    }

    async fn update<T: Storable>(&self, item: &T) -> Result<u64, StoreError> {
        bind_update_values(&self.0, item).await
    }

    async fn begin_transaction(&self) -> Result<Self::Transaction, StoreError> {
        let tx = self
            .0
            .begin()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(PgTransaction { tx })
    }
}

/// PostgreSQL transaction wrapper implementing TransactionExecutor.
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TransactionExecutor for PgTransaction {
    async fn delete<T: Storable>(&mut self, delete: Delete<T>) -> Result<u64, StoreError> {
        let where_clause = build_where_clause(&delete.filters, 1);
        let sql = format!("DELETE FROM {}{}", delete.table, where_clause);

        let mut args = PgArguments::default();
        bind_filters(&mut args, &delete.filters)?;

        let result = sqlx::query_with(&sql, args)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snippet_store::Snippet;

    #[test]
    fn where_clause_numbers_placeholders() {
        let filters = vec![
            Filter::Eq("owner_id".to_string(), Value::from("abc")),
            Filter::Eq("language".to_string(), Value::from("python")),
        ];
        assert_eq!(
            build_where_clause(&filters, 1),
            " WHERE owner_id = $1 AND language = $2"
        );
        assert_eq!(build_where_clause(&[], 1), "");
    }

    #[test]
    fn order_clause_renders_directions() {
        let order = vec![
            ("created".to_string(), Order::Asc),
            ("id".to_string(), Order::Desc),
        ];
        assert_eq!(build_order_clause(&order), " ORDER BY created ASC, id DESC");
    }

    #[test]
    fn query_builder_targets_the_storable_table() {
        let query = Query::<Snippet>::new().eq("id", "abc").limit(1);
        assert_eq!(query.table, "snippets");
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.limit, Some(1));
    }
}
