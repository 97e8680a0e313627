//! Database-agnostic query builder for snippet storage backends.
//!
//! This module provides a small query abstraction that database backends
//! translate to their own statement syntax. The store's access patterns are
//! simple, so only equality filters, ordering and limits are modeled.

use std::marker::PhantomData;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Storable, StoreDatetime, StoreError};

/// A value that can be bound to a query parameter.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Datetime(StoreDatetime),
    Null,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::String(id.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<StoreDatetime> for Value {
    fn from(dt: StoreDatetime) -> Self {
        Value::Datetime(dt)
    }
}

/// Filter conditions for queries.
#[derive(Debug, Clone)]
pub enum Filter {
    /// field = value
    Eq(String, Value),
}

/// Sort order.
#[derive(Debug, Clone, Copy)]
pub enum Order {
    Asc,
    Desc,
}

/// A SELECT query builder.
#[derive(Debug, Clone)]
pub struct Query<T> {
    /// The table to query.
    pub table: String,
    /// Filter conditions.
    pub filters: Vec<Filter>,
    /// Order by clauses.
    pub order_by: Vec<(String, Order)>,
    /// Maximum number of results.
    pub limit: Option<u64>,
    pub(crate) _marker: PhantomData<T>,
}

impl<T: Storable> Query<T> {
    /// Create a new query for the type's table.
    pub fn new() -> Self {
        Self {
            table: T::table_name().to_string(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            _marker: PhantomData,
        }
    }

    /// Add a filter condition.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an equality filter (shorthand for Filter::Eq).
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::Eq(field.into(), value.into()))
    }

    /// Add an order-by clause.
    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    /// Set the maximum number of results.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<T: Storable> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A DELETE query builder.
#[derive(Debug, Clone)]
pub struct Delete<T> {
    /// The table to delete from.
    pub table: String,
    /// Filter conditions.
    pub filters: Vec<Filter>,
    pub(crate) _marker: PhantomData<T>,
}

impl<T: Storable> Delete<T> {
    /// Create a new delete query for the type's table.
    pub fn new() -> Self {
        Self {
            table: T::table_name().to_string(),
            filters: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add a filter condition.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an equality filter (shorthand).
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::Eq(field.into(), value.into()))
    }
}

impl<T: Storable> Default for Delete<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for executing queries against a database backend.
///
/// Implemented by database-specific pool types.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// The transaction type for this executor.
    type Transaction: TransactionExecutor;

    /// Execute a SELECT query and return results.
    async fn fetch<T: Storable>(&self, query: Query<T>) -> Result<Vec<T>, StoreError>;

    /// Execute a SELECT query and return at most one result.
    async fn fetch_optional<T: Storable>(&self, query: Query<T>) -> Result<Option<T>, StoreError>;

    /// Check if any rows match the query (SELECT EXISTS).
    async fn exists<T: Storable>(&self, query: Query<T>) -> Result<bool, StoreError>;

    /// Execute a DELETE query and return the number of rows affected.
    async fn delete<T: Storable>(&self, delete: Delete<T>) -> Result<u64, StoreError>;

    /// Insert an item into the database.
    async fn insert<T: Storable>(&self, item: &T) -> Result<u64, StoreError>;

    /// Overwrite the row whose primary key matches `item`, derived fields
    /// included, and return the number of rows affected.
    async fn update<T: Storable>(&self, item: &T) -> Result<u64, StoreError>;

    /// Begin a transaction. The returned executor can be used for statements
    /// within the transaction.
    async fn begin_transaction(&self) -> Result<Self::Transaction, StoreError>;
}

/// Trait for executing statements within a transaction.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Execute a DELETE query within the transaction.
    async fn delete<T: Storable>(&mut self, delete: Delete<T>) -> Result<u64, StoreError>;

    /// Commit the transaction.
    async fn commit(self) -> Result<(), StoreError>;

    /// Rollback the transaction.
    async fn rollback(self) -> Result<(), StoreError>;
}
