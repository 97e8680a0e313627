//! PostgreSQL storage backend for the snippet store.
//!
//! `PgStore` implements the snippet and user repositories over `sqlx`,
//! binding values through serde so record types only need their `Storable`
//! metadata. Every write is a single statement (or, for the user cascade,
//! a single transaction), so a reader never observes a snippet whose
//! `highlighted` document disagrees with its source fields.
//!
//! # Usage
//!
//! ```text
//! use snippet_store::RepositoryConnection;
//! use snippet_store_postgres::PgStore;
//!
//! let store = PgStore::connect("postgres://localhost/snippets").await?;
//! store.initialize().await?;
//! ```

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::unwrap_in_result)
)]

mod executor;
mod serde_bind;
mod store;

pub use executor::{PgPool, PgTransaction};
pub use serde_bind::{bind_insert_values, bind_update_values, deserialize_row};
pub use store::PgStore;

// Re-export core types for convenience
pub use snippet_store::{
    ConnectionConfig, Delete, Filter, Highlighter, NewSnippet, NewUser, Order, Query,
    QueryExecutor, RepositoryConnection, Snippet, SnippetPatch, SnippetRepository, Storable,
    StoreDatetime, StoreError, TransactionExecutor, User, UserRepository, Value,
};
