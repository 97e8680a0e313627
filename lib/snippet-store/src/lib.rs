//! Snippet Store - snippet records with a write-derived rendered document.
//!
//! This crate provides the core of a code-snippet store: the record types,
//! the rendering that keeps each snippet's derived `highlighted` document
//! consistent with its source fields, the ownership predicate consulted by
//! request-handling layers, and the repository traits storage backends
//! implement.
//!
//! # Core Concepts
//!
//! - **Snippet**: a stored unit of source code plus rendering preferences and
//!   its derived styled-output document. Any write to the source fields
//!   re-renders the document before the record is persisted; the two are
//!   never out of step.
//! - **Owner**: the user identity permanently associated with a snippet at
//!   creation. Reads are open to anyone; only the owner may update or delete.
//!
//! # Traits
//!
//! - [`SnippetRepository`] / [`UserRepository`]: storage operations
//! - [`RepositoryConnection`]: backend connection lifecycle
//! - [`QueryExecutor`]: database-agnostic statement execution for SQL
//!   backends
//! - [`Storable`]: column metadata for stored record types

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::unwrap_in_result,
        clippy::panic
    )
)]

mod error;
mod highlight;
mod permissions;
mod query;
mod repository;
mod snippet;
mod storable;
mod time;
mod user;

pub use error::{FieldError, StoreError, ValidationErrors};
pub use highlight::{Highlighter, RenderRequest};
pub use permissions::Requester;
pub use query::{Delete, Filter, Order, Query, QueryExecutor, TransactionExecutor, Value};
pub use repository::{ConnectionConfig, RepositoryConnection, SnippetRepository, UserRepository};
pub use snippet::{DEFAULT_LANGUAGE, DEFAULT_STYLE, NewSnippet, Snippet, SnippetPatch};
pub use storable::Storable;
pub use time::StoreDatetime;
pub use user::{NewUser, User};
