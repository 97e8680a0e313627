//! In-process storage backend for the snippet store.
//!
//! `MemoryStore` backs the repository traits with locked maps. Each write
//! operation validates, re-renders and swaps the record under one write
//! guard, so readers only ever see a snippet whose `highlighted` document
//! matches its source fields as of some completed write.

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::unwrap_in_result)
)]

mod store;

pub use store::MemoryStore;

// Re-export core types for convenience
pub use snippet_store::{
    Highlighter, NewSnippet, NewUser, Requester, Snippet, SnippetPatch, SnippetRepository,
    StoreError, User, UserRepository,
};
