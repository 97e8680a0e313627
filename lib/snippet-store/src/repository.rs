//! Repository traits for snippet storage.
//!
//! - `SnippetRepository`: snippet CRUD with the write-triggered re-render
//!   contract
//! - `UserRepository`: identity records and the owner cascade
//! - `RepositoryConnection`: database connection and initialization

use async_trait::async_trait;
use uuid::Uuid;

use crate::{NewSnippet, NewUser, Snippet, SnippetPatch, StoreError, User};

/// Connection configuration for database backends.
///
/// This enum is extensible for future authentication methods.
#[derive(Debug, Clone)]
pub enum ConnectionConfig {
    /// Connect using a database URL string.
    Url(String),
}

impl From<&str> for ConnectionConfig {
    fn from(url: &str) -> Self {
        ConnectionConfig::Url(url.to_string())
    }
}

impl From<String> for ConnectionConfig {
    fn from(url: String) -> Self {
        ConnectionConfig::Url(url)
    }
}

impl From<&String> for ConnectionConfig {
    fn from(url: &String) -> Self {
        ConnectionConfig::Url(url.clone())
    }
}

/// Trait for database connection and initialization.
///
/// This trait abstracts the database connection lifecycle, allowing backends
/// to implement their own connection and schema setup logic.
#[async_trait]
pub trait RepositoryConnection: Sized + Send + Sync {
    /// Connect to the database using the provided configuration.
    async fn connect(config: impl Into<ConnectionConfig> + Send) -> Result<Self, StoreError>;

    /// Initialize the database schema.
    async fn initialize(&self) -> Result<(), StoreError>;
}

/// Repository trait for snippet records.
///
/// Every write recomputes the derived `highlighted` document and persists it
/// together with the rest of the record in one step: a reader never observes
/// a record whose rendering disagrees with its source fields. Implementations
/// route all writes through `Snippet::compose` / `Snippet::apply`.
#[async_trait]
pub trait SnippetRepository {
    /// Create a snippet.
    ///
    /// This method should:
    /// 1. Check that `input.owner` names an existing user
    /// 2. Call `Snippet::compose` to validate, assign identity and render
    /// 3. Persist the finished record
    ///
    /// Fails with `Validation` on bad fields or an unknown owner; nothing is
    /// persisted on failure.
    async fn create(&self, input: NewSnippet) -> Result<Snippet, StoreError>;

    /// Apply a partial update to an existing snippet.
    ///
    /// This method should:
    /// 1. Load the stored record (`NotFound` if absent)
    /// 2. Call `Snippet::apply` to validate, mutate and re-render
    /// 3. Persist the finished record
    ///
    /// The stored record is untouched on any failure.
    async fn update(&self, id: Uuid, patch: SnippetPatch) -> Result<Snippet, StoreError>;

    /// Remove a snippet. Fails with `NotFound` if absent. No side effects
    /// beyond removal of the record itself.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Get a snippet by id. Returns `None` if no snippet with the given id
    /// exists.
    async fn get(&self, id: Uuid) -> Result<Option<Snippet>, StoreError>;

    /// All snippets, ascending by creation time.
    async fn list(&self) -> Result<Vec<Snippet>, StoreError>;

    /// The snippets owned by one user, ascending by creation time.
    async fn snippets_for_owner(&self, owner: Uuid) -> Result<Vec<Snippet>, StoreError>;
}

/// Repository trait for user records.
#[async_trait]
pub trait UserRepository {
    /// Create a user. Fails with `Validation` on a blank or taken username.
    async fn create_user(&self, input: NewUser) -> Result<User, StoreError>;

    /// Get a user by id. Returns `None` if absent.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Look a user up by username. Returns `None` if absent.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All users, ascending by creation time.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Remove a user and every snippet it owns in one atomic step. Fails with
    /// `NotFound` if the user is absent.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;
}
