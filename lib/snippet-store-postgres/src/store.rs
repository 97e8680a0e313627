//! Repository implementations over the PostgreSQL executor.

use async_trait::async_trait;
use uuid::Uuid;

use snippet_store::{
    ConnectionConfig, Delete, Highlighter, NewSnippet, NewUser, Order, Query, QueryExecutor,
    RepositoryConnection, Snippet, SnippetPatch, SnippetRepository, StoreError,
    TransactionExecutor, User, UserRepository, ValidationErrors,
};

use crate::executor::PgPool;

/// Schema statements run by `initialize`. Identifiers are stored as text;
/// the snippets table references its owner so stray owner ids cannot be
/// inserted behind the repository's back.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        created TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS snippets (
        id TEXT PRIMARY KEY,
        created TIMESTAMPTZ NOT NULL,
        title TEXT NOT NULL,
        code TEXT NOT NULL,
        linenos BOOLEAN NOT NULL,
        language TEXT NOT NULL,
        style TEXT NOT NULL,
        owner_id TEXT NOT NULL REFERENCES users(id),
        highlighted TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS snippets_created_idx ON snippets (created)",
    "CREATE INDEX IF NOT EXISTS snippets_owner_idx ON snippets (owner_id)",
];

/// PostgreSQL-backed store implementing both repository traits.
pub struct PgStore {
    pool: PgPool,
    highlighter: Highlighter,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            highlighter: Highlighter::new(),
        }
    }

    /// The grammar and theme registries this store validates against.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// The underlying executor.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RepositoryConnection for PgStore {
    async fn connect(config: impl Into<ConnectionConfig> + Send) -> Result<Self, StoreError> {
        let ConnectionConfig::Url(url) = config.into();
        Ok(Self::new(PgPool::connect(&url).await?))
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(self.pool.inner())
                .await
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        log::debug!("schema initialized");
        Ok(())
    }
}

fn unknown_owner(owner: Uuid) -> StoreError {
    let mut errors = ValidationErrors::new();
    errors.push("owner", format!("unknown user {owner}"));
    StoreError::Validation(errors)
}

#[async_trait]
impl SnippetRepository for PgStore {
    async fn create(&self, input: NewSnippet) -> Result<Snippet, StoreError> {
        let owner_exists = self
            .pool
            .exists(Query::<User>::new().eq("id", input.owner))
            .await?;
        if !owner_exists {
            return Err(unknown_owner(input.owner));
        }

        let snippet = Snippet::compose(input, &self.highlighter)?;
        self.pool.insert(&snippet).await?;
        log::debug!("stored snippet {}", snippet.id);
        Ok(snippet)
    }

    async fn update(&self, id: Uuid, patch: SnippetPatch) -> Result<Snippet, StoreError> {
        let mut snippet = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        snippet.apply(patch, &self.highlighter)?;

        // a concurrent delete between the read and this write shows up as
        // zero affected rows
        let affected = self.pool.update(&snippet).await?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        log::debug!("updated snippet {id}");
        Ok(snippet)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let affected = self
            .pool
            .delete(Delete::<Snippet>::new().eq("id", id))
            .await?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        log::debug!("removed snippet {id}");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Snippet>, StoreError> {
        self.pool
            .fetch_optional(Query::<Snippet>::new().eq("id", id))
            .await
    }

    async fn list(&self) -> Result<Vec<Snippet>, StoreError> {
        self.pool
            .fetch(Query::<Snippet>::new().order_by("created", Order::Asc))
            .await
    }

    async fn snippets_for_owner(&self, owner: Uuid) -> Result<Vec<Snippet>, StoreError> {
        self.pool
            .fetch(
                Query::<Snippet>::new()
                    .eq("owner_id", owner)
                    .order_by("created", Order::Asc),
            )
            .await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, input: NewUser) -> Result<User, StoreError> {
        let taken = self
            .pool
            .exists(Query::<User>::new().eq("username", &input.username))
            .await?;
        if taken {
            let mut errors = ValidationErrors::new();
            errors.push("username", format!("username {:?} is taken", input.username));
            return Err(StoreError::Validation(errors));
        }

        let user = User::compose(input)?;
        self.pool.insert(&user).await?;
        log::debug!("stored user {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.pool
            .fetch_optional(Query::<User>::new().eq("id", id))
            .await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.pool
            .fetch_optional(Query::<User>::new().eq("username", username))
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.pool
            .fetch(Query::<User>::new().order_by("created", Order::Asc))
            .await
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        // owned snippets and the user row go in one transaction
        let mut tx = self.pool.begin_transaction().await?;
        tx.delete(Delete::<Snippet>::new().eq("owner_id", id)).await?;
        let affected = tx.delete(Delete::<User>::new().eq("id", id)).await?;
        if affected == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound(id.to_string()));
        }
        tx.commit().await?;
        log::debug!("removed user {id} and its snippets");
        Ok(())
    }
}
