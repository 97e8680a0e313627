use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use snippet_store::{
    Highlighter, NewSnippet, NewUser, Snippet, SnippetPatch, SnippetRepository, StoreError, User,
    UserRepository, ValidationErrors,
};

/// In-memory store implementing both repository traits.
///
/// Lock order is users before snippets in every operation that takes both,
/// and each operation holds its write guard for the whole
/// validate-render-persist sequence. Concurrent writers to the same record
/// serialize; last write wins.
pub struct MemoryStore {
    highlighter: Highlighter,
    users: RwLock<HashMap<Uuid, User>>,
    snippets: RwLock<HashMap<Uuid, Snippet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
            users: RwLock::new(HashMap::new()),
            snippets: RwLock::new(HashMap::new()),
        }
    }

    /// The grammar and theme registries this store validates against.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

fn unknown_owner(owner: Uuid) -> StoreError {
    let mut errors = ValidationErrors::new();
    errors.push("owner", format!("unknown user {owner}"));
    StoreError::Validation(errors)
}

fn sorted_by_created(mut snippets: Vec<Snippet>) -> Vec<Snippet> {
    snippets.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
    snippets
}

#[async_trait]
impl SnippetRepository for MemoryStore {
    async fn create(&self, input: NewSnippet) -> Result<Snippet, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        if !users.contains_key(&input.owner) {
            return Err(unknown_owner(input.owner));
        }

        let snippet = Snippet::compose(input, &self.highlighter)?;
        let mut snippets = self.snippets.write().map_err(|_| poisoned())?;
        snippets.insert(snippet.id, snippet.clone());
        log::debug!("stored snippet {}", snippet.id);
        Ok(snippet)
    }

    async fn update(&self, id: Uuid, patch: SnippetPatch) -> Result<Snippet, StoreError> {
        let mut snippets = self.snippets.write().map_err(|_| poisoned())?;
        let current = snippets
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // apply on a copy: a rejected patch must leave the stored record as it was
        let mut updated = current.clone();
        updated.apply(patch, &self.highlighter)?;
        snippets.insert(id, updated.clone());
        log::debug!("updated snippet {id}");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut snippets = self.snippets.write().map_err(|_| poisoned())?;
        if snippets.remove(&id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        log::debug!("removed snippet {id}");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Snippet>, StoreError> {
        let snippets = self.snippets.read().map_err(|_| poisoned())?;
        Ok(snippets.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Snippet>, StoreError> {
        let snippets = self.snippets.read().map_err(|_| poisoned())?;
        Ok(sorted_by_created(snippets.values().cloned().collect()))
    }

    async fn snippets_for_owner(&self, owner: Uuid) -> Result<Vec<Snippet>, StoreError> {
        let snippets = self.snippets.read().map_err(|_| poisoned())?;
        Ok(sorted_by_created(
            snippets
                .values()
                .filter(|snippet| snippet.owner == owner)
                .cloned()
                .collect(),
        ))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|user| user.username == input.username) {
            let mut errors = ValidationErrors::new();
            errors.push("username", format!("username {:?} is taken", input.username));
            return Err(StoreError::Validation(errors));
        }

        let user = User::compose(input)?;
        users.insert(user.id, user.clone());
        log::debug!("stored user {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|user| user.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let mut listed: Vec<User> = users.values().cloned().collect();
        listed.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.remove(&id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        // cascade: both guards are held, so no reader sees the user gone
        // while its snippets remain
        let mut snippets = self.snippets.write().map_err(|_| poisoned())?;
        snippets.retain(|_, snippet| snippet.owner != id);
        log::debug!("removed user {id} and its snippets");
        Ok(())
    }
}
