use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Storable, StoreDatetime, StoreError, ValidationErrors};

/// An identity that can own snippets. Deleting a user deletes every snippet
/// it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created: StoreDatetime,
}

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl User {
    /// Validate a create input and assign identity and creation time.
    /// Username uniqueness is the backend's check; it holds the full set.
    pub fn compose(input: NewUser) -> Result<User, StoreError> {
        let mut errors = ValidationErrors::new();
        if input.username.trim().is_empty() {
            errors.push("username", "must not be empty");
        }
        errors.into_result()?;

        Ok(User {
            id: Uuid::new_v4(),
            username: input.username,
            created: StoreDatetime::now(),
        })
    }
}

impl Storable for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "username", "created"]
    }

    fn column_types() -> &'static [&'static str] {
        &["text", "text", "datetime"]
    }

    fn json_keys() -> &'static [&'static str] {
        &["id", "username", "created"]
    }

    fn id(&self) -> String {
        self.id.to_string()
    }
}
