//! Ownership-based authorization.
//!
//! A pure predicate over (requester, snippet), decoupled from storage so the
//! boundary layer can consult it before a mutating operation reaches a
//! repository. Enforcement of the resulting denial is the caller's job.

use uuid::Uuid;

use crate::{Snippet, StoreError, User};

/// The authenticated identity (or lack of one) behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    User(Uuid),
}

impl Requester {
    /// Read operations are permitted for any requester.
    pub fn can_read(&self, _snippet: &Snippet) -> bool {
        true
    }

    /// Write operations (update, delete) are permitted only when the
    /// requester is authenticated and is the snippet's owner.
    pub fn can_write(&self, snippet: &Snippet) -> bool {
        matches!(self, Requester::User(id) if *id == snippet.owner)
    }

    /// `can_write` surfaced as an error for the request-handling layer. Never
    /// touches storage; the underlying record is left unmodified.
    pub fn ensure_can_write(&self, snippet: &Snippet) -> Result<(), StoreError> {
        if self.can_write(snippet) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied(format!(
                "snippet {} is only writable by its owner",
                snippet.id
            )))
        }
    }
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Requester::User(user.id)
    }
}
