#![allow(clippy::unwrap_used, clippy::expect_used, clippy::unwrap_in_result)]

use anyhow::Result;
use uuid::Uuid;

use snippet_store::{Highlighter, NewSnippet, Requester, Snippet, StoreError};

fn snippet_owned_by(owner: Uuid) -> Result<Snippet> {
    let highlighter = Highlighter::new();
    Ok(Snippet::compose(NewSnippet::new("a = 1", owner), &highlighter)?)
}

#[test]
fn reads_are_open_to_everyone() -> Result<()> {
    let owner = Uuid::new_v4();
    let snippet = snippet_owned_by(owner)?;

    assert!(Requester::Anonymous.can_read(&snippet));
    assert!(Requester::User(Uuid::new_v4()).can_read(&snippet));
    assert!(Requester::User(owner).can_read(&snippet));
    Ok(())
}

#[test]
fn writes_are_owner_only() -> Result<()> {
    let owner = Uuid::new_v4();
    let snippet = snippet_owned_by(owner)?;

    assert!(Requester::User(owner).can_write(&snippet));
    assert!(!Requester::User(Uuid::new_v4()).can_write(&snippet));
    assert!(!Requester::Anonymous.can_write(&snippet));
    Ok(())
}

#[test]
fn denied_write_surfaces_permission_denied() -> Result<()> {
    let snippet = snippet_owned_by(Uuid::new_v4())?;

    let err = Requester::Anonymous.ensure_can_write(&snippet).unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));

    let err = Requester::User(Uuid::new_v4())
        .ensure_can_write(&snippet)
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    Ok(())
}
