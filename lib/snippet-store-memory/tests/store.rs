#![allow(clippy::unwrap_used, clippy::expect_used, clippy::unwrap_in_result)]

use anyhow::Result;
use uuid::Uuid;

use snippet_store_memory::{
    MemoryStore, NewSnippet, NewUser, Requester, SnippetPatch, SnippetRepository, StoreError,
    UserRepository,
};

async fn store_with_user(username: &str) -> Result<(MemoryStore, Uuid)> {
    let store = MemoryStore::new();
    let user = store.create_user(NewUser::new(username)).await?;
    Ok((store, user.id))
}

#[tokio::test]
async fn create_get_list_roundtrip() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;

    let created = store.create(NewSnippet::new("a = 1", alice)).await?;
    assert!(!created.highlighted.is_empty());

    let fetched = store.get(created.id).await?.unwrap();
    assert_eq!(fetched.code, "a = 1");
    assert_eq!(fetched.highlighted, created.highlighted);

    assert_eq!(store.list().await?.len(), 1);
    assert!(store.get(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_owner_rejected_and_nothing_persisted() -> Result<()> {
    let store = MemoryStore::new();

    let err = store
        .create(NewSnippet::new("a = 1", Uuid::new_v4()))
        .await
        .unwrap_err();
    match err {
        StoreError::Validation(errors) => assert!(errors.contains("owner")),
        other => anyhow::bail!("expected validation error, got {other:?}"),
    }
    assert!(store.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_language_rejected_and_nothing_persisted() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    assert!(!store.highlighter().supports_language("not-a-real-language"));

    let err = store
        .create(NewSnippet::new("a = 1", alice).with_language("not-a-real-language"))
        .await
        .unwrap_err();
    match err {
        StoreError::Validation(errors) => assert!(errors.contains("language")),
        other => anyhow::bail!("expected validation error, got {other:?}"),
    }
    assert!(store.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_rerenders_and_persists_together() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    let created = store.create(NewSnippet::new("print(1)", alice)).await?;

    let updated = store
        .update(created.id, SnippetPatch::new().with_code("print(2)"))
        .await?;
    assert_eq!(updated.code, "print(2)");
    assert_ne!(updated.highlighted, created.highlighted);

    let stored = store.get(created.id).await?.unwrap();
    assert_eq!(stored.code, "print(2)");
    assert_eq!(stored.highlighted, updated.highlighted);
    Ok(())
}

#[tokio::test]
async fn rejected_update_leaves_stored_record_unchanged() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    let created = store.create(NewSnippet::new("a = 1", alice)).await?;

    let err = store
        .update(
            created.id,
            SnippetPatch::new()
                .with_code("b = 2")
                .with_style("not-a-real-style"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let stored = store.get(created.id).await?.unwrap();
    assert_eq!(stored.code, "a = 1");
    assert_eq!(stored.highlighted, created.highlighted);
    Ok(())
}

#[tokio::test]
async fn missing_ids_fail_with_not_found() -> Result<()> {
    let (store, _alice) = store_with_user("alice").await?;

    let err = store
        .update(Uuid::new_v4(), SnippetPatch::new().with_code("c = 3"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn delete_removes_only_the_record() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    let keep = store.create(NewSnippet::new("a = 1", alice)).await?;
    let gone = store.create(NewSnippet::new("b = 2", alice)).await?;

    store.delete(gone.id).await?;

    assert!(store.get(gone.id).await?.is_none());
    assert!(store.get(keep.id).await?.is_some());
    assert!(store.get_user(alice).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn list_is_ascending_by_creation_time() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    for code in ["a = 1", "b = 2", "c = 3", "d = 4"] {
        store.create(NewSnippet::new(code, alice)).await?;
    }

    let listed = store.list().await?;
    assert_eq!(listed.len(), 4);
    for pair in listed.windows(2) {
        assert!(pair[0].created <= pair[1].created);
    }
    Ok(())
}

#[tokio::test]
async fn owner_survives_any_number_of_updates() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    let created = store.create(NewSnippet::new("a = 1", alice)).await?;

    store
        .update(created.id, SnippetPatch::new().with_code("b = 2"))
        .await?;
    store
        .update(created.id, SnippetPatch::new().with_title("renamed"))
        .await?;
    let stored = store
        .update(created.id, SnippetPatch::new().with_linenos(true))
        .await?;

    assert_eq!(stored.owner, alice);
    Ok(())
}

#[tokio::test]
async fn non_owner_write_is_denied_before_reaching_the_store() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    let bob = store.create_user(NewUser::new("bob")).await?;
    let snippet = store.create(NewSnippet::new("a = 1", alice)).await?;

    // the boundary layer consults the predicate and never calls update
    let requester = Requester::from(&bob);
    assert!(!requester.can_write(&snippet));
    let err = requester.ensure_can_write(&snippet).unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));

    let stored = store.get(snippet.id).await?.unwrap();
    assert_eq!(stored.code, "a = 1");
    assert_eq!(stored.highlighted, snippet.highlighted);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_cascades_to_its_snippets() -> Result<()> {
    let (store, alice) = store_with_user("alice").await?;
    let bob = store.create_user(NewUser::new("bob")).await?;

    store.create(NewSnippet::new("a = 1", alice)).await?;
    store.create(NewSnippet::new("b = 2", alice)).await?;
    let bobs = store.create(NewSnippet::new("foo = \"bar\"", bob.id)).await?;

    store.delete_user(alice).await?;

    assert!(store.get_user(alice).await?.is_none());
    assert!(store.snippets_for_owner(alice).await?.is_empty());
    let remaining = store.list().await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, bobs.id);
    Ok(())
}

#[tokio::test]
async fn usernames_are_unique() -> Result<()> {
    let (store, _alice) = store_with_user("alice").await?;

    let err = store.create_user(NewUser::new("alice")).await.unwrap_err();
    match err {
        StoreError::Validation(errors) => assert!(errors.contains("username")),
        other => anyhow::bail!("expected validation error, got {other:?}"),
    }

    let found = store.user_by_username("alice").await?;
    assert!(found.is_some());
    assert_eq!(store.list_users().await?.len(), 1);
    Ok(())
}
