mod common;

use std::collections::HashSet;

use bytes::Bytes;
use fileshare::ops::files::{create_file, delete_file, get_download_url, list_files, CreateFileInput};
use fileshare::ops::{projects, sharing, OpError};

fn pdf_input(name: &str) -> CreateFileInput {
    CreateFileInput {
        name: name.to_string(),
        mime_type: "application/pdf".to_string(),
        byte_size: 2_400_000,
        project_id: None,
    }
}

#[tokio::test]
async fn test_create_file_returns_upload_url() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");

    let created = create_file(&state, &alice, pdf_input("q1.pdf")).await.unwrap();

    assert_eq!(created.file.name, "q1.pdf");
    assert_eq!(created.file.owner_id, alice.id);
    assert!(created.file.key.starts_with(&format!("{}/", alice.id)));
    assert!(created.upload_url.contains(&created.file.key));

    // Record is queryable by key immediately; the upload happens later
    let stored = state.db.get_file_by_key(&created.file.key).unwrap().unwrap();
    assert_eq!(stored.id, created.file.id);
}

#[tokio::test]
async fn test_create_file_keys_are_unique() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");

    let mut keys = HashSet::new();
    for i in 0..20 {
        let created = create_file(&state, &alice, pdf_input(&format!("doc-{i}.pdf")))
            .await
            .unwrap();
        assert!(keys.insert(created.file.key), "duplicate key issued");
    }
}

#[tokio::test]
async fn test_create_file_validation() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");

    let result = create_file(&state, &alice, pdf_input("  ")).await;
    assert!(matches!(result, Err(OpError::Validation(_))));

    let mut input = pdf_input("ok.pdf");
    input.mime_type = "not-a-mime".to_string();
    let result = create_file(&state, &alice, input).await;
    assert!(matches!(result, Err(OpError::Validation(_))));
}

#[tokio::test]
async fn test_create_file_in_foreign_project_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");
    let bob = common::register_user(&state, "bob@example.com");

    let project = projects::create_project(&state, &alice, "Reports").unwrap();

    let mut input = pdf_input("sneaky.pdf");
    input.project_id = Some(project.id.clone());
    let result = create_file(&state, &bob, input).await;
    assert!(matches!(result, Err(OpError::Forbidden(_))));

    let mut input = pdf_input("missing-project.pdf");
    input.project_id = Some("nonexistent".to_string());
    let result = create_file(&state, &alice, input).await;
    assert!(matches!(result, Err(OpError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_file_owner_only() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");
    let bob = common::register_user(&state, "bob@example.com");

    let created = create_file(&state, &alice, pdf_input("q1.pdf")).await.unwrap();

    // A grant recipient may read but never delete
    sharing::share_file(&state, &alice, &created.file.key, &["bob@example.com".to_string()])
        .await
        .unwrap();
    let result = delete_file(&state, &bob, &created.file.id).await;
    assert!(matches!(result, Err(OpError::Forbidden(_))));

    // Owner delete succeeds
    delete_file(&state, &alice, &created.file.id).await.unwrap();
    assert!(state.db.get_file(&created.file.id).unwrap().is_none());

    let result = delete_file(&state, &alice, &created.file.id).await;
    assert!(matches!(result, Err(OpError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_file_removes_backing_object() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");

    let created = create_file(&state, &alice, pdf_input("q1.pdf")).await.unwrap();
    let local = state.local_store.as_ref().unwrap();
    local.put(&created.file.key, Bytes::from("pdf bytes")).await.unwrap();
    assert!(state.object_store.exists(&created.file.key).await.unwrap());

    let outcome = delete_file(&state, &alice, &created.file.id).await.unwrap();
    assert!(outcome.storage_warning.is_none());
    assert!(!state.object_store.exists(&created.file.key).await.unwrap());
}

#[tokio::test]
async fn test_delete_file_warns_when_storage_cleanup_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state_with_broken_deletes(&dir);
    let alice = common::register_user(&state, "alice@example.com");

    let created = create_file(&state, &alice, pdf_input("q1.pdf")).await.unwrap();

    let outcome = delete_file(&state, &alice, &created.file.id).await.unwrap();
    let warning = outcome.storage_warning.expect("warning should be set");
    assert!(warning.contains("storage backend offline"));

    // The row is gone regardless of the backend failure
    assert!(state.db.get_file(&created.file.id).unwrap().is_none());
    assert!(state.db.get_file_by_key(&created.file.key).unwrap().is_none());
}

#[tokio::test]
async fn test_list_files_union_without_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");
    let bob = common::register_user(&state, "bob@example.com");

    let own = create_file(&state, &alice, pdf_input("mine.pdf")).await.unwrap();
    let shared = create_file(&state, &bob, pdf_input("theirs.pdf")).await.unwrap();
    sharing::share_file(&state, &bob, &shared.file.key, &["alice@example.com".to_string()])
        .await
        .unwrap();

    let listings = list_files(&state, &alice).unwrap();
    assert_eq!(listings.len(), 2);

    let ids: HashSet<&str> = listings.iter().map(|l| l.file.id.as_str()).collect();
    assert_eq!(ids.len(), 2, "no duplicates");
    assert!(ids.contains(own.file.id.as_str()));
    assert!(ids.contains(shared.file.id.as_str()));

    let received = listings
        .iter()
        .find(|l| l.file.id == shared.file.id)
        .unwrap();
    assert_eq!(received.shared_by_email.as_deref(), Some("bob@example.com"));

    // Bob's view annotates who he shared with
    let bob_listings = list_files(&state, &bob).unwrap();
    let sent = bob_listings
        .iter()
        .find(|l| l.file.id == shared.file.id)
        .unwrap();
    assert_eq!(sent.shared_with_emails, vec!["alice@example.com"]);
}

#[tokio::test]
async fn test_list_files_ordered_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");

    for i in 0..5 {
        create_file(&state, &alice, pdf_input(&format!("doc-{i}.pdf")))
            .await
            .unwrap();
    }

    let listings = list_files(&state, &alice).unwrap();
    assert_eq!(listings.len(), 5);
    for pair in listings.windows(2) {
        assert!(pair[0].file.created_at >= pair[1].file.created_at);
    }
}

#[tokio::test]
async fn test_download_url_requires_access() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(&dir);
    let alice = common::register_user(&state, "alice@example.com");
    let bob = common::register_user(&state, "bob@example.com");
    let carol = common::register_user(&state, "carol@example.com");

    let created = create_file(&state, &alice, pdf_input("q1.pdf")).await.unwrap();
    sharing::share_file(&state, &alice, &created.file.key, &["bob@example.com".to_string()])
        .await
        .unwrap();

    // Owner and recipient get URLs
    let url = get_download_url(&state, &alice, &created.file.key).unwrap();
    assert!(url.contains(&created.file.key));
    get_download_url(&state, &bob, &created.file.key).unwrap();

    // Strangers do not
    let result = get_download_url(&state, &carol, &created.file.key);
    assert!(matches!(result, Err(OpError::Forbidden(_))));

    // Unknown keys are NotFound, checked before any URL is issued
    let result = get_download_url(&state, &alice, "nobody/nothing.pdf");
    assert!(matches!(result, Err(OpError::NotFound(_))));
}
