use bytes::Bytes;
use fileshare::object_store::{derive_key, LocalStore, ObjectStore, ObjectStoreError};

fn test_store(dir: &tempfile::TempDir) -> LocalStore {
    LocalStore::new(dir.path(), "http://localhost:8080", "test-secret", 3600).unwrap()
}

/// Pull the expires/token query parameters out of a capability URL.
fn parse_capability(url: &str) -> (i64, String) {
    let query = url.split_once('?').expect("URL should have a query").1;
    let mut expires = None;
    let mut token = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("expires", v)) => expires = Some(v.parse().unwrap()),
            Some(("token", v)) => token = Some(v.to_string()),
            _ => {}
        }
    }
    (expires.unwrap(), token.unwrap())
}

#[tokio::test]
async fn test_local_store_put_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let data = Bytes::from("hello world");
    store.put("u1/test.txt", data.clone()).await.unwrap();

    let retrieved = store.get("u1/test.txt").await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_exists_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    assert!(!store.exists("u1/missing.bin").await.unwrap());

    store.put("u1/present.bin", Bytes::from("data")).await.unwrap();
    assert!(store.exists("u1/present.bin").await.unwrap());

    store.delete("u1/present.bin").await.unwrap();
    assert!(!store.exists("u1/present.bin").await.unwrap());

    // Deleting a nonexistent key should not error
    store.delete("u1/present.bin").await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let result = store.get("u1/missing.bin").await;
    assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_rejects_traversal_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    for key in ["../escape", "a/../b", "/rooted", "a//b", ""] {
        assert!(
            matches!(store.get(key).await, Err(ObjectStoreError::InvalidKey(_))),
            "key {key:?} should be rejected"
        );
    }
}

#[test]
fn test_capability_url_shape() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let url = store.issue_upload_url("u1/doc.pdf", "application/pdf").unwrap();
    assert!(url.starts_with("http://localhost:8080/objects/u1/doc.pdf?"));
    assert!(url.contains("expires="));
    assert!(url.contains("token="));
}

#[test]
fn test_capability_token_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let url = store.issue_upload_url("u1/doc.pdf", "application/pdf").unwrap();
    let (expires, token) = parse_capability(&url);

    assert!(store.verify_token("PUT", "u1/doc.pdf", expires, &token));

    // Wrong method, wrong key, or shifted expiry all invalidate the token
    assert!(!store.verify_token("GET", "u1/doc.pdf", expires, &token));
    assert!(!store.verify_token("PUT", "u1/other.pdf", expires, &token));
    assert!(!store.verify_token("PUT", "u1/doc.pdf", expires + 1, &token));
}

#[test]
fn test_expired_capability_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let past = chrono::Utc::now().timestamp() - 60;
    assert!(!store.verify_token("GET", "u1/doc.pdf", past, "whatever"));
}

#[test]
fn test_download_and_upload_tokens_differ() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let up = store.issue_upload_url("u1/doc.pdf", "application/pdf").unwrap();
    let down = store.issue_download_url("u1/doc.pdf").unwrap();
    let (_, up_token) = parse_capability(&up);
    let (down_expires, down_token) = parse_capability(&down);

    assert_ne!(up_token, down_token);
    assert!(store.verify_token("GET", "u1/doc.pdf", down_expires, &down_token));
}

#[test]
fn test_derive_key_shape_and_uniqueness() {
    let key = derive_key("user-1", "application/pdf");
    assert!(key.starts_with("user-1/"));
    assert!(key.ends_with(".pdf"));

    let other = derive_key("user-1", "application/pdf");
    assert_ne!(key, other, "fresh keys must be unique");

    // Unknown MIME types fall back to a generic extension
    let fallback = derive_key("user-1", "application/x-fileshare-custom");
    assert!(fallback.ends_with(".bin"));
}
