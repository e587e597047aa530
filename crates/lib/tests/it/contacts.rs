//! Contact CRUD through the Directory.

use std::sync::Arc;
use std::time::Duration;

use phonebook::{ContactDraft, Directory, PageRequest, backend::database::InMemory};

use crate::helpers::*;

#[tokio::test]
async fn test_create_get_update_delete() {
    let dir = test_directory().await;

    let created = dir
        .create_contact(
            1,
            ContactDraft::new("Jane Doe", ["+1 555 0100", "0912 000 0000"])
                .with_description("college friend"),
        )
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(dir.get_contact(1, created.id).await.unwrap(), created);

    let updated = dir
        .update_contact(1, created.id, ContactDraft::new("Jane Roe", ["+1 555 0199"]))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Jane Roe");
    assert_eq!(updated.description, None);

    dir.delete_contact(1, created.id).await.unwrap();
    assert!(dir.get_contact(1, created.id).await.unwrap_err().is_not_found());
    assert!(
        dir.delete_contact(1, created.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_other_owners_contacts_are_invisible() {
    let dir = test_directory().await;
    let theirs = dir
        .create_contact(2, ContactDraft::new("Private", ["1"]))
        .await
        .unwrap();

    assert!(dir.get_contact(1, theirs.id).await.unwrap_err().is_not_found());
    assert!(
        dir.update_contact(1, theirs.id, ContactDraft::new("x", ["1"]))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        dir.delete_contact(1, theirs.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert_eq!(dir.get_contact(2, theirs.id).await.unwrap().name, "Private");
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let dir = test_directory().await;

    for draft in [
        ContactDraft::new(" ", ["1"]),
        ContactDraft::new("Jane", Vec::<String>::new()),
        ContactDraft::new("Jane", ["1", ""]),
    ] {
        let err = dir.create_contact(1, draft).await.unwrap_err();
        assert!(err.is_client_error());
    }
    assert_eq!(dir.count_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_count_spans_owners() {
    let dir = test_directory().await;
    seed(&dir, 1, "a", 3).await;
    seed(&dir, 2, "b", 4).await;
    assert_eq!(dir.count_contacts().await.unwrap(), 7);
}

#[tokio::test]
async fn test_slow_storage_times_out() {
    let mut config = test_config();
    config.storage_timeout = Duration::from_millis(20);
    let store = SlowStore {
        inner: InMemory::new(),
        delay: Duration::from_millis(500),
    };
    let dir = Directory::new(Arc::new(store), &config).unwrap();

    let err = dir.list_contacts(&PageRequest::new(1)).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(!err.is_client_error());

    let err = dir
        .create_contact(1, ContactDraft::new("Jane", ["1"]))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}
