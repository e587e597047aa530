use std::sync::Arc;

use phonebook::{ContactDraft, Directory, PageRequest, backend::database::InMemory};

use crate::helpers::*;

#[tokio::test]
async fn test_persistence_keeps_pagination_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.json");

    let backend = Arc::new(InMemory::new());
    let directory = Directory::new(backend.clone(), &test_config()).unwrap();
    seed(&directory, 1, "c", 20).await;
    let first = directory.list_contacts(&PageRequest::new(1)).await.unwrap();
    backend.save_to_file(&path).await.unwrap();

    // A cursor issued before a restart stays valid afterwards.
    let reloaded = Arc::new(InMemory::load_from_file(&path).await.unwrap());
    let directory = Directory::new(reloaded, &test_config()).unwrap();
    let second = directory
        .list_contacts(&PageRequest::new(1).with_cursor(first.cursor))
        .await
        .unwrap();
    assert_eq!(second.contacts.len(), 8);
    assert_eq!(second.contacts[0].id, first.contacts[11].id + 1);
    assert!(second.is_last());
}

#[tokio::test]
async fn test_downcast_from_directory() {
    let directory = Directory::new(Arc::new(InMemory::new()), &test_config()).unwrap();
    directory
        .create_contact(3, ContactDraft::new("Jane", ["1"]))
        .await
        .unwrap();

    let in_memory = directory
        .backend()
        .as_any()
        .downcast_ref::<InMemory>()
        .expect("backend should be InMemory");
    assert_eq!(in_memory.contact_ids(3).await, vec![1]);
}
