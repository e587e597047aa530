use std::sync::Arc;

use phonebook::{
    ContactDraft, Directory, PageRequest,
    backend::{ContactStore, database::Sqlite},
};

use crate::helpers::*;

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.db");

    let first_cursor = {
        let backend = Arc::new(Sqlite::open_sqlite(&path).await.unwrap());
        let directory = Directory::new(backend, &test_config()).unwrap();
        seed(&directory, 1, "c", 15).await;
        directory
            .list_contacts(&PageRequest::new(1))
            .await
            .unwrap()
            .cursor
    };

    let backend = Arc::new(Sqlite::open_sqlite(&path).await.unwrap());
    assert_eq!(backend.count_contacts().await.unwrap(), 15);

    let directory = Directory::new(backend, &test_config()).unwrap();
    let page = directory
        .list_contacts(&PageRequest::new(1).with_cursor(first_cursor))
        .await
        .unwrap();
    assert_eq!(page.contacts.len(), 3);
    assert!(page.is_last());
}

#[tokio::test]
async fn test_deleted_tail_id_is_not_reassigned() {
    let backend = Arc::new(Sqlite::sqlite_in_memory().await.unwrap());
    let directory = Directory::new(backend, &test_config()).unwrap();

    let created = seed(&directory, 1, "c", 3).await;
    directory.delete_contact(1, created[2].id).await.unwrap();
    let next = directory
        .create_contact(1, ContactDraft::new("next", ["1"]))
        .await
        .unwrap();
    assert!(next.id > created[2].id);
}

#[tokio::test]
async fn test_search_matches_in_memory() {
    let backend = Arc::new(Sqlite::sqlite_in_memory().await.unwrap());
    let directory = Directory::new(backend, &test_config()).unwrap();
    for name in ["Jane Doe", "john", "Mary Jane", "JANE"] {
        directory
            .create_contact(1, ContactDraft::new(name, ["1"]))
            .await
            .unwrap();
    }

    let page = directory
        .list_contacts(&PageRequest::new(1).with_search("Jane"))
        .await
        .unwrap();
    let names: Vec<&str> = page.contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Jane Doe", "Mary Jane"]);
}
