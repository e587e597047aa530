//! Keyset pagination through the Directory.

use phonebook::{ContactDraft, PageRequest, pagination::clamp};

use crate::helpers::*;

#[test]
fn test_clamp_defaults() {
    for x in [-5, 0, 5, 11] {
        assert_eq!(clamp(x, 12, 48), 12);
    }
    for x in [12, 30, 48] {
        assert_eq!(clamp(x, 12, 48), x);
    }
    for x in [49, 1000] {
        assert_eq!(clamp(x, 12, 48), 48);
    }
}

#[tokio::test]
async fn test_empty_owner_is_not_an_error() {
    let dir = test_directory().await;

    let page = dir.list_contacts(&PageRequest::new(7)).await.unwrap();
    assert!(page.contacts.is_empty());
    assert!(page.cursor.is_empty());
}

#[tokio::test]
async fn test_partial_page_ends_pagination() {
    let dir = test_directory().await;
    let created = seed(&dir, 1, "c", 5).await;

    let page = dir
        .list_contacts(&PageRequest::new(1).with_limit(3))
        .await
        .unwrap();
    // Clamped up to the default minimum of 12.
    assert_eq!(page.contacts, created);
    assert!(page.is_last());
}

#[tokio::test]
async fn test_keyset_monotonicity() {
    let dir = test_directory().await;
    let mine = seed(&dir, 1, "mine", 40).await;
    seed(&dir, 2, "theirs", 15).await;

    let pages = collect_pages(&dir, PageRequest::new(1).with_limit(12)).await;
    let seen = ids(&pages);

    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    let expected: Vec<u64> = mine.iter().map(|c| c.id).collect();
    assert_eq!(seen, expected);

    for page in &pages[..pages.len() - 1] {
        assert_eq!(page.contacts.len(), 12);
        assert!(!page.cursor.is_empty());
    }
    assert_eq!(pages.last().unwrap().contacts.len(), 4);
}

#[tokio::test]
async fn test_exact_multiple_ends_with_empty_page() {
    let dir = test_directory().await;
    seed(&dir, 1, "c", 24).await;

    let pages = collect_pages(&dir, PageRequest::new(1)).await;
    let sizes: Vec<usize> = pages.iter().map(|p| p.contacts.len()).collect();
    assert_eq!(sizes, vec![12, 12, 0]);
    assert!(pages[2].cursor.is_empty());
}

#[tokio::test]
async fn test_limit_is_capped_at_max() {
    let dir = test_directory().await;
    seed(&dir, 1, "c", 60).await;

    let page = dir
        .list_contacts(&PageRequest::new(1).with_limit(1000))
        .await
        .unwrap();
    assert_eq!(page.contacts.len(), 48);
    assert!(!page.is_last());
}

#[tokio::test]
async fn test_search_filters_by_substring() {
    let dir = test_directory().await;
    let names = [
        "Jane Doe", "John", "Mary Jane", "jane lower", "Janet", "Bob", "Ann Jane",
    ];
    let mut created = Vec::new();
    for name in names {
        created.push(
            dir.create_contact(1, ContactDraft::new(name, ["1"]))
                .await
                .unwrap(),
        );
    }
    dir.create_contact(2, ContactDraft::new("Jane Elsewhere", ["1"]))
        .await
        .unwrap();

    let pages = collect_pages(&dir, PageRequest::new(1).with_search("Jane")).await;
    let found: Vec<&str> = pages
        .iter()
        .flat_map(|p| p.contacts.iter().map(|c| c.name.as_str()))
        .collect();
    assert_eq!(found, vec!["Jane Doe", "Mary Jane", "Janet", "Ann Jane"]);
    assert!(ids(&pages).windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_search_follows_cursor_mechanics() {
    let dir = test_directory().await;
    for i in 0..30 {
        let name = if i % 2 == 0 {
            format!("Jane {i}")
        } else {
            format!("Other {i}")
        };
        dir.create_contact(1, ContactDraft::new(name, ["1"]))
            .await
            .unwrap();
    }

    let pages = collect_pages(&dir, PageRequest::new(1).with_search("Jane")).await;
    let sizes: Vec<usize> = pages.iter().map(|p| p.contacts.len()).collect();
    assert_eq!(sizes, vec![12, 3]);
    assert!(
        pages
            .iter()
            .flat_map(|p| &p.contacts)
            .all(|c| c.name.contains("Jane"))
    );
}

#[tokio::test]
async fn test_case_insensitive_search() {
    let mut config = test_config();
    config.search.case_insensitive = true;
    let dir = test_directory_with(config).await;
    for name in ["JANE", "jane", "Bob"] {
        dir.create_contact(1, ContactDraft::new(name, ["1"]))
            .await
            .unwrap();
    }

    let page = dir
        .list_contacts(&PageRequest::new(1).with_search("Jane"))
        .await
        .unwrap();
    assert_eq!(page.contacts.len(), 2);
}

#[tokio::test]
async fn test_pages_stable_under_concurrent_changes() {
    let dir = test_directory().await;
    let created = seed(&dir, 1, "c", 30).await;

    let first = dir.list_contacts(&PageRequest::new(1)).await.unwrap();
    let last_seen = first.contacts.last().unwrap().id;

    // Delete an already-seen row and one not yet seen, then append.
    dir.delete_contact(1, created[0].id).await.unwrap();
    dir.delete_contact(1, created[20].id).await.unwrap();
    let appended = dir
        .create_contact(1, ContactDraft::new("late", ["1"]))
        .await
        .unwrap();

    let rest = collect_pages(&dir, PageRequest::new(1).with_cursor(first.cursor.clone())).await;
    let rest_ids = ids(&rest);

    assert!(rest_ids.iter().all(|id| *id > last_seen));
    assert!(!rest_ids.contains(&created[20].id));
    assert_eq!(rest_ids.last(), Some(&appended.id));
    assert_eq!(rest_ids.len(), 30 - 12 - 1 + 1);
}

#[tokio::test]
async fn test_owner_identity_is_not_taken_from_cursor() {
    let dir = test_directory().await;
    seed(&dir, 1, "a", 20).await;
    let theirs = seed(&dir, 2, "b", 20).await;

    let page = dir.list_contacts(&PageRequest::new(1)).await.unwrap();

    // Owner 2 replaying owner 1's cursor still only sees their own rows.
    let replay = dir
        .list_contacts(&PageRequest::new(2).with_cursor(page.cursor))
        .await
        .unwrap();
    let their_ids: Vec<u64> = theirs.iter().map(|c| c.id).collect();
    assert!(replay.contacts.iter().all(|c| their_ids.contains(&c.id)));
}
