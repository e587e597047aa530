//! Cursor handling through the Directory.

use phonebook::{
    CursorCodec, CursorScheme, PageRequest,
    cursor::CursorError,
};

use crate::helpers::*;

#[tokio::test]
async fn test_garbage_cursor_is_rejected() {
    let dir = test_directory().await;
    seed(&dir, 1, "c", 3).await;

    for cursor in ["not a cursor", "AAAA", "%%%%", "////"] {
        let err = dir
            .list_contacts(&PageRequest::new(1).with_cursor(cursor))
            .await
            .unwrap_err();
        assert!(err.is_invalid_cursor(), "{cursor}: {err}");
        assert!(err.is_client_error());
    }
}

#[tokio::test]
async fn test_cursor_from_other_secret_is_not_trusted() {
    let dir = test_directory().await;
    seed(&dir, 1, "c", 20).await;

    let foreign = CursorCodec::new("fedcba9876543210", CursorScheme::Stream).unwrap();
    let cursor = foreign.encode(5).unwrap();

    // A stream cursor under another key decrypts to noise: rejected or
    // some other position, never a crash.
    match dir
        .list_contacts(&PageRequest::new(1).with_cursor(cursor))
        .await
    {
        Ok(page) => assert!(page.contacts.len() <= 12),
        Err(err) => assert!(err.is_invalid_cursor()),
    }
}

#[tokio::test]
async fn test_authenticated_cursors_reject_tampering() {
    let mut config = test_config();
    config.cursor.scheme = CursorScheme::Authenticated;
    let dir = test_directory_with(config).await;
    seed(&dir, 1, "c", 20).await;

    let page = dir.list_contacts(&PageRequest::new(1)).await.unwrap();
    let mut bytes = page.cursor.clone().into_bytes();
    let mid = bytes.len() / 2;
    bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    let err = dir
        .list_contacts(&PageRequest::new(1).with_cursor(tampered))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        phonebook::Error::Cursor(CursorError::InvalidCursor { .. })
    ));

    let next = dir
        .list_contacts(&PageRequest::new(1).with_cursor(page.cursor))
        .await
        .unwrap();
    assert_eq!(next.contacts.len(), 8);
}

#[tokio::test]
async fn test_cursors_differ_between_identical_requests() {
    let dir = test_directory().await;
    seed(&dir, 1, "c", 20).await;

    let a = dir.list_contacts(&PageRequest::new(1)).await.unwrap();
    let b = dir.list_contacts(&PageRequest::new(1)).await.unwrap();
    assert_eq!(a.contacts, b.contacts);
    assert_ne!(a.cursor, b.cursor);

    let next_a = dir
        .list_contacts(&PageRequest::new(1).with_cursor(a.cursor))
        .await
        .unwrap();
    let next_b = dir
        .list_contacts(&PageRequest::new(1).with_cursor(b.cursor))
        .await
        .unwrap();
    assert_eq!(next_a.contacts, next_b.contacts);
}
