use std::sync::Arc;
use std::time::Duration;

use phonebook::{
    Contact, ContactDraft, Directory, DirectoryConfig, OwnerId, Page, PageRequest,
    backend::{ContactStore, database::InMemory},
};

/// Cursor secret used by every test directory (16 bytes, AES-128).
pub const TEST_SECRET: &str = "0123456789abcdef";

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// # Run tests with SQLite
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// # Run tests with PostgreSQL
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/phonebook_test" \
///   cargo test --features postgres
/// ```
pub async fn test_backend() -> Arc<dyn ContactStore> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use phonebook::backend::database::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use phonebook::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/phonebook_test".to_string());
                Arc::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        _ => Arc::new(InMemory::new()),
    }
}

/// Default configuration for tests.
pub fn test_config() -> DirectoryConfig {
    DirectoryConfig::with_secret(TEST_SECRET)
}

/// Directory over a fresh test backend with default configuration.
pub async fn test_directory() -> Directory {
    test_directory_with(test_config()).await
}

/// Directory over a fresh test backend with the given configuration.
pub async fn test_directory_with(config: DirectoryConfig) -> Directory {
    Directory::new(test_backend().await, &config).expect("Failed to create directory")
}

// ==========================
// DATA HELPERS
// ==========================

/// Create `count` contacts for `owner` named `{prefix}-{i}` and return them.
pub async fn seed(dir: &Directory, owner: OwnerId, prefix: &str, count: usize) -> Vec<Contact> {
    let mut created = Vec::with_capacity(count);
    for i in 0..count {
        let contact = dir
            .create_contact(
                owner,
                ContactDraft::new(format!("{prefix}-{i}"), [format!("555-{i:04}")]),
            )
            .await
            .expect("Failed to create contact");
        created.push(contact);
    }
    created
}

/// Follow cursors from the first page until an empty cursor, collecting every page.
pub async fn collect_pages(dir: &Directory, request: PageRequest) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut request = request;
    loop {
        let page = dir
            .list_contacts(&request)
            .await
            .expect("Failed to list contacts");
        let cursor = page.cursor.clone();
        pages.push(page);
        if cursor.is_empty() {
            return pages;
        }
        request = request.with_cursor(cursor);
        assert!(pages.len() < 10_000, "pagination did not terminate");
    }
}

/// Ids of every contact across all pages, in page order.
pub fn ids(pages: &[Page]) -> Vec<u64> {
    pages
        .iter()
        .flat_map(|page| page.contacts.iter().map(|c| c.id))
        .collect()
}

/// A store that sleeps before every operation, for deadline tests.
pub struct SlowStore {
    pub inner: InMemory,
    pub delay: Duration,
}

#[async_trait::async_trait]
impl ContactStore for SlowStore {
    async fn fetch_page(
        &self,
        query: &phonebook::pagination::KeysetQuery,
    ) -> phonebook::Result<Vec<Contact>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_page(query).await
    }

    async fn insert_contact(
        &self,
        owner_id: OwnerId,
        draft: ContactDraft,
    ) -> phonebook::Result<Contact> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert_contact(owner_id, draft).await
    }

    async fn get_contact(&self, owner_id: OwnerId, contact_id: u64) -> phonebook::Result<Contact> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_contact(owner_id, contact_id).await
    }

    async fn update_contact(
        &self,
        owner_id: OwnerId,
        contact_id: u64,
        draft: ContactDraft,
    ) -> phonebook::Result<Contact> {
        tokio::time::sleep(self.delay).await;
        self.inner.update_contact(owner_id, contact_id, draft).await
    }

    async fn delete_contact(&self, owner_id: OwnerId, contact_id: u64) -> phonebook::Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_contact(owner_id, contact_id).await
    }

    async fn count_contacts(&self) -> phonebook::Result<u64> {
        tokio::time::sleep(self.delay).await;
        self.inner.count_contacts().await
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
