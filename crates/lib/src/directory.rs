//! The contact directory.
//!
//! [`Directory`] is the entry point for callers: it owns the cursor codec,
//! the page bounds and a handle to storage, and runs every request through
//! owner scoping, input validation and the storage deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use crate::backend::{BackendError, ContactStore};
use crate::config::DirectoryConfig;
use crate::contact::{self, Contact, ContactDraft, ContactId, OwnerId};
use crate::cursor::CursorCodec;
use crate::pagination::{KeysetQuery, Page, PageBounds, PageRequest, SearchMode, assemble};

/// Multi-tenant contact directory with cursor pagination.
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct Directory {
    backend: Arc<dyn ContactStore>,
    codec: CursorCodec,
    bounds: PageBounds,
    search_mode: SearchMode,
    storage_timeout: Duration,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("codec", &self.codec)
            .field("bounds", &self.bounds)
            .field("search_mode", &self.search_mode)
            .field("storage_timeout", &self.storage_timeout)
            .finish_non_exhaustive()
    }
}

impl Directory {
    /// Create a directory over `backend`.
    ///
    /// Fails with a configuration error if the cursor secret is not 16, 24
    /// or 32 bytes, the bounds are inverted or zero, or the timeout is zero.
    pub fn new(backend: Arc<dyn ContactStore>, config: &DirectoryConfig) -> Result<Self> {
        config.validate()?;

        let search_mode = if config.search.case_insensitive {
            SearchMode::CaseInsensitive
        } else {
            SearchMode::CaseSensitive
        };

        Ok(Self {
            backend,
            codec: config.cursor_codec()?,
            bounds: config.page_bounds()?,
            search_mode,
            storage_timeout: config.storage_timeout,
        })
    }

    /// The storage this directory reads and writes.
    pub fn backend(&self) -> &Arc<dyn ContactStore> {
        &self.backend
    }

    pub fn bounds(&self) -> PageBounds {
        self.bounds
    }

    /// Return one page of the requesting owner's contacts.
    ///
    /// A missing or empty cursor starts at the beginning. A cursor that does
    /// not decode is rejected with [`CursorError::InvalidCursor`]
    /// rather than silently restarting.
    ///
    /// [`CursorError::InvalidCursor`]: crate::cursor::CursorError::InvalidCursor
    pub async fn list_contacts(&self, request: &PageRequest) -> Result<Page> {
        contact::check_owner(request.owner_id)?;

        let after = match request.cursor.as_deref() {
            None => None,
            Some(cursor) => self.codec.decode(cursor).inspect_err(|err| {
                tracing::warn!(owner_id = request.owner_id, error = %err, "Rejected page cursor");
            })?,
        };
        let limit = self.bounds.resolve(request.limit);

        let query = KeysetQuery::plan(
            request.owner_id,
            after,
            request.search.as_deref(),
            limit,
            self.search_mode,
        );
        let rows = self
            .with_deadline("fetch_page", self.backend.fetch_page(&query))
            .await?;
        let page = assemble(rows, limit, &self.codec)?;

        tracing::debug!(
            owner_id = request.owner_id,
            after_id = query.after_id,
            limit,
            returned = page.contacts.len(),
            last = page.is_last(),
            "Served contact page"
        );
        Ok(page)
    }

    /// Create a contact for `owner_id`.
    pub async fn create_contact(&self, owner_id: OwnerId, draft: ContactDraft) -> Result<Contact> {
        contact::check_owner(owner_id)?;
        let draft = draft.normalize()?;

        let contact = self
            .with_deadline("insert_contact", self.backend.insert_contact(owner_id, draft))
            .await?;
        tracing::info!(owner_id, contact_id = contact.id, "Created contact");
        Ok(contact)
    }

    pub async fn get_contact(&self, owner_id: OwnerId, contact_id: ContactId) -> Result<Contact> {
        contact::check_owner(owner_id)?;
        contact::check_id(contact_id)?;

        self.with_deadline("get_contact", self.backend.get_contact(owner_id, contact_id))
            .await
    }

    /// Replace the fields of one of `owner_id`'s contacts. The id never changes.
    pub async fn update_contact(
        &self,
        owner_id: OwnerId,
        contact_id: ContactId,
        draft: ContactDraft,
    ) -> Result<Contact> {
        contact::check_owner(owner_id)?;
        contact::check_id(contact_id)?;
        let draft = draft.normalize()?;

        let contact = self
            .with_deadline(
                "update_contact",
                self.backend.update_contact(owner_id, contact_id, draft),
            )
            .await?;
        tracing::info!(owner_id, contact_id, "Updated contact");
        Ok(contact)
    }

    pub async fn delete_contact(&self, owner_id: OwnerId, contact_id: ContactId) -> Result<()> {
        contact::check_owner(owner_id)?;
        contact::check_id(contact_id)?;

        self.with_deadline(
            "delete_contact",
            self.backend.delete_contact(owner_id, contact_id),
        )
        .await?;
        tracing::info!(owner_id, contact_id, "Deleted contact");
        Ok(())
    }

    /// Total number of contacts across all owners.
    pub async fn count_contacts(&self) -> Result<u64> {
        self.with_deadline("count_contacts", self.backend.count_contacts())
            .await
    }

    /// Run a storage call under the configured deadline.
    async fn with_deadline<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(self.storage_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(operation, timeout_ms, "Storage deadline exceeded");
                Err(BackendError::StorageTimeout {
                    operation: operation.to_string(),
                    timeout_ms,
                }
                .into())
            }
        }
    }
}
