//! Storage backends for contacts.
//!
//! The [`ContactStore`] trait is the narrow contract the directory consumes:
//! owner-scoped CRUD plus a keyset page fetch. The directory logic is
//! independent of the storage engine behind it.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::contact::{Contact, ContactDraft, ContactId, OwnerId};
use crate::pagination::KeysetQuery;

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Storage contract for contacts.
///
/// Every operation is scoped to one owner. Implementations must assign
/// identifiers starting at 1, never reuse them, and never change the
/// identifier of an existing contact.
///
/// All implementations must be `Send` and `Sync` to allow sharing across
/// requests, and implement `Any` to allow for downcasting if needed.
#[async_trait]
pub trait ContactStore: Send + Sync + Any {
    /// Fetch up to `query.limit` contacts matching the query, in ascending id
    /// order.
    ///
    /// Fewer rows than the limit may be returned. Implementations that fill
    /// fixed-size buffers may pad the tail with
    /// [`Contact::empty_slot`]; the page assembler discards those.
    async fn fetch_page(&self, query: &KeysetQuery) -> Result<Vec<Contact>>;

    /// Store a new contact and return it with its assigned id.
    async fn insert_contact(&self, owner_id: OwnerId, draft: ContactDraft) -> Result<Contact>;

    /// Get one contact of an owner.
    async fn get_contact(&self, owner_id: OwnerId, contact_id: ContactId) -> Result<Contact>;

    /// Replace name, phones and description of an existing contact.
    async fn update_contact(
        &self,
        owner_id: OwnerId,
        contact_id: ContactId,
        draft: ContactDraft,
    ) -> Result<Contact>;

    /// Delete one contact of an owner.
    async fn delete_contact(&self, owner_id: OwnerId, contact_id: ContactId) -> Result<()>;

    /// Total number of stored contacts across all owners.
    async fn count_contacts(&self) -> Result<u64>;

    /// Returns a reference to the backend as a `dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
