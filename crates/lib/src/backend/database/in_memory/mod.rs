//! In-memory contact storage
//!
//! This module provides an in-memory implementation of the [`ContactStore`]
//! trait, suitable for testing, development, or single-node deployments where
//! the whole directory fits in memory. State can be saved to and loaded from
//! a JSON file (see [`InMemory::save_to_file`]).

mod persistence;

use std::any::Any;
use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{BackendError, ContactStore};
use crate::constants::MAX_CONTACT_ID;
use crate::contact::{Contact, ContactDraft, ContactId, OwnerId};
use crate::pagination::KeysetQuery;

/// A contact together with the owner it is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredContact {
    pub(crate) owner_id: OwnerId,
    pub(crate) contact: Contact,
}

/// Contacts keyed by id, plus the next id to assign.
#[derive(Debug, Clone)]
pub(crate) struct Tables {
    pub(crate) contacts: BTreeMap<ContactId, StoredContact>,
    pub(crate) next_id: ContactId,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            contacts: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// A simple in-memory backend using an ordered map for storage.
///
/// Contacts are kept in id order, so a keyset page is a range scan starting
/// just past the cursor position. Identifiers come from a counter that starts
/// at 1 and only moves forward, even across deletes.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) tables: RwLock<Tables>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of all stored contacts of an owner, in ascending order.
    pub async fn contact_ids(&self, owner_id: OwnerId) -> Vec<ContactId> {
        let tables = self.tables.read().await;
        tables
            .contacts
            .values()
            .filter(|stored| stored.owner_id == owner_id)
            .map(|stored| stored.contact.id)
            .collect()
    }

    fn not_found(owner_id: OwnerId, contact_id: ContactId) -> crate::Error {
        BackendError::ContactNotFound {
            owner_id,
            contact_id,
        }
        .into()
    }
}

#[async_trait]
impl ContactStore for InMemory {
    async fn fetch_page(&self, query: &KeysetQuery) -> Result<Vec<Contact>> {
        let tables = self.tables.read().await;
        let page = tables
            .contacts
            .range((Bound::Excluded(query.after_id), Bound::Unbounded))
            .map(|(_, stored)| stored)
            .filter(|stored| query.matches(stored.owner_id, &stored.contact))
            .take(query.limit as usize)
            .map(|stored| stored.contact.clone())
            .collect();
        Ok(page)
    }

    async fn insert_contact(&self, owner_id: OwnerId, draft: ContactDraft) -> Result<Contact> {
        let mut tables = self.tables.write().await;

        let id = tables.next_id;
        if id > MAX_CONTACT_ID {
            return Err(BackendError::IdSpaceExhausted.into());
        }
        tables.next_id = id + 1;

        let contact = Contact::from_draft(id, draft);
        tables.contacts.insert(
            id,
            StoredContact {
                owner_id,
                contact: contact.clone(),
            },
        );
        Ok(contact)
    }

    async fn get_contact(&self, owner_id: OwnerId, contact_id: ContactId) -> Result<Contact> {
        let tables = self.tables.read().await;
        match tables.contacts.get(&contact_id) {
            Some(stored) if stored.owner_id == owner_id => Ok(stored.contact.clone()),
            _ => Err(Self::not_found(owner_id, contact_id)),
        }
    }

    async fn update_contact(
        &self,
        owner_id: OwnerId,
        contact_id: ContactId,
        draft: ContactDraft,
    ) -> Result<Contact> {
        let mut tables = self.tables.write().await;
        match tables.contacts.get_mut(&contact_id) {
            Some(stored) if stored.owner_id == owner_id => {
                stored.contact = Contact::from_draft(contact_id, draft);
                Ok(stored.contact.clone())
            }
            _ => Err(Self::not_found(owner_id, contact_id)),
        }
    }

    async fn delete_contact(&self, owner_id: OwnerId, contact_id: ContactId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .contacts
            .get(&contact_id)
            .is_some_and(|stored| stored.owner_id == owner_id);
        if !owned {
            return Err(Self::not_found(owner_id, contact_id));
        }

        tables.contacts.remove(&contact_id);
        Ok(())
    }

    async fn count_contacts(&self) -> Result<u64> {
        Ok(self.tables.read().await.contacts.len() as u64)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
