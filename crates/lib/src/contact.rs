//! Contact records.
//!
//! A [`Contact`] belongs to exactly one owner. The owner is never stored on
//! the record itself: every query and mutation receives it separately from
//! the trusted caller identity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::EMPTY_SLOT_ID;

/// Identifier of a contact, unique and assigned once by storage.
pub type ContactId = u64;

/// Identifier of the user owning a set of contacts.
pub type OwnerId = u64;

/// Validation errors for contact input.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Contact name cannot be empty")]
    EmptyName,

    #[error("Contact must have at least one phone number")]
    NoPhones,

    #[error("Phone number at position {index} is empty")]
    EmptyPhone { index: usize },

    #[error("Invalid owner id: {owner_id}")]
    InvalidOwner { owner_id: OwnerId },

    #[error("Invalid contact id: {contact_id}")]
    InvalidId { contact_id: ContactId },
}

impl From<ContactError> for crate::Error {
    fn from(err: ContactError) -> Self {
        crate::Error::Contact(err)
    }
}

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Contact {
    /// An output slot that holds no row.
    pub fn empty_slot() -> Self {
        Self {
            id: EMPTY_SLOT_ID,
            name: String::new(),
            phones: Vec::new(),
            description: None,
        }
    }

    /// Whether this value marks an empty output slot rather than a row.
    pub fn is_empty_slot(&self) -> bool {
        self.id == EMPTY_SLOT_ID
    }

    /// Build a contact from validated input and a storage-assigned id.
    pub fn from_draft(id: ContactId, draft: ContactDraft) -> Self {
        Self {
            id,
            name: draft.name,
            phones: draft.phones,
            description: draft.description,
        }
    }
}

/// Caller-supplied fields of a contact, used for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub phones: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, phones: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            phones: phones.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trim whitespace and check that name and phone list are non-empty.
    ///
    /// A blank description is dropped.
    pub fn normalize(mut self) -> Result<Self, ContactError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ContactError::EmptyName);
        }

        if self.phones.is_empty() {
            return Err(ContactError::NoPhones);
        }
        for (index, phone) in self.phones.iter_mut().enumerate() {
            *phone = phone.trim().to_string();
            if phone.is_empty() {
                return Err(ContactError::EmptyPhone { index });
            }
        }

        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(self)
    }
}

/// Reject the reserved owner id and ids outside the signed 64-bit range
/// SQL storage can hold.
pub(crate) fn check_owner(owner_id: OwnerId) -> Result<(), ContactError> {
    if owner_id == 0 || owner_id > i64::MAX as u64 {
        return Err(ContactError::InvalidOwner { owner_id });
    }
    Ok(())
}

/// Reject identifiers that storage can never have assigned.
pub(crate) fn check_id(contact_id: ContactId) -> Result<(), ContactError> {
    if contact_id == EMPTY_SLOT_ID || contact_id > crate::constants::MAX_CONTACT_ID {
        return Err(ContactError::InvalidId { contact_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        let draft = ContactDraft::new("  Jane Doe ", [" +1 555 0100 ", "0912"])
            .with_description("   ")
            .normalize()
            .unwrap();
        assert_eq!(draft.name, "Jane Doe");
        assert_eq!(draft.phones, vec!["+1 555 0100", "0912"]);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        assert_eq!(
            ContactDraft::new("   ", ["1"]).normalize(),
            Err(ContactError::EmptyName)
        );
        assert_eq!(
            ContactDraft::new("Jane", Vec::<String>::new()).normalize(),
            Err(ContactError::NoPhones)
        );
        assert_eq!(
            ContactDraft::new("Jane", ["1", " "]).normalize(),
            Err(ContactError::EmptyPhone { index: 1 })
        );
    }

    #[test]
    fn test_serialization_omits_missing_description() {
        let contact = Contact::from_draft(3, ContactDraft::new("Jane", ["1"]));
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 3, "name": "Jane", "phones": ["1"] })
        );
    }

    #[test]
    fn test_empty_slot() {
        assert!(Contact::empty_slot().is_empty_slot());
        assert!(!Contact::from_draft(1, ContactDraft::new("a", ["1"])).is_empty_slot());
    }

    #[test]
    fn test_id_checks() {
        assert!(check_owner(0).is_err());
        assert!(check_owner(1).is_ok());
        assert!(check_owner(u64::MAX).is_err());
        assert!(check_id(0).is_err());
        assert!(check_id(u64::MAX).is_err());
        assert!(check_id(9).is_ok());
    }
}
