//! Persistence operations for the InMemory backend
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory contact tables to/from JSON files.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::{InMemory, StoredContact, Tables};
use crate::{
    Result,
    backend::BackendError,
    constants::{EMPTY_SLOT_ID, MAX_CONTACT_ID},
    contact::Contact,
};

/// The current persistence file format version.
const PERSISTENCE_VERSION: u8 = 1;

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout of the contact tables
#[derive(Serialize, Deserialize)]
struct PersistedTables {
    #[serde(rename = "_v", deserialize_with = "validate_persistence_version")]
    version: u8,
    next_id: u64,
    contacts: Vec<StoredContact>,
}

impl InMemory {
    /// Save the contact tables to a JSON file.
    ///
    /// The write goes to a sibling temporary file first and is then renamed
    /// over the target, so a crash never leaves a truncated file behind.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let persisted = {
            let tables = self.tables.read().await;
            PersistedTables {
                version: PERSISTENCE_VERSION,
                next_id: tables.next_id,
                contacts: tables.contacts.values().cloned().collect(),
            }
        };

        let json = serde_json::to_string_pretty(&persisted)
            .map_err(|e| BackendError::SerializationFailed { source: e })?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| BackendError::FileIo { source: e })?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| BackendError::FileIo { source: e })?;

        tracing::info!(
            path = %path.display(),
            contacts = persisted.contacts.len(),
            "Saved in-memory contacts"
        );
        Ok(())
    }

    /// Load contact tables from a JSON file written by [`save_to_file`](Self::save_to_file).
    ///
    /// The id counter is moved past the largest stored id if the file
    /// recorded a lower value.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BackendError::FileIo { source: e })?;

        let persisted: PersistedTables = serde_json::from_str(&json)
            .map_err(|e| BackendError::DeserializationFailed { source: e })?;

        let mut tables = Tables {
            next_id: persisted.next_id.max(1),
            ..Tables::default()
        };
        for stored in persisted.contacts {
            let id = stored.contact.id;
            if let Some(problem) = invalid_contact(&stored.contact) {
                return Err(BackendError::CorruptRow {
                    reason: format!("contact {id} in {}: {problem}", path.display()),
                }
                .into());
            }
            if tables.contacts.insert(id, stored).is_some() {
                return Err(BackendError::CorruptRow {
                    reason: format!("duplicate contact id {id} in {}", path.display()),
                }
                .into());
            }
            tables.next_id = tables.next_id.max(id.saturating_add(1));
        }

        tracing::info!(
            path = %path.display(),
            contacts = tables.contacts.len(),
            "Loaded in-memory contacts"
        );

        Ok(InMemory {
            tables: tokio::sync::RwLock::new(tables),
        })
    }
}

/// Describe why a loaded contact could never have been stored.
fn invalid_contact(contact: &Contact) -> Option<&'static str> {
    if contact.id == EMPTY_SLOT_ID {
        Some("reserved id")
    } else if contact.id > MAX_CONTACT_ID {
        Some("id out of range")
    } else if contact.name.trim().is_empty() {
        Some("empty name")
    } else if contact.phones.is_empty() || contact.phones.iter().any(|p| p.trim().is_empty()) {
        Some("missing phone number")
    } else {
        None
    }
}
