//! Storage error types for the PhoneBook backends.
//!
//! This module defines structured error types for storage operations,
//! providing better error context and type safety compared to string-based errors.

use thiserror::Error;

use crate::contact::{ContactId, OwnerId};

/// Errors that can occur during storage operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// No contact with this id exists for this owner.
    ///
    /// Contacts of other owners are reported the same way as missing ones.
    #[error("Contact {contact_id} not found for owner {owner_id}")]
    ContactNotFound {
        /// The owner the lookup was scoped to
        owner_id: OwnerId,
        /// The requested contact id
        contact_id: ContactId,
    },

    /// A storage round-trip exceeded its deadline.
    #[error("Storage operation '{operation}' timed out after {timeout_ms} ms")]
    StorageTimeout {
        /// Name of the operation that timed out
        operation: String,
        /// The deadline that was exceeded
        timeout_ms: u64,
    },

    /// Storage could not serve the request.
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable {
        /// Description of the failure
        reason: String,
    },

    /// SQL driver error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context for the failing statement
        reason: String,
        /// The underlying driver error
        #[source]
        source: Option<sqlx::Error>,
    },

    /// A stored row violates the contact invariants.
    #[error("Corrupt contact row: {reason}")]
    CorruptRow {
        /// Description of the violation
        reason: String,
    },

    /// No identifiers left to assign.
    #[error("Contact id space exhausted")]
    IdSpaceExhausted,

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::ContactNotFound { .. })
    }

    /// Check if this error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::StorageTimeout { .. })
    }

    /// Check if this error indicates stored data is unreadable.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            BackendError::CorruptRow { .. } | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Get the contact id if this error is about a specific contact.
    pub fn contact_id(&self) -> Option<ContactId> {
        match self {
            BackendError::ContactNotFound { contact_id, .. } => Some(*contact_id),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
