//! Error types for the cursor codec
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// The cursor could not be decoded, decrypted or parsed.
    ///
    /// Cursors are client input, so this is a client error and never fatal.
    #[error("Invalid cursor: {reason}")]
    InvalidCursor { reason: String },

    /// Encryption of a cursor payload failed.
    #[error("Cursor encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// The identifier cannot be carried by a cursor.
    #[error("Identifier {id} cannot be encoded as a cursor")]
    UnencodableId { id: u64 },
}

impl CursorError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CursorError::InvalidCursor {
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by a malformed or forged cursor.
    pub fn is_invalid_cursor(&self) -> bool {
        matches!(self, CursorError::InvalidCursor { .. })
    }
}

impl From<CursorError> for crate::Error {
    fn from(err: CursorError) -> Self {
        crate::Error::Cursor(err)
    }
}
