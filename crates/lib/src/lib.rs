//!
//! PhoneBook: a multi-tenant contact directory with opaque cursor pagination.
//!
//! ## Core Concepts
//!
//! * **Contacts (`contact::Contact`)**: A name, one or more phone numbers and an optional
//!   description, owned by exactly one user and identified by a storage-assigned id that
//!   starts at 1 and is never reused.
//! * **Cursors (`cursor::CursorCodec`)**: The position of the next page, encrypted with a
//!   server-held AES key under a fresh random IV and encoded as URL-safe base64. Clients
//!   cannot read or meaningfully forge them.
//! * **Pagination (`pagination`)**: Keyset pagination over ascending ids. A page request is
//!   decoded, bounded, planned as `id > last_seen ORDER BY id LIMIT n` and assembled into
//!   contacts plus the next cursor. No per-client state lives on the server.
//! * **Backends (`backend::ContactStore`)**: Pluggable storage; an in-memory store with JSON
//!   persistence and sqlx-based SQLite/PostgreSQL stores are provided.
//! * **Directory (`directory::Directory`)**: The entry point tying it together, scoping every
//!   operation to the trusted caller identity and enforcing a storage deadline.

pub mod backend;
pub mod config;
pub mod constants;
pub mod contact;
pub mod cursor;
pub mod directory;
pub mod pagination;

pub use config::DirectoryConfig;
pub use contact::{Contact, ContactDraft, ContactId, OwnerId};
pub use cursor::{CursorCodec, CursorScheme};
pub use directory::Directory;
pub use pagination::{Page, PageRequest};

/// Result type used throughout the PhoneBook library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the PhoneBook library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured cursor errors from the cursor module
    #[error(transparent)]
    Cursor(cursor::CursorError),

    /// Configuration errors, raised at startup
    #[error(transparent)]
    Config(config::ConfigError),

    /// Contact input validation errors
    #[error(transparent)]
    Contact(contact::ContactError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Cursor(_) => "cursor",
            Error::Config(_) => "config",
            Error::Contact(_) => "contact",
            Error::Backend(_) => "backend",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error was caused by a malformed or forged cursor.
    pub fn is_invalid_cursor(&self) -> bool {
        match self {
            Error::Cursor(cursor_err) => cursor_err.is_invalid_cursor(),
            _ => false,
        }
    }

    /// Check if this error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Cursor(cursor_err) => cursor_err.is_invalid_cursor(),
            Error::Contact(_) => true,
            _ => false,
        }
    }

    /// Check if this error is an invalid configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if a storage deadline was exceeded.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_timeout(),
            _ => false,
        }
    }

    /// Check if storage failed to serve the request.
    ///
    /// Missing contacts and deadline expiry are reported separately.
    pub fn is_storage_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => !backend_err.is_not_found() && !backend_err.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
