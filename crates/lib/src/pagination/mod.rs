//! Keyset pagination over an owner's contacts.
//!
//! A page request flows through four stages:
//!
//! 1. [`CursorCodec`](crate::cursor::CursorCodec) decodes the client cursor
//!    into the last-seen identifier.
//! 2. [`PageBounds`] clamps the requested page size.
//! 3. [`KeysetQuery`] describes the fetch of the next `limit` rows with
//!    `id > last_seen`, optionally filtered by a name substring.
//! 4. [`assemble`] trims the fetched rows and derives the next cursor.
//!
//! No state is kept between pages; the cursor string is the whole position.

mod assembler;
mod bounds;
mod planner;

pub use assembler::assemble;
pub use bounds::{PageBounds, clamp};
pub use planner::{
    ContactRow, KeysetQuery, SearchMode, SqlDialect, SqlParam, Statement, map_row,
};

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, OwnerId};

/// A request for one page of an owner's contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Trusted caller identity; never taken from the cursor.
    pub owner_id: OwnerId,
    pub cursor: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl PageRequest {
    /// First page, default size, no filter.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            cursor: None,
            search: None,
            limit: None,
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of contacts in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Opaque position of the next page; empty once exhausted.
    pub cursor: String,
    pub contacts: Vec<Contact>,
}

impl Page {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no further pages follow.
    pub fn is_last(&self) -> bool {
        self.cursor.is_empty()
    }
}
