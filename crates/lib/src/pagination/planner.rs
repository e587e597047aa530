//! Keyset query planning.
//!
//! A [`KeysetQuery`] describes one page fetch: owner scope, exclusive lower
//! bound on the identifier, optional name substring, ascending order and an
//! exact row limit. Backends either evaluate it directly
//! ([`KeysetQuery::matches`]) or render it to a parameterized statement
//! ([`KeysetQuery::statement`]) and map the returned rows with [`map_row`].

use crate::Result;
use crate::backend::BackendError;
use crate::contact::{Contact, ContactId, OwnerId};

/// How the name filter compares text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    CaseSensitive,
    /// ASCII case folding only; other characters compare exactly on every
    /// backend.
    CaseInsensitive,
}

/// SQL dialect a statement is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Sqlite,
    Postgres,
}

/// Positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

/// A rendered statement with its positional bindings (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Raw row as read from a SQL backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub id: i64,
    pub name: String,
    pub phones_json: String,
    pub description: Option<String>,
}

/// One page fetch against storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetQuery {
    pub owner_id: OwnerId,
    /// Exclusive lower bound; 0 means no bound since ids start at 1.
    pub after_id: ContactId,
    /// Name substring; `None` means no filter.
    pub search: Option<String>,
    pub mode: SearchMode,
    pub limit: u32,
}

impl KeysetQuery {
    /// Plan the fetch for the page following `after`.
    ///
    /// An empty search string is treated as no filter.
    pub fn plan(
        owner_id: OwnerId,
        after: Option<ContactId>,
        search: Option<&str>,
        limit: u32,
        mode: SearchMode,
    ) -> Self {
        Self {
            owner_id,
            after_id: after.unwrap_or(0),
            search: search.filter(|s| !s.is_empty()).map(str::to_string),
            mode,
            limit,
        }
    }

    /// Whether a stored contact falls inside this query's keyset range.
    pub fn matches(&self, owner_id: OwnerId, contact: &Contact) -> bool {
        if owner_id != self.owner_id || contact.id <= self.after_id {
            return false;
        }

        match (&self.search, self.mode) {
            (None, _) => true,
            (Some(needle), SearchMode::CaseSensitive) => contact.name.contains(needle.as_str()),
            (Some(needle), SearchMode::CaseInsensitive) => contact
                .name
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
        }
    }

    /// Render the query for a SQL backend.
    pub fn statement(&self, dialect: SqlDialect) -> Statement {
        let mut sql = String::from(
            "SELECT id, name, phones_json, description FROM contacts \
             WHERE owner_id = $1 AND id > $2",
        );
        let mut params = vec![
            SqlParam::Int(self.owner_id as i64),
            SqlParam::Int(self.after_id as i64),
        ];

        if let Some(needle) = &self.search {
            let position = match dialect {
                SqlDialect::Sqlite => "instr",
                SqlDialect::Postgres => "strpos",
            };
            // SQLite's lower() folds ASCII only; Postgres does the same
            // under the "C" collation.
            let (predicate, needle) = match (self.mode, dialect) {
                (SearchMode::CaseSensitive, _) => {
                    (format!(" AND {position}(name, $3) > 0"), needle.clone())
                }
                (SearchMode::CaseInsensitive, SqlDialect::Sqlite) => (
                    format!(" AND {position}(lower(name), $3) > 0"),
                    needle.to_ascii_lowercase(),
                ),
                (SearchMode::CaseInsensitive, SqlDialect::Postgres) => (
                    format!(" AND {position}(lower(name COLLATE \"C\"), $3) > 0"),
                    needle.to_ascii_lowercase(),
                ),
            };
            sql.push_str(&predicate);
            params.push(SqlParam::Text(needle));
        }

        sql.push_str(&format!(" ORDER BY id ASC LIMIT ${}", params.len() + 1));
        params.push(SqlParam::Int(i64::from(self.limit)));

        Statement { sql, params }
    }
}

/// Map a raw SQL row into a contact.
pub fn map_row(row: ContactRow) -> Result<Contact> {
    let id = u64::try_from(row.id).map_err(|_| BackendError::CorruptRow {
        reason: format!("negative contact id {}", row.id),
    })?;
    let phones: Vec<String> = serde_json::from_str(&row.phones_json)
        .map_err(|e| BackendError::DeserializationFailed { source: e })?;

    Ok(Contact {
        id,
        name: row.name,
        phones,
        description: row.description,
    })
}
