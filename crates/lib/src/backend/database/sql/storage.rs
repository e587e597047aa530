//! Contact storage operations for SQL backends.
//!
//! Owner and contact ids are validated by the directory before they reach
//! this layer, so the `as i64` casts below never wrap.

use sqlx::Any;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::contact::{Contact, ContactDraft, ContactId, OwnerId};
use crate::pagination::{ContactRow, KeysetQuery, SqlParam, map_row};

use super::{SqlxBackend, SqlxResultExt};

type RawRow = (i64, String, String, Option<String>);

fn into_row((id, name, phones_json, description): RawRow) -> ContactRow {
    ContactRow {
        id,
        name,
        phones_json,
        description,
    }
}

fn phones_json(draft: &ContactDraft) -> Result<String> {
    serde_json::to_string(&draft.phones)
        .map_err(|e| BackendError::SerializationFailed { source: e }.into())
}

fn not_found(owner_id: OwnerId, contact_id: ContactId) -> crate::Error {
    BackendError::ContactNotFound {
        owner_id,
        contact_id,
    }
    .into()
}

/// Run a planned keyset query.
pub async fn fetch_page(backend: &SqlxBackend, query: &KeysetQuery) -> Result<Vec<Contact>> {
    let statement = query.statement(backend.kind().into());

    let mut sql = sqlx::query_as::<Any, RawRow>(&statement.sql);
    for param in statement.params {
        sql = match param {
            SqlParam::Int(value) => sql.bind(value),
            SqlParam::Text(value) => sql.bind(value),
        };
    }

    let rows = sql
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to fetch contact page")?;

    rows.into_iter().map(|row| map_row(into_row(row))).collect()
}

/// Insert a contact and return it with the id the database assigned.
pub async fn insert_contact(
    backend: &SqlxBackend,
    owner_id: OwnerId,
    draft: ContactDraft,
) -> Result<Contact> {
    let phones = phones_json(&draft)?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO contacts (owner_id, name, phones_json, description) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(owner_id as i64)
    .bind(draft.name.clone())
    .bind(phones)
    .bind(draft.description.clone())
    .fetch_one(backend.pool())
    .await
    .sql_context("Failed to insert contact")?;

    let id = ContactId::try_from(id).map_err(|_| BackendError::CorruptRow {
        reason: format!("database assigned negative contact id {id}"),
    })?;
    Ok(Contact::from_draft(id, draft))
}

/// Get one contact of an owner.
pub async fn get_contact(
    backend: &SqlxBackend,
    owner_id: OwnerId,
    contact_id: ContactId,
) -> Result<Contact> {
    let row: Option<RawRow> = sqlx::query_as(
        "SELECT id, name, phones_json, description FROM contacts \
         WHERE owner_id = $1 AND id = $2",
    )
    .bind(owner_id as i64)
    .bind(contact_id as i64)
    .fetch_optional(backend.pool())
    .await
    .sql_context("Failed to get contact")?;

    match row {
        Some(row) => map_row(into_row(row)),
        None => Err(not_found(owner_id, contact_id)),
    }
}

/// Replace the fields of an existing contact.
pub async fn update_contact(
    backend: &SqlxBackend,
    owner_id: OwnerId,
    contact_id: ContactId,
    draft: ContactDraft,
) -> Result<Contact> {
    let phones = phones_json(&draft)?;

    let result = sqlx::query(
        "UPDATE contacts SET name = $1, phones_json = $2, description = $3 \
         WHERE owner_id = $4 AND id = $5",
    )
    .bind(draft.name.clone())
    .bind(phones)
    .bind(draft.description.clone())
    .bind(owner_id as i64)
    .bind(contact_id as i64)
    .execute(backend.pool())
    .await
    .sql_context("Failed to update contact")?;

    if result.rows_affected() == 0 {
        return Err(not_found(owner_id, contact_id));
    }
    Ok(Contact::from_draft(contact_id, draft))
}

/// Delete one contact of an owner.
pub async fn delete_contact(
    backend: &SqlxBackend,
    owner_id: OwnerId,
    contact_id: ContactId,
) -> Result<()> {
    let result = sqlx::query("DELETE FROM contacts WHERE owner_id = $1 AND id = $2")
        .bind(owner_id as i64)
        .bind(contact_id as i64)
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete contact")?;

    if result.rows_affected() == 0 {
        return Err(not_found(owner_id, contact_id));
    }
    Ok(())
}

/// Count all stored contacts.
pub async fn count_contacts(backend: &SqlxBackend) -> Result<u64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
        .fetch_one(backend.pool())
        .await
        .sql_context("Failed to count contacts")?;
    Ok(count.max(0) as u64)
}
