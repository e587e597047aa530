//! Page assembly from fetched rows.

use crate::Result;
use crate::contact::Contact;
use crate::cursor::CursorCodec;

use super::Page;

/// Turn the rows fetched for one page into a [`Page`].
///
/// Trailing empty slots are dropped. When fewer than `limit` real rows
/// remain the data is exhausted and the next cursor is empty; otherwise the
/// cursor encodes the identifier of the last real row.
pub fn assemble(mut rows: Vec<Contact>, limit: u32, codec: &CursorCodec) -> Result<Page> {
    rows.truncate(limit as usize);

    let filled = rows
        .iter()
        .rposition(|row| !row.is_empty_slot())
        .map_or(0, |last| last + 1);
    rows.truncate(filled);

    let Some(last_id) = rows.last().map(|row| row.id) else {
        return Ok(Page::empty());
    };

    if rows.len() < limit as usize {
        return Ok(Page {
            cursor: String::new(),
            contacts: rows,
        });
    }

    let cursor = codec.encode(last_id)?;
    Ok(Page {
        cursor,
        contacts: rows,
    })
}
