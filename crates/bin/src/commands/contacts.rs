//! Contact inspection commands.

use phonebook::{Contact, Directory, PageRequest};

use crate::backend::create_backend;
use crate::cli::ListArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Upper bound on pages followed by `--all`, guarding against a store that
/// keeps growing underneath the listing.
const MAX_PAGES: usize = 100_000;

/// Run the `contacts list` command
pub async fn list(args: &ListArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;
    let directory = Directory::new(backend, &args.directory.to_config())?;

    let mut request = PageRequest {
        owner_id: args.owner,
        cursor: args.cursor.clone(),
        search: args.search.clone(),
        limit: args.limit,
    };

    let mut contacts = Vec::new();
    let mut pages = 0;
    let next_cursor = loop {
        let page = directory.list_contacts(&request).await?;
        pages += 1;
        contacts.extend(page.contacts);

        if !args.all || page.cursor.is_empty() || pages >= MAX_PAGES {
            break page.cursor;
        }
        request.cursor = Some(page.cursor);
    };
    tracing::debug!(pages, contacts = contacts.len(), "Listed contacts");

    match format {
        OutputFormat::Human => {
            if contacts.is_empty() {
                println!("No contacts found.");
            } else {
                print_table(&["ID", "NAME", "PHONES", "DESCRIPTION"], &table_rows(&contacts));
            }
            if !next_cursor.is_empty() {
                println!();
                println!("Next cursor: {next_cursor}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "cursor": next_cursor,
            "contacts": contacts,
        }))?,
    }

    Ok(())
}

fn table_rows(contacts: &[Contact]) -> Vec<Vec<String>> {
    contacts
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.phones.join(", "),
                c.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}
