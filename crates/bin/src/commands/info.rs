//! Info command - shows the configured backend and the total contact count.

use serde::Serialize;

use crate::backend::{backend_label, create_backend};
use crate::cli::InfoArgs;
use crate::output::{OutputFormat, print_json};

#[derive(Serialize)]
struct Info {
    backend: String,
    contacts: u64,
}

/// Run the info command
pub async fn run(args: &InfoArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;
    let info = Info {
        backend: backend_label(&args.backend_config),
        contacts: backend.count_contacts().await?,
    };

    match format {
        OutputFormat::Human => {
            println!("Backend:     {}", info.backend);
            println!("Contacts:    {}", info.contacts);
        }
        OutputFormat::Json => print_json(&info)?,
    }

    Ok(())
}
