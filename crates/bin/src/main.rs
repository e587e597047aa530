mod backend;
mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ContactsCommand};

const DEFAULT_LOG_FILTER: &str = "phonebook=info,phonebook_bin=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout is reserved for command output.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = cli.output_format();
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args, format).await,
        Some(Commands::Info(args)) => commands::info::run(&args, format).await,
        Some(Commands::Contacts {
            command: ContactsCommand::List(args),
        }) => commands::contacts::list(&args, format).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
