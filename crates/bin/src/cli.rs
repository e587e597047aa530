//! CLI argument definitions for the PhoneBook binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use phonebook::{
    CursorScheme, DirectoryConfig,
    config::{CursorConfig, LimitConfig, SearchConfig},
    constants::{DEFAULT_LIMIT_MAX, DEFAULT_LIMIT_MIN},
};

use crate::output::OutputFormat;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development)
    Inmemory,
}

/// PhoneBook contact directory
#[derive(Parser, Debug)]
#[command(name = "phonebook")]
#[command(about = "PhoneBook: multi-tenant contact directory with cursor pagination")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the PhoneBook HTTP server
    Serve(ServeArgs),
    /// Check health of a running PhoneBook server
    Health(HealthArgs),
    /// Show backend and contact totals
    Info(InfoArgs),
    /// Inspect contacts directly in storage
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContactsCommand {
    /// List one owner's contacts page by page
    List(ListArgs),
}

/// Storage selection shared by every command that opens the backend
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "PHONEBOOK_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores phonebook.db
    /// For InMemory: stores phonebook.json
    #[arg(short = 'D', long, env = "PHONEBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "PHONEBOOK_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Pagination and cursor settings
#[derive(clap::Args, Debug, Clone)]
pub struct DirectoryArgs {
    /// Cursor encryption key; 16, 24 or 32 bytes
    #[arg(long, env = "PHONEBOOK_CURSOR_SECRET", hide_env_values = true)]
    pub cursor_secret: String,

    /// Smallest page size served
    #[arg(long, default_value_t = DEFAULT_LIMIT_MIN, env = "PHONEBOOK_LIMIT_MIN")]
    pub limit_min: u32,

    /// Largest page size served
    #[arg(long, default_value_t = DEFAULT_LIMIT_MAX, env = "PHONEBOOK_LIMIT_MAX")]
    pub limit_max: u32,

    /// Match search text ignoring case
    #[arg(long, env = "PHONEBOOK_CASE_INSENSITIVE")]
    pub case_insensitive: bool,

    /// Issue AES-GCM cursors that reject any tampering
    #[arg(long, env = "PHONEBOOK_AUTHENTICATED_CURSORS")]
    pub authenticated_cursors: bool,

    /// Deadline for each storage call, in seconds
    #[arg(long, default_value_t = 5, env = "PHONEBOOK_STORAGE_TIMEOUT")]
    pub storage_timeout: u64,
}

impl DirectoryArgs {
    pub fn to_config(&self) -> DirectoryConfig {
        let scheme = if self.authenticated_cursors {
            CursorScheme::Authenticated
        } else {
            CursorScheme::Stream
        };

        DirectoryConfig {
            cursor: CursorConfig {
                secret: self.cursor_secret.clone(),
                scheme,
            },
            limit: LimitConfig {
                min: self.limit_min,
                max: self.limit_max,
            },
            search: SearchConfig {
                case_insensitive: self.case_insensitive,
            },
            storage_timeout: Duration::from_secs(self.storage_timeout),
        }
    }
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "PHONEBOOK_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "PHONEBOOK_HOST")]
    pub host: String,

    /// Request header carrying the authenticated owner id, set by the gateway
    #[arg(long, default_value = "x-owner-id", env = "PHONEBOOK_OWNER_HEADER")]
    pub owner_header: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    #[command(flatten)]
    pub directory: DirectoryArgs,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "PHONEBOOK_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub backend_config: BackendConfig,
}

/// Arguments for the `contacts list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Owner whose contacts are listed
    #[arg(long)]
    pub owner: u64,

    /// Only contacts whose name contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Requested page size, clamped to the configured bounds
    #[arg(long)]
    pub limit: Option<i64>,

    /// Continue from this cursor
    #[arg(long)]
    pub cursor: Option<String>,

    /// Follow cursors until the last page
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    #[command(flatten)]
    pub directory: DirectoryArgs,
}
