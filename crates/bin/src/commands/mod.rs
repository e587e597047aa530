//! Subcommand implementations.

pub mod contacts;
pub mod health;
pub mod info;
pub mod serve;
