//! Tests for the ContactStore implementations.

mod in_memory;
#[cfg(feature = "sqlite")]
mod sqlite;
