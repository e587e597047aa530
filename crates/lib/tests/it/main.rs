/*! Integration tests for PhoneBook.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: Tests for the ContactStore implementations
 * - contacts: Tests for contact CRUD through the Directory
 * - cursor: Tests for cursor opacity and rejection through the Directory
 * - pagination: Tests for keyset paging, search and owner isolation
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("phonebook=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod contacts;
mod cursor;
mod helpers;
mod pagination;
