//! Constants used throughout the PhoneBook library.
//!
//! Central definitions for reserved identifier values and configuration
//! defaults shared by the library and the binary.

/// Reserved identifier marking an empty output slot.
///
/// Storage never assigns this value: identifiers start at 1.
pub const EMPTY_SLOT_ID: u64 = 0;

/// Largest identifier accepted from a cursor.
///
/// Identifiers are stored as signed 64-bit integers by the SQL backends.
pub const MAX_CONTACT_ID: u64 = i64::MAX as u64;

/// Default lower bound for the page size.
pub const DEFAULT_LIMIT_MIN: u32 = 12;

/// Default upper bound for the page size.
pub const DEFAULT_LIMIT_MAX: u32 = 48;

/// Default deadline for a single storage round-trip, in milliseconds.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

/// Key lengths accepted for the cursor secret (AES-128/192/256).
pub const CURSOR_KEY_LENGTHS: [usize; 3] = [16, 24, 32];
