//! Directory configuration.
//!
//! All settings are passed explicitly to [`Directory`](crate::Directory) at
//! construction. Validation happens once, at startup; an invalid
//! configuration never reaches a request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_LIMIT_MAX, DEFAULT_LIMIT_MIN, DEFAULT_STORAGE_TIMEOUT_MS};
use crate::cursor::{CursorCodec, CursorScheme};
use crate::pagination::PageBounds;

/// Errors raised while validating configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid cursor secret length: expected one of {expected:?} bytes, got {actual}")]
    InvalidSecretLength { expected: Vec<usize>, actual: usize },

    #[error("Invalid page size bounds: min {min}, max {max} (require 0 < min <= max)")]
    InvalidLimitBounds { min: u32, max: u32 },

    #[error("Storage timeout must be greater than zero")]
    ZeroStorageTimeout,
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

/// Cursor codec settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Symmetric key material; the raw bytes are the AES key.
    pub secret: String,
    #[serde(default)]
    pub scheme: CursorScheme,
}

impl std::fmt::Debug for CursorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorConfig")
            .field("secret", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitConfig {
    pub min: u32,
    pub max: u32,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_LIMIT_MIN,
            max: DEFAULT_LIMIT_MAX,
        }
    }
}

/// Substring search settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Match names ignoring case. Off by default.
    #[serde(default)]
    pub case_insensitive: bool,
}

/// Everything a [`Directory`](crate::Directory) needs besides its storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub cursor: CursorConfig,
    #[serde(default)]
    pub limit: LimitConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Deadline for each storage round-trip.
    #[serde(default = "default_storage_timeout", with = "duration_millis")]
    pub storage_timeout: Duration,
}

fn default_storage_timeout() -> Duration {
    Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS)
}

impl DirectoryConfig {
    /// Configuration with default bounds and timeout for the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            cursor: CursorConfig {
                secret: secret.into(),
                scheme: CursorScheme::default(),
            },
            limit: LimitConfig::default(),
            search: SearchConfig::default(),
            storage_timeout: default_storage_timeout(),
        }
    }

    /// Check every setting, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret_len = self.cursor.secret.len();
        if !crate::constants::CURSOR_KEY_LENGTHS.contains(&secret_len) {
            return Err(ConfigError::InvalidSecretLength {
                expected: crate::constants::CURSOR_KEY_LENGTHS.to_vec(),
                actual: secret_len,
            });
        }

        PageBounds::new(self.limit.min, self.limit.max)?;

        if self.storage_timeout.is_zero() {
            return Err(ConfigError::ZeroStorageTimeout);
        }

        Ok(())
    }

    /// Build the cursor codec described by this configuration.
    pub fn cursor_codec(&self) -> crate::Result<CursorCodec> {
        CursorCodec::new(self.cursor.secret.as_bytes(), self.cursor.scheme)
    }

    /// Build the page bounds described by this configuration.
    pub fn page_bounds(&self) -> crate::Result<PageBounds> {
        Ok(PageBounds::new(self.limit.min, self.limit.max)?)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
