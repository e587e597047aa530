//! Page size bounds.

use crate::config::ConfigError;

/// Clamp a requested page size into `[min, max]`.
///
/// Total for any `min <= max`: values below `min` (including zero and
/// negatives) become `min`, values above `max` become `max`.
pub fn clamp(requested: i64, min: i64, max: i64) -> i64 {
    if requested < min {
        min
    } else if requested > max {
        max
    } else {
        requested
    }
}

/// Validated `[min, max]` range for page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    min: u32,
    max: u32,
}

impl PageBounds {
    /// Requires `0 < min <= max`.
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        if min == 0 || min > max {
            return Err(ConfigError::InvalidLimitBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Resolve an optional requested size; a missing value counts as zero.
    pub fn resolve(&self, requested: Option<i64>) -> u32 {
        // The result lies in [min, max], both u32.
        clamp(
            requested.unwrap_or(0),
            i64::from(self.min),
            i64::from(self.max),
        ) as u32
    }
}
