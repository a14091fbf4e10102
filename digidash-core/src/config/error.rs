//! Settings errors

/// Reasons a settings operation is refused
///
/// Every refusal happens before any byte reaches the mirror or storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Value outside the field's legal domain
    OutOfRange,
    /// Entity index at or beyond the fixed capacity
    IndexOutOfBounds,
    /// Storage holds a foreign layout version and may not be written
    VersionMismatch,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::OutOfRange => f.write_str("value out of range"),
            ConfigError::IndexOutOfBounds => f.write_str("index out of bounds"),
            ConfigError::VersionMismatch => f.write_str("storage layout version mismatch"),
        }
    }
}
