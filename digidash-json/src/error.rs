//! JSON codec errors

/// Errors from JSON import and export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JsonError {
    /// Document is not valid JSON
    Parse,
    /// Top level of the document is not an object
    NotAnObject,
    /// Output buffer cannot hold the document
    BufferTooSmall {
        /// Bytes needed for the complete document
        required: usize,
    },
    /// Serializer failed
    Serialize,
}

impl core::fmt::Display for JsonError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JsonError::Parse => f.write_str("malformed JSON document"),
            JsonError::NotAnObject => f.write_str("JSON document is not an object"),
            JsonError::BufferTooSmall { required } => {
                write!(f, "buffer too small, {} bytes required", required)
            }
            JsonError::Serialize => f.write_str("JSON serialization failed"),
        }
    }
}
