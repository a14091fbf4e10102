//! Configuration export

use alloc::string::String;

use digidash_core::Configuration;

use crate::error::JsonError;

/// Serialize the whole configuration into `buffer`
///
/// Returns the number of bytes written. If the document does not fit,
/// nothing is written and the error carries the size required, so the
/// caller can retry with a larger buffer.
pub fn config_to_json(config: &Configuration, buffer: &mut [u8]) -> Result<usize, JsonError> {
    let json = serde_json::to_vec(config).map_err(|_| JsonError::Serialize)?;
    copy_out(&json, buffer)
}

/// Serialize the whole configuration into a new string
pub fn config_to_string(config: &Configuration) -> Result<String, JsonError> {
    serde_json::to_string(config)
        .map_err(|_| JsonError::Serialize)
}

/// Copy a finished document into a caller buffer, all or nothing
pub(crate) fn copy_out(json: &[u8], buffer: &mut [u8]) -> Result<usize, JsonError> {
    let required = json.len();
    if buffer.len() < required {
        debug!("json buffer too small: {} < {}", buffer.len(), required);
        return Err(JsonError::BufferTooSmall { required });
    }

    buffer[..required].copy_from_slice(json);
    Ok(required)
}
