//! Hex string -> bytes.

use crate::error::{DecodeError, ErrorKind};

/// Strip an optional `0x`/`0X` prefix and decode the rest as hex.
///
/// Error offsets are character indices into `s`, prefix included.
pub fn normalize(s: &str) -> Result<Vec<u8>, DecodeError> {
    let (prefix_len, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(rest) => (2, rest),
        None => (0, s),
    };
    hex::decode(digits).map_err(|e| {
        let at = match e {
            hex::FromHexError::InvalidHexCharacter { index, .. } => prefix_len + index,
            hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => s.len(),
        };
        log::debug!("rejecting hex input: {e}");
        DecodeError::new(ErrorKind::InvalidHex, at)
    })
}
