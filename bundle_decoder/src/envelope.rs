//! The `execute(bytes)` call wrapping every bundle.
//!
//! ```text
//! [0, 4)    selector
//! [4, 36)   offset of the `bytes` argument, relative to byte 4
//! ...       length word, payload, padding up to a word boundary
//! ```

use crate::error::{DecodeError, ErrorKind, FieldExt as _};
use crate::word::{Words, WORD_SIZE};

/// `bytes4(keccak256("execute(bytes)"))`
pub const EXECUTE_SELECTOR: [u8; 4] = [0x09, 0xc5, 0xea, 0xbe];

const SELECTOR_LEN: usize = EXECUTE_SELECTOR.len();

/// The bundle bytes carried by the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Trimmed to the declared length.
    pub payload: &'a [u8],
    /// Where `payload` starts in the calldata.
    pub payload_at: usize,
}

impl<'a> Envelope<'a> {
    /// The payload, as a word view that reports errors against the calldata.
    pub fn words(&self) -> Words<'a> {
        Words::with_base(self.payload, self.payload_at)
    }
}

pub fn open(calldata: &[u8]) -> Result<Envelope<'_>, DecodeError> {
    let words = Words::new(calldata);
    let selector = words.slice(0, SELECTOR_LEN).field("selector")?;
    if selector != EXECUTE_SELECTOR {
        log::debug!("unknown selector 0x{}", hex::encode(selector));
        return Err(words.error(ErrorKind::InvalidFormat, 0)).field("selector");
    }
    let bytes_at = words.resolve(SELECTOR_LEN, SELECTOR_LEN).field("bundle")?;
    let payload = words.bytes(bytes_at).field("bundle")?;
    log::trace!("bundle payload is {} bytes at {}", payload.len(), bytes_at);
    Ok(Envelope {
        payload,
        payload_at: bytes_at + WORD_SIZE,
    })
}
