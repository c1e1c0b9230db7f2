//! Positional reads over a buffer in 32-byte words.

use ethereum_types::{Address, H256, U256};

use crate::error::{DecodeError, ErrorKind};
use crate::AddressPolicy;

/// The atomic unit of the word-aligned encoding.
pub const WORD_SIZE: usize = 32;

/// Read-only view of (part of) the calldata.
///
/// All positions are relative to the start of `buf`, but errors report
/// `base + position` so that they point into the whole calldata.
#[derive(Debug, Clone, Copy)]
pub struct Words<'a> {
    buf: &'a [u8],
    base: usize,
}

impl<'a> Words<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, base: 0 }
    }

    /// A view of `buf`, which starts at `base` in the calldata.
    pub fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self { buf, base }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub(crate) fn error(&self, kind: ErrorKind, at: usize) -> DecodeError {
        DecodeError::new(kind, self.base.saturating_add(at))
    }

    /// The bytes at `[at, at + len)`.
    pub fn slice(&self, at: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        at.checked_add(len)
            .and_then(|end| self.buf.get(at..end))
            .ok_or_else(|| self.error(ErrorKind::TruncatedBuffer, at))
    }

    /// The word at `[at, at + 32)`.
    pub fn word(&self, at: usize) -> Result<&'a [u8; WORD_SIZE], DecodeError> {
        let it = self.slice(at, WORD_SIZE)?;
        Ok(it.try_into().expect("slice has already selected a word"))
    }

    /// The word at `at` as a big-endian integer.
    pub fn uint(&self, at: usize) -> Result<U256, DecodeError> {
        self.word(at).map(|it| U256::from_big_endian(it))
    }

    /// The word at `at` as a left-padded address.
    pub fn address(&self, at: usize, policy: AddressPolicy) -> Result<Address, DecodeError> {
        let word = self.word(at)?;
        let (padding, addr) = word.split_at(WORD_SIZE - Address::len_bytes());
        if policy == AddressPolicy::Strict && padding.iter().any(|it| *it != 0) {
            return Err(self.error(ErrorKind::InvalidFormat, at));
        }
        Ok(Address::from_slice(addr))
    }

    /// The word at `at`, untouched.
    pub fn bytes32(&self, at: usize) -> Result<H256, DecodeError> {
        self.word(at).map(|it| H256(*it))
    }
}

/// Convert a length or offset word to a native index, if it fits.
pub(crate) fn to_usize(it: U256) -> Option<usize> {
    match it.bits() <= 64 {
        true => usize::try_from(it.low_u64()).ok(),
        false => None,
    }
}
