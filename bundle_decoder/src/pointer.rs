//! Head/tail navigation: offset words, length-prefixed bytes and arrays.
//!
//! Nothing here assumes the tail is laid out contiguously or in head order,
//! every dynamic field is reached by seeking to its absolute position.

use crate::error::{DecodeError, ErrorKind};
use crate::word::{to_usize, Words, WORD_SIZE};

/// How the elements of an array are laid out after its count word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// Elements are inline, `words` words each.
    Static { words: usize },
    /// One offset word per element, relative to the first of them.
    Dynamic,
}

impl Stride {
    /// The fewest bytes an element can occupy in the head of the array.
    fn min_bytes(self) -> usize {
        match self {
            Stride::Static { words } => words.max(1).saturating_mul(WORD_SIZE),
            Stride::Dynamic => WORD_SIZE,
        }
    }
}

impl<'a> Words<'a> {
    /// Read the offset word at `head_at`, and return the absolute position it
    /// points to in a structure whose data region starts at `region`.
    pub fn resolve(&self, region: usize, head_at: usize) -> Result<usize, DecodeError> {
        let offset = self.uint(head_at)?;
        match to_usize(offset)
            .and_then(|it| region.checked_add(it))
            .filter(|it| *it < self.len())
        {
            Some(it) => Ok(it),
            None => {
                log::debug!("offset {offset} from region {region} leaves the buffer");
                Err(self.error(ErrorKind::DanglingOffset, head_at))
            }
        }
    }

    /// A length word at `at`, followed by that many bytes, padded up to a word
    /// boundary.
    ///
    /// The padding must be present, but its contents are ignored.
    pub fn bytes(&self, at: usize) -> Result<&'a [u8], DecodeError> {
        let len = self.uint(at)?;
        let data_at = at + WORD_SIZE;
        let len = to_usize(len).ok_or_else(|| self.error(ErrorKind::TruncatedBuffer, at))?;
        let padded = len
            .checked_next_multiple_of(WORD_SIZE)
            .ok_or_else(|| self.error(ErrorKind::TruncatedBuffer, at))?;
        if self.len().saturating_sub(data_at) < padded {
            return Err(self.error(ErrorKind::TruncatedBuffer, at));
        }
        self.slice(data_at, len)
    }

    /// A count word at `at`, followed by the elements.
    ///
    /// `element` is called with the absolute position of each element.
    pub fn array<T>(
        &self,
        at: usize,
        stride: Stride,
        mut element: impl FnMut(&Self, usize) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let count = self.uint(at)?;
        let elements_at = at + WORD_SIZE;
        let remaining = self.len().saturating_sub(elements_at);
        let count = to_usize(count)
            .filter(|count| {
                count
                    .checked_mul(stride.min_bytes())
                    .is_some_and(|needed| needed <= remaining)
            })
            .ok_or_else(|| {
                log::debug!("array at {at} declares {count} elements, with {remaining} bytes left");
                self.error(ErrorKind::ArrayTooLarge, at)
            })?;

        let mut out = Vec::with_capacity(count);
        for ix in 0..count {
            let head_at = elements_at + ix * stride.min_bytes();
            let element_at = match stride {
                Stride::Static { .. } => head_at,
                Stride::Dynamic => self.resolve(elements_at, head_at)?,
            };
            out.push(element(self, element_at)?);
        }
        Ok(out)
    }
}
