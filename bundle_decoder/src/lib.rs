//! Decode the calldata of an `execute(bytes)` call into a typed bundle, and
//! optionally render it as JSON.
//!
//! ```text
//! "0x09c5eabe…" ─▶ normalize ─▶ envelope ─┬─ Layout::Words  ─▶ OrderBundle    ─┐
//!                                         └─ Layout::Packed ─▶ AngstromBundle ─┴─▶ json
//! ```
//!
//! The default, [`Layout::Auto`], tries the word layout first and falls back to
//! the packed one.
//!
//! Every step is a pure function over a borrowed buffer: there is no global
//! state and nothing to initialize, so decoding may happen from any number of
//! threads at once.
//!
//! Each decode either succeeds completely or fails with a single
//! [`DecodeError`], which carries an [`ErrorKind`], the byte offset where the
//! problem was detected, and the innermost field being read.
//!
//! ```
//! let calldata = concat!(
//!     "0x09c5eabe",
//!     "0000000000000000000000000000000000000000000000000000000000000020",
//!     "0000000000000000000000000000000000000000000000000000000000000000",
//! );
//! let options = bundle_decoder::DecodeOptions {
//!     layout: bundle_decoder::Layout::Packed,
//!     ..Default::default()
//! };
//! // an empty packed payload is missing even its first length prefix
//! let e = bundle_decoder::decode_with(calldata, &options).unwrap_err();
//! assert_eq!(e.kind(), bundle_decoder::ErrorKind::TruncatedBuffer);
//! assert_eq!(e.field(), Some("assets"));
//! ```

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_debug_implementations)]

mod angstrom;
mod envelope;
mod error;
mod input;
mod json;
mod orders;
mod pointer;
mod word;

use serde::Serialize;

pub use angstrom::{
    AngstromBundle, Asset, OrderQuantities, Pair, PoolUpdate, RewardsUpdate, Signature,
    StandingValidation, TopOfBlockOrder, UserOrder,
};
pub use envelope::EXECUTE_SELECTOR;
pub use error::{DecodeError, Error, ErrorKind};
pub use input::normalize;
pub use json::{to_json, to_json_pretty};
pub use orders::{Fill, Order, OrderBundle};

/// How the payload of the `execute(bytes)` call is laid out.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Layout {
    /// Try [`Layout::Words`], then [`Layout::Packed`].
    ///
    /// When neither fits, the error is the one detected furthest into the
    /// calldata, preferring the word layout on a tie.
    #[default]
    Auto,
    /// ABI head/tail encoding in 32-byte words, decoded to an [`OrderBundle`].
    Words,
    /// The tightly packed encoding, decoded to an [`AngstromBundle`].
    Packed,
}

/// What to do with an address word whose upper 12 bytes are not zero.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum AddressPolicy {
    /// Fail with [`ErrorKind::InvalidFormat`].
    #[default]
    Strict,
    /// Keep the low 20 bytes.
    Lenient,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub layout: Layout,
    /// Only consulted by the word layout, packed addresses have no padding.
    pub address_policy: AddressPolicy,
}

/// A decoded bundle, in whichever layout it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Bundle {
    Order(OrderBundle),
    Angstrom(AngstromBundle),
}

/// Decode `bundle_hex` with the default [`DecodeOptions`], and render it as
/// compact JSON.
pub fn decode(bundle_hex: &str) -> Result<String, Error> {
    let bundle = decode_with(bundle_hex, &DecodeOptions::default())?;
    Ok(to_json(&bundle)?)
}

/// Decode `bundle_hex`, with or without a `0x` prefix.
pub fn decode_with(bundle_hex: &str, options: &DecodeOptions) -> Result<Bundle, DecodeError> {
    let calldata = normalize(bundle_hex)?;
    decode_calldata(&calldata, options)
}

/// Decode raw calldata, selector first.
pub fn decode_calldata(calldata: &[u8], options: &DecodeOptions) -> Result<Bundle, DecodeError> {
    log::debug!(
        "decoding {} bytes of calldata as {} ({} addresses)",
        calldata.len(),
        options.layout,
        options.address_policy
    );
    let envelope = envelope::open(calldata)?;
    let words = || {
        OrderBundle::decode(&envelope.words(), 0, options.address_policy).map(Bundle::Order)
    };
    let packed = || angstrom::decode(&envelope).map(Bundle::Angstrom);
    let res = match options.layout {
        Layout::Words => words(),
        Layout::Packed => packed(),
        Layout::Auto => words().or_else(|words_err| {
            log::debug!("not a word layout bundle ({words_err}), trying packed");
            packed().map_err(|packed_err| match packed_err.offset() > words_err.offset() {
                true => packed_err,
                false => words_err,
            })
        }),
    };
    match &res {
        Ok(_) => log::debug!("decoded bundle"),
        Err(e) => log::debug!("failed to decode bundle: {e}"),
    }
    res
}
