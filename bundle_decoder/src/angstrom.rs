//! The packed Angstrom bundle.
//!
//! Unlike [`crate::orders`], nothing here is word-aligned:
//! - integers are big-endian and exactly as wide as their type,
//!   (the standing validation deadline is 5 bytes, ticks are 3);
//! - a `Vec` is a 3-byte length *in bytes*, followed by its items;
//! - a struct with `bool`, `Option` or enum fields starts with a bitmap,
//!   one bit per such field, the first field in the least significant bit.
//!   `bool`s live entirely in the bitmap, an `Option` is present when its bit
//!   is set, and an enum is its second variant when its bit is set.

use bitvec::{order::Lsb0, vec::BitVec};
use ethereum_types::{Address, H160, H256, U256};
use serde::Serialize;
use winnow::{
    binary::{be_i24, be_u128, be_u16, be_u24, be_u32, be_u64, be_u8},
    combinator::trace,
    error::{ContextError, ErrMode, FromExternalError as _, StrContext},
    stream::Stream as _,
    token::take,
    Parser,
};

use crate::envelope::Envelope;
use crate::error::{DecodeError, ErrorKind};

/// A single place to swap out the error type if required.
type PResult<T> = winnow::PResult<T, ContextError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AngstromBundle {
    pub assets: Vec<Asset>,
    pub pairs: Vec<Pair>,
    pub pool_updates: Vec<PoolUpdate>,
    pub top_of_block_orders: Vec<TopOfBlockOrder>,
    pub user_orders: Vec<UserOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub addr: Address,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub save: u128,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub take: u128,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub settle: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub index0: u16,
    pub index1: u16,
    pub store_index: u16,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub price_1over0: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolUpdate {
    pub zero_for_one: bool,
    pub pair_index: u16,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub swap_in_quantity: u128,
    pub rewards_update: RewardsUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RewardsUpdate {
    MultiTick {
        start_tick: i32,
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        start_liquidity: u128,
        #[serde(serialize_with = "crate::json::decimal::seq")]
        quantities: Vec<u128>,
        #[serde(serialize_with = "crate::json::hex::serialize")]
        reward_checksum: Address,
    },
    CurrentOnly {
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        amount: u128,
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        expected_liquidity: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopOfBlockOrder {
    pub use_internal: bool,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub quantity_in: u128,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub quantity_out: u128,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub max_gas_asset_0: u128,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub gas_used_asset_0: u128,
    pub pairs_index: u16,
    pub zero_for_1: bool,
    #[serde(serialize_with = "crate::json::hex::option")]
    pub recipient: Option<Address>,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOrder {
    pub ref_id: u32,
    pub use_internal: bool,
    pub pair_index: u16,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub min_price: U256,
    #[serde(serialize_with = "crate::json::hex::option")]
    pub recipient: Option<Address>,
    #[serde(serialize_with = "crate::json::hex::option")]
    pub hook_data: Option<Vec<u8>>,
    pub zero_for_one: bool,
    pub standing_validation: Option<StandingValidation>,
    pub order_quantities: OrderQuantities,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub max_extra_fee_asset0: u128,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub extra_fee_asset0: u128,
    pub exact_in: bool,
    pub signature: Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandingValidation {
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub nonce: u64,
    /// Only 40 bits wide on the wire.
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderQuantities {
    Exact {
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        quantity: u128,
    },
    Partial {
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        min_quantity_in: u128,
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        max_quantity_in: u128,
        #[serde(serialize_with = "crate::json::decimal::serialize")]
        filled_quantity: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Signature {
    Contract {
        #[serde(serialize_with = "crate::json::hex::serialize")]
        from: Address,
        #[serde(serialize_with = "crate::json::hex::serialize")]
        signature: Vec<u8>,
    },
    Ecdsa {
        v: u8,
        #[serde(serialize_with = "crate::json::hex::serialize")]
        r: H256,
        #[serde(serialize_with = "crate::json::hex::serialize")]
        s: H256,
    },
}

/// Decode the payload of `envelope`, which must be consumed exactly.
pub fn decode(envelope: &Envelope) -> Result<AngstromBundle, DecodeError> {
    let mut input = envelope.payload;
    let res = AngstromBundle::parse(&mut input);
    let at = envelope.payload_at + (envelope.payload.len() - input.len());
    match res {
        Ok(_) if !input.is_empty() => {
            log::debug!("{} trailing bytes after packed bundle", input.len());
            Err(DecodeError::new(ErrorKind::InvalidFormat, at))
        }
        Ok(it) => Ok(it),
        Err(e) => {
            let e = e.into_inner();
            let kind = e
                .as_ref()
                .and_then(ContextError::cause)
                .and_then(|cause| cause.downcast_ref::<ErrorKind>())
                .copied()
                // `take` and friends only fail when they run out of input
                .unwrap_or(ErrorKind::TruncatedBuffer);
            let field = e.as_ref().and_then(|e| {
                e.context().find_map(|it| match it {
                    StrContext::Label(label) => Some(*label),
                    _ => None,
                })
            });
            Err(DecodeError::new(kind, at).with_field(field))
        }
    }
}

impl AngstromBundle {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        Ok(Self {
            assets: field("assets", list(Asset::parse)).parse_next(input)?,
            pairs: field("pairs", list(Pair::parse)).parse_next(input)?,
            pool_updates: field("pool_updates", list(PoolUpdate::parse)).parse_next(input)?,
            top_of_block_orders: field("top_of_block_orders", list(TopOfBlockOrder::parse))
                .parse_next(input)?,
            user_orders: field("user_orders", list(UserOrder::parse)).parse_next(input)?,
        })
    }
}

impl Asset {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        Ok(Self {
            addr: field("addr", address).parse_next(input)?,
            save: field("save", uint128).parse_next(input)?,
            take: field("take", uint128).parse_next(input)?,
            settle: field("settle", uint128).parse_next(input)?,
        })
    }
}

impl Pair {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        Ok(Self {
            index0: field("index0", uint16).parse_next(input)?,
            index1: field("index1", uint16).parse_next(input)?,
            store_index: field("store_index", uint16).parse_next(input)?,
            price_1over0: field("price_1over0", uint256).parse_next(input)?,
        })
    }
}

impl PoolUpdate {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let mut variants = variant_map(input, 2)?;
        Ok(Self {
            zero_for_one: variants.next(),
            pair_index: field("pair_index", uint16).parse_next(input)?,
            swap_in_quantity: field("swap_in_quantity", uint128).parse_next(input)?,
            rewards_update: field("rewards_update", move |input: &mut &[u8]| {
                RewardsUpdate::parse(input, variants.next())
            })
            .parse_next(input)?,
        })
    }
}

impl RewardsUpdate {
    fn parse(input: &mut &[u8], current_only: bool) -> PResult<Self> {
        Ok(match current_only {
            false => Self::MultiTick {
                start_tick: field("start_tick", int24).parse_next(input)?,
                start_liquidity: field("start_liquidity", uint128).parse_next(input)?,
                quantities: field("quantities", list(uint128)).parse_next(input)?,
                reward_checksum: field("reward_checksum", address).parse_next(input)?,
            },
            true => Self::CurrentOnly {
                amount: field("amount", uint128).parse_next(input)?,
                expected_liquidity: field("expected_liquidity", uint128).parse_next(input)?,
            },
        })
    }
}

impl TopOfBlockOrder {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let mut variants = variant_map(input, 4)?;
        Ok(Self {
            use_internal: variants.next(),
            quantity_in: field("quantity_in", uint128).parse_next(input)?,
            quantity_out: field("quantity_out", uint128).parse_next(input)?,
            max_gas_asset_0: field("max_gas_asset_0", uint128).parse_next(input)?,
            gas_used_asset_0: field("gas_used_asset_0", uint128).parse_next(input)?,
            pairs_index: field("pairs_index", uint16).parse_next(input)?,
            zero_for_1: variants.next(),
            recipient: match variants.next() {
                true => Some(field("recipient", address).parse_next(input)?),
                false => None,
            },
            signature: {
                let ecdsa = variants.next();
                field("signature", move |input: &mut &[u8]| Signature::parse(input, ecdsa))
                    .parse_next(input)?
            },
        })
    }
}

impl UserOrder {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let mut variants = variant_map(input, 8)?;
        Ok(Self {
            ref_id: field("ref_id", uint32).parse_next(input)?,
            use_internal: variants.next(),
            pair_index: field("pair_index", uint16).parse_next(input)?,
            min_price: field("min_price", uint256).parse_next(input)?,
            recipient: match variants.next() {
                true => Some(field("recipient", address).parse_next(input)?),
                false => None,
            },
            hook_data: match variants.next() {
                true => Some(field("hook_data", byte_list).parse_next(input)?),
                false => None,
            },
            zero_for_one: variants.next(),
            standing_validation: match variants.next() {
                true => Some(
                    field("standing_validation", StandingValidation::parse).parse_next(input)?,
                ),
                false => None,
            },
            order_quantities: {
                let partial = variants.next();
                field("order_quantities", move |input: &mut &[u8]| {
                    OrderQuantities::parse(input, partial)
                })
                .parse_next(input)?
            },
            max_extra_fee_asset0: field("max_extra_fee_asset0", uint128).parse_next(input)?,
            extra_fee_asset0: field("extra_fee_asset0", uint128).parse_next(input)?,
            exact_in: variants.next(),
            signature: {
                let ecdsa = variants.next();
                field("signature", move |input: &mut &[u8]| Signature::parse(input, ecdsa))
                    .parse_next(input)?
            },
        })
    }
}

impl StandingValidation {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        Ok(Self {
            nonce: field("nonce", uint64).parse_next(input)?,
            deadline: field("deadline", uint40).parse_next(input)?,
        })
    }
}

impl OrderQuantities {
    fn parse(input: &mut &[u8], partial: bool) -> PResult<Self> {
        Ok(match partial {
            false => Self::Exact {
                quantity: field("quantity", uint128).parse_next(input)?,
            },
            true => Self::Partial {
                min_quantity_in: field("min_quantity_in", uint128).parse_next(input)?,
                max_quantity_in: field("max_quantity_in", uint128).parse_next(input)?,
                filled_quantity: field("filled_quantity", uint128).parse_next(input)?,
            },
        })
    }
}

impl Signature {
    fn parse(input: &mut &[u8], ecdsa: bool) -> PResult<Self> {
        Ok(match ecdsa {
            false => Self::Contract {
                from: field("from", address).parse_next(input)?,
                signature: field("signature", byte_list).parse_next(input)?,
            },
            true => Self::Ecdsa {
                v: field("v", uint8).parse_next(input)?,
                r: field("r", hash).parse_next(input)?,
                s: field("s", hash).parse_next(input)?,
            },
        })
    }
}

/// Name a field, so that it shows up in traces and errors.
fn field<'a, T>(
    name: &'static str,
    parser: impl Parser<&'a [u8], T, ContextError>,
) -> impl Parser<&'a [u8], T, ContextError> {
    trace(name, parser).context(StrContext::Label(name))
}

/// Fail at the current position with `kind`, without backtracking.
fn reject<T>(input: &mut &[u8], kind: ErrorKind) -> PResult<T> {
    Err(ErrMode::from_external_error(input, winnow::error::ErrorKind::Verify, kind).cut())
}

/// Length (in bytes) prefixed sequence.
///
/// Items are parsed from exactly the declared bytes, so nested lengths are
/// bounded by their enclosing list.
fn list<'a, T>(
    mut item: impl Parser<&'a [u8], T, ContextError>,
) -> impl Parser<&'a [u8], Vec<T>, ContextError> {
    move |input: &mut &'a [u8]| -> PResult<Vec<T>> {
        let start = input.checkpoint();
        let len = uint24(input)? as usize;
        if len > input.len() {
            input.reset(&start);
            return reject(input, ErrorKind::ArrayTooLarge);
        }
        let rest = *input;
        let mut body = &rest[..len];
        let mut out = vec![];
        while !body.is_empty() {
            match item.parse_next(&mut body) {
                Ok(it) => out.push(it),
                Err(e) => {
                    // leave `input` where the item failed
                    *input = &rest[len - body.len()..];
                    let overran = match &e {
                        ErrMode::Backtrack(it) | ErrMode::Cut(it) => it.cause().is_none(),
                        ErrMode::Incomplete(_) => true,
                    };
                    return match overran {
                        // the item ran past the declared length
                        true => reject(input, ErrorKind::InvalidFormat),
                        false => Err(e),
                    };
                }
            }
        }
        *input = &rest[len..];
        Ok(out)
    }
}

fn byte_list(input: &mut &[u8]) -> PResult<Vec<u8>> {
    let start = input.checkpoint();
    let len = uint24(input)? as usize;
    if len > input.len() {
        input.reset(&start);
        return reject(input, ErrorKind::ArrayTooLarge);
    }
    bytes(input, len).map(<[u8]>::to_vec)
}

/// The variant bits of a struct, consumed in field declaration order.
#[derive(Debug)]
struct VariantMap {
    bits: BitVec<u8, Lsb0>,
    next: usize,
}

impl VariantMap {
    fn next(&mut self) -> bool {
        let it = self.bits.get(self.next).is_some_and(|it| *it);
        self.next += 1;
        it
    }
}

fn variant_map(input: &mut &[u8], bits: usize) -> PResult<VariantMap> {
    let start = input.checkpoint();
    let mut raw = bytes(input, bits.div_ceil(8))?.to_vec();
    // the bitmap is a big-endian integer
    raw.reverse();
    let map = BitVec::<u8, Lsb0>::from_vec(raw);
    if map[bits..].any() {
        input.reset(&start);
        return reject(input, ErrorKind::InvalidFormat);
    }
    Ok(VariantMap { bits: map, next: 0 })
}

fn bytes<'a>(input: &mut &'a [u8], n: usize) -> PResult<&'a [u8]> {
    take(n).parse_next(input)
}

fn array<const N: usize>(input: &mut &[u8]) -> PResult<[u8; N]> {
    take(N)
        .map(|it: &[u8]| it.try_into().expect("take has already selected N bytes"))
        .parse_next(input)
}

fn address(input: &mut &[u8]) -> PResult<Address> {
    array.map(H160).parse_next(input)
}

fn hash(input: &mut &[u8]) -> PResult<H256> {
    array.map(H256).parse_next(input)
}

fn uint256(input: &mut &[u8]) -> PResult<U256> {
    array::<32>
        .map(|it| U256::from_big_endian(&it))
        .parse_next(input)
}

fn uint128(input: &mut &[u8]) -> PResult<u128> {
    be_u128(input)
}

fn uint64(input: &mut &[u8]) -> PResult<u64> {
    be_u64(input)
}

fn uint40(input: &mut &[u8]) -> PResult<u64> {
    array::<5>
        .map(|it| it.into_iter().fold(0, |acc, byte| (acc << 8) | u64::from(byte)))
        .parse_next(input)
}

fn uint32(input: &mut &[u8]) -> PResult<u32> {
    be_u32(input)
}

fn uint24(input: &mut &[u8]) -> PResult<u32> {
    be_u24(input)
}

fn uint16(input: &mut &[u8]) -> PResult<u16> {
    be_u16(input)
}

fn uint8(input: &mut &[u8]) -> PResult<u8> {
    be_u8(input)
}

fn int24(input: &mut &[u8]) -> PResult<i32> {
    be_i24(input)
}
