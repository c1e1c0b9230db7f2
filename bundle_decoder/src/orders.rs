//! The word-aligned order bundle, ABI head/tail encoded.
//!
//! Offsets in a tuple's head are relative to the start of that tuple.

use ethereum_types::{Address, H256, U256};
use serde::Serialize;

use crate::error::{DecodeError, FieldExt as _};
use crate::pointer::Stride;
use crate::word::{Words, WORD_SIZE};
use crate::AddressPolicy;

/// A batch of orders, settled by `executor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBundle {
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub token: Address,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub amount_in: U256,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub min_amount_out: U256,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub deadline: U256,
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub executor: Address,
    pub orders: Vec<Order>,
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub calldata: Vec<u8>,
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub maker: Address,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub amount_in: U256,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub amount_out: U256,
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub order_hash: H256,
    pub fills: Vec<Fill>,
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub hook_data: Vec<u8>,
}

/// Part of an order's output, sent to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fill {
    #[serde(serialize_with = "crate::json::hex::serialize")]
    pub recipient: Address,
    #[serde(serialize_with = "crate::json::decimal::serialize")]
    pub amount: U256,
}

/// A fill is static: recipient and amount, inline.
const FILL_WORDS: usize = 2;

/// Position of head word `ix` of a tuple starting at `at`.
fn head(at: usize, ix: usize) -> usize {
    at + ix * WORD_SIZE
}

impl OrderBundle {
    /// Decode a bundle whose head starts at `at`.
    pub fn decode(words: &Words, at: usize, policy: AddressPolicy) -> Result<Self, DecodeError> {
        log::trace!("order bundle at {}", words.base() + at);
        let orders_at = words.resolve(at, head(at, 5)).field("orders")?;
        let calldata_at = words.resolve(at, head(at, 6)).field("calldata")?;
        let signature_at = words.resolve(at, head(at, 7)).field("signature")?;
        Ok(Self {
            token: words.address(head(at, 0), policy).field("token")?,
            amount_in: words.uint(head(at, 1)).field("amount_in")?,
            min_amount_out: words.uint(head(at, 2)).field("min_amount_out")?,
            deadline: words.uint(head(at, 3)).field("deadline")?,
            executor: words.address(head(at, 4), policy).field("executor")?,
            orders: words
                .array(orders_at, Stride::Dynamic, |words, at| {
                    Order::decode(words, at, policy)
                })
                .field("orders")?,
            calldata: words.bytes(calldata_at).field("calldata")?.to_vec(),
            signature: words.bytes(signature_at).field("signature")?.to_vec(),
        })
    }
}

impl Order {
    pub fn decode(words: &Words, at: usize, policy: AddressPolicy) -> Result<Self, DecodeError> {
        let fills_at = words.resolve(at, head(at, 4)).field("fills")?;
        let hook_data_at = words.resolve(at, head(at, 5)).field("hook_data")?;
        Ok(Self {
            maker: words.address(head(at, 0), policy).field("maker")?,
            amount_in: words.uint(head(at, 1)).field("amount_in")?,
            amount_out: words.uint(head(at, 2)).field("amount_out")?,
            order_hash: words.bytes32(head(at, 3)).field("order_hash")?,
            fills: words
                .array(fills_at, Stride::Static { words: FILL_WORDS }, |words, at| {
                    Fill::decode(words, at, policy)
                })
                .field("fills")?,
            hook_data: words.bytes(hook_data_at).field("hook_data")?.to_vec(),
        })
    }
}

impl Fill {
    pub fn decode(words: &Words, at: usize, policy: AddressPolicy) -> Result<Self, DecodeError> {
        Ok(Self {
            recipient: words.address(head(at, 0), policy).field("recipient")?,
            amount: words.uint(head(at, 1)).field("amount")?,
        })
    }
}
