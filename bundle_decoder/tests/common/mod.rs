#![allow(dead_code)]

use std::{fs, path::Path};

use anyhow::{bail, Context as _};
use bundle_decoder::{Fill, Layout, Order, OrderBundle, EXECUTE_SELECTOR};
use ethereum_types::{Address, H256, U256};

/// A field in the head of a tuple.
pub enum Field {
    /// Written in place.
    Static(Vec<u8>),
    /// Written to the tail, with an offset in its place.
    Dynamic(Vec<u8>),
}

pub fn uint(n: impl Into<U256>) -> Vec<u8> {
    let mut it = vec![0; 32];
    n.into().to_big_endian(&mut it);
    it
}

pub fn address(addr: Address) -> Vec<u8> {
    let mut it = vec![0; 12];
    it.extend(addr.as_bytes());
    it
}

pub fn bytes(data: &[u8]) -> Vec<u8> {
    let mut it = uint(data.len());
    it.extend(data);
    it.resize(it.len() + data.len().next_multiple_of(32) - data.len(), 0);
    it
}

pub fn tuple(fields: impl IntoIterator<Item = Field>) -> Vec<u8> {
    let fields = fields.into_iter().collect::<Vec<_>>();
    let head_len = fields.len() * 32;
    let (mut head, mut tail) = (vec![], vec![]);
    for field in fields {
        match field {
            Field::Static(it) => head.extend(it),
            Field::Dynamic(it) => {
                head.extend(uint(head_len + tail.len()));
                tail.extend(it);
            }
        }
    }
    head.extend(tail);
    head
}

pub fn dynamic_array(elements: impl IntoIterator<Item = Vec<u8>>) -> Vec<u8> {
    let elements = elements.into_iter().map(Field::Dynamic).collect::<Vec<_>>();
    let mut it = uint(elements.len());
    it.extend(tuple(elements));
    it
}

pub fn static_array(elements: impl IntoIterator<Item = Vec<u8>>) -> Vec<u8> {
    let elements = elements.into_iter().collect::<Vec<_>>();
    let mut it = uint(elements.len());
    it.extend(elements.concat());
    it
}

pub fn encode_fill(fill: &Fill) -> Vec<u8> {
    [address(fill.recipient), uint(fill.amount)].concat()
}

pub fn encode_order(order: &Order) -> Vec<u8> {
    tuple([
        Field::Static(address(order.maker)),
        Field::Static(uint(order.amount_in)),
        Field::Static(uint(order.amount_out)),
        Field::Static(order.order_hash.as_bytes().to_vec()),
        Field::Dynamic(static_array(order.fills.iter().map(encode_fill))),
        Field::Dynamic(bytes(&order.hook_data)),
    ])
}

/// The ABI encoding of `bundle`, without the `execute(bytes)` envelope.
pub fn encode_bundle(bundle: &OrderBundle) -> Vec<u8> {
    tuple([
        Field::Static(address(bundle.token)),
        Field::Static(uint(bundle.amount_in)),
        Field::Static(uint(bundle.min_amount_out)),
        Field::Static(uint(bundle.deadline)),
        Field::Static(address(bundle.executor)),
        Field::Dynamic(dynamic_array(bundle.orders.iter().map(encode_order))),
        Field::Dynamic(bytes(&bundle.calldata)),
        Field::Dynamic(bytes(&bundle.signature)),
    ])
}

/// Calldata for `execute(payload)`.
pub fn execute(payload: &[u8]) -> Vec<u8> {
    let mut it = EXECUTE_SELECTOR.to_vec();
    it.extend(tuple([Field::Dynamic(bytes(payload))]));
    it
}

/// Where the payload starts in calldata built by [`execute`].
pub const PAYLOAD_AT: usize = 4 + 32 + 32;

/// A bundle with two orders and values past every native integer width.
pub fn sample() -> OrderBundle {
    OrderBundle {
        token: Address::repeat_byte(0x11),
        amount_in: U256::MAX - U256::one(),
        min_amount_out: U256::from(u128::MAX) + U256::one(),
        deadline: U256::from(u64::MAX) * U256::from(3),
        executor: Address::repeat_byte(0x22),
        orders: vec![
            Order {
                maker: Address::repeat_byte(0x33),
                amount_in: U256::from(u128::MAX) * U256::from(5),
                amount_out: U256::from(7),
                order_hash: H256::repeat_byte(0x44),
                fills: vec![
                    Fill {
                        recipient: Address::repeat_byte(0x55),
                        amount: U256::from(3),
                    },
                    Fill {
                        recipient: Address::repeat_byte(0x66),
                        amount: U256::from(4),
                    },
                ],
                hook_data: vec![0xab; 33],
            },
            Order {
                maker: Address::repeat_byte(0x77),
                amount_in: U256::zero(),
                amount_out: U256::zero(),
                order_hash: H256::zero(),
                fills: vec![],
                hook_data: vec![],
            },
        ],
        calldata: vec![1, 2, 3],
        signature: vec![0xcd; 65],
    }
}

pub struct Case {
    pub name: String,
    pub layout: Layout,
    /// Calldata as hex, `0x`-prefixed.
    pub hex: String,
    pub json: serde_json::Value,
}

/// The golden fixtures under `tests/data/<layout>/`, as `<name>.hex` and
/// `<name>.json` pairs.
pub fn cases() -> anyhow::Result<Vec<Case>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data");
    let mut cases = vec![];
    for layout in [Layout::Words, Layout::Packed] {
        let dir = root.join(layout.to_string());
        for entry in fs::read_dir(&dir).context(format!("couldn't read {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|it| it.to_str()) != Some("hex") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|it| it.to_str()) else {
                bail!("bad fixture name {}", path.display())
            };
            let json = path.with_extension("json");
            cases.push(Case {
                name: name.to_owned(),
                layout,
                hex: fs::read_to_string(&path)
                    .context(format!("couldn't read {}", path.display()))?
                    .trim()
                    .to_owned(),
                json: serde_json::from_str(
                    &fs::read_to_string(&json)
                        .context(format!("couldn't read {}", json.display()))?,
                )
                .context(format!("couldn't parse {}", json.display()))?,
            });
        }
    }
    cases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(cases)
}
