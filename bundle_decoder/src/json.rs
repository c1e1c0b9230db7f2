//! Rendering a decoded [`Bundle`] as JSON.
//!
//! - addresses, hashes and byte strings are `0x`-prefixed lowercase hex,
//! - integers wider than 32 bits are decimal strings,
//! - everything else is a plain JSON number or bool,
//! - keys appear in declaration order.

use crate::Bundle;

/// Compact, single-line JSON.
pub fn to_json(bundle: &Bundle) -> serde_json::Result<String> {
    serde_json::to_string(bundle)
}

/// Indented JSON, for humans.
pub fn to_json_pretty(bundle: &Bundle) -> serde_json::Result<String> {
    serde_json::to_string_pretty(bundle)
}

pub(crate) mod hex {
    use serde::Serializer;

    pub fn serialize<S: Serializer, T>(data: T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: hex::ToHex,
    {
        let s = data.encode_hex::<String>();
        serializer.serialize_str(&format!("0x{}", s))
    }

    pub fn option<S: Serializer, T>(data: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<[u8]>,
    {
        match data {
            Some(it) => serialize(it.as_ref(), serializer),
            None => serializer.serialize_none(),
        }
    }
}

/// Integers that don't survive a round trip through an `f64`.
pub(crate) mod decimal {
    use std::fmt::Display;

    use serde::Serializer;

    pub fn serialize<S: Serializer, T: Display>(it: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(it)
    }

    pub fn seq<S: Serializer>(it: &[u128], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(it.iter().map(u128::to_string))
    }
}

#[cfg(test)]
mod tests {
    use ethereum_types::{Address, H256, U256};
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        #[serde(serialize_with = "super::hex::serialize")]
        addr: Address,
        #[serde(serialize_with = "super::hex::serialize")]
        hash: H256,
        #[serde(serialize_with = "super::hex::serialize")]
        empty: Vec<u8>,
        #[serde(serialize_with = "super::hex::option")]
        absent: Option<Vec<u8>>,
        #[serde(serialize_with = "super::hex::option")]
        present: Option<Address>,
        #[serde(serialize_with = "super::decimal::serialize")]
        big: U256,
        #[serde(serialize_with = "super::decimal::serialize")]
        wide: u128,
        #[serde(serialize_with = "super::decimal::seq")]
        many: Vec<u128>,
        small: u16,
    }

    #[test]
    fn rendering() {
        let sample = Sample {
            addr: Address::repeat_byte(0xab),
            hash: H256::zero(),
            empty: vec![],
            absent: None,
            present: Some(Address::repeat_byte(0x01)),
            big: U256::MAX,
            wide: u128::MAX,
            many: vec![0, 1 << 100],
            small: 7,
        };
        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            json!({
                "addr": "0xabababababababababababababababababababab",
                "hash": format!("0x{}", "00".repeat(32)),
                "empty": "0x",
                "absent": null,
                "present": "0x0101010101010101010101010101010101010101",
                "big": "115792089237316195423570985008687907853269984665640564039457584007913129639935",
                "wide": "340282366920938463463374607431768211455",
                "many": ["0", "1267650600228229401496703205376"],
                "small": 7,
            })
        );
    }

    #[test]
    fn keys_keep_declaration_order() {
        let sample = Sample {
            addr: Address::zero(),
            hash: H256::zero(),
            empty: vec![1],
            absent: Some(vec![2]),
            present: None,
            big: U256::zero(),
            wide: 0,
            many: vec![],
            small: 0,
        };
        let s = serde_json::to_string(&sample).unwrap();
        let keys = [
            "addr", "hash", "empty", "absent", "present", "big", "wide", "many", "small",
        ]
        .map(|key| s.find(&format!("\"{key}\"")).unwrap());
        assert!(keys.windows(2).all(|it| it[0] < it[1]));
        assert!(s.contains(r#""absent":"0x02""#));
    }
}
