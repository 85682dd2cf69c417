//! Adapter between transaction records and the RLP list codec.
//!
//! Wire slots are a recursive structure (byte strings plus the nested
//! access-list tuples), so encoding goes through a small [`Item`] tree
//! layered over `alloy-rlp` headers. The codec itself stays external; this
//! module only arranges slots into the positional array the list codec
//! expects and back.

use std::collections::BTreeMap;

use alloy_rlp::{BufMut, Decodable, Encodable, Header, PayloadView};

use crate::error::Error;
use crate::value::Value;

/// One RLP-encodable wire item: a byte string or a nested list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

impl Encodable for Item {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Item::Bytes(bytes) => match bytes.as_slice() {
                [byte] if *byte < 0x80 => out.put_u8(*byte),
                _ => {
                    Header {
                        list: false,
                        payload_length: bytes.len(),
                    }
                    .encode(out);
                    out.put_slice(bytes);
                }
            },
            Item::List(items) => {
                let payload_length = items.iter().map(Encodable::length).sum();
                Header {
                    list: true,
                    payload_length,
                }
                .encode(out);
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            Item::Bytes(bytes) => match bytes.as_slice() {
                [byte] if *byte < 0x80 => 1,
                _ => {
                    let header = Header {
                        list: false,
                        payload_length: bytes.len(),
                    };
                    header.length() + bytes.len()
                }
            },
            Item::List(items) => {
                let payload_length: usize = items.iter().map(Encodable::length).sum();
                let header = Header {
                    list: true,
                    payload_length,
                };
                header.length() + payload_length
            }
        }
    }
}

impl Decodable for Item {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        match Header::decode_raw(buf)? {
            PayloadView::String(payload) => Ok(Item::Bytes(payload.to_vec())),
            PayloadView::List(items) => {
                let mut decoded = Vec::with_capacity(items.len());
                for mut item in items {
                    decoded.push(Item::decode(&mut item)?);
                }
                Ok(Item::List(decoded))
            }
        }
    }
}

/// Encode an ordered slot array as a single RLP list.
pub(crate) fn encode_items(items: &[Item]) -> Vec<u8> {
    let payload_length: usize = items.iter().map(Encodable::length).sum();
    let header = Header {
        list: true,
        payload_length,
    };
    let mut out = Vec::with_capacity(header.length() + payload_length);
    header.encode(&mut out);
    for item in items {
        item.encode(&mut out);
    }
    out
}

/// Decode a single RLP list into its top-level items.
///
/// Trailing bytes after the list are rejected.
pub(crate) fn decode_items(bytes: &[u8]) -> Result<Vec<Item>, Error> {
    let mut buf = bytes;
    let items = match Header::decode_raw(&mut buf).map_err(Error::Decode)? {
        PayloadView::List(items) => items,
        PayloadView::String(_) => {
            return Err(Error::Decode(alloy_rlp::Error::UnexpectedString));
        }
    };
    if !buf.is_empty() {
        return Err(Error::Decode(alloy_rlp::Error::Custom(
            "trailing bytes after transaction payload",
        )));
    }

    let mut decoded = Vec::with_capacity(items.len());
    for mut item in items {
        decoded.push(Item::decode(&mut item).map_err(Error::Decode)?);
    }
    Ok(decoded)
}

/// Arrange record slots into a fixed-width positional array.
///
/// Gaps are filled with the empty byte string; virtual (negative) slots and
/// slots beyond the requested width are skipped. The wire format is
/// order-significant, so slots must come out strictly ascending - guaranteed
/// here by the ordered map.
pub(crate) fn positional_items(slots: &BTreeMap<i8, Value>, width: usize) -> Vec<Item> {
    let mut items = vec![Item::Bytes(Vec::new()); width];
    let mut previous = i8::MIN;
    for (&slot, value) in slots {
        debug_assert!(previous == i8::MIN || slot > previous, "slot order must be ascending");
        previous = slot;
        if slot < 0 {
            continue;
        }
        if let Some(entry) = items.get_mut(slot as usize) {
            *entry = value.to_item();
        }
    }
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn roundtrip(items: Vec<Item>) {
        let encoded = encode_items(&items);
        let decoded = decode_items(&encoded).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(encode_items(&[]), vec![0xc0]);
        roundtrip(vec![]);
    }

    #[test]
    fn test_single_byte_items() {
        let items = vec![
            Item::Bytes(vec![0x01]),
            Item::Bytes(Vec::new()),
            Item::Bytes(vec![0x80]),
        ];
        let encoded = encode_items(&items);
        // 0x01 encodes as itself, empty as 0x80, 0x80 as 0x81 0x80.
        assert_eq!(encoded, vec![0xc4, 0x01, 0x80, 0x81, 0x80]);
        roundtrip(items);
    }

    #[test]
    fn test_nested_list_roundtrip() {
        roundtrip(vec![
            Item::Bytes(vec![0x0a]),
            Item::List(vec![
                Item::List(vec![
                    Item::Bytes(vec![0x35; 20]),
                    Item::List(vec![Item::Bytes(vec![0x01; 32])]),
                ]),
            ]),
        ]);
    }

    #[test]
    fn test_rejects_non_canonical_single_byte() {
        // 0x81 0x05 must have been encoded as the single byte 0x05.
        let result = decode_items(&[0xc2, 0x81, 0x05]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let encoded = encode_items(&[Item::Bytes(vec![0x01])]);
        let mut extended = encoded;
        extended.push(0x00);
        assert!(decode_items(&extended).is_err());
    }

    #[test]
    fn test_rejects_bare_string() {
        assert!(decode_items(&[0x81, 0xff]).is_err());
    }

    #[test]
    fn test_positional_gap_fill() {
        let mut slots = BTreeMap::new();
        slots.insert(-1, Value::Text("0xff".into()));
        slots.insert(0, Value::Text("0x09".into()));
        slots.insert(3, Value::Text("0x35".into()));

        let items = positional_items(&slots, 6);
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], Item::Bytes(vec![0x09]));
        assert_eq!(items[1], Item::Bytes(Vec::new()));
        assert_eq!(items[3], Item::Bytes(vec![0x35]));
        // Virtual slots never reach the wire.
        assert!(!items.contains(&Item::Bytes(vec![0xff])));
    }

    #[test]
    fn test_positional_truncates_to_width() {
        let mut slots = BTreeMap::new();
        slots.insert(0, Value::Text("0x09".into()));
        slots.insert(7, Value::Text("0xaa".into()));

        let items = positional_items(&slots, 6);
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], Item::Bytes(vec![0x09]));
    }
}
