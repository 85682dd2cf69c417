//! The transaction record: a sparse, ordered store of field slots.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, B256};
use tracing::trace;

use crate::codec::{self, Item};
use crate::error::Error;
use crate::schema::TxVariant;
use crate::value::{self, Value};

/// An account-based ledger transaction under construction or decoded from
/// wire bytes.
///
/// Fields live in a sparse slot map ordered by the active variant's schema.
/// Named setters validate and normalize on the way in; the decode path stores
/// raw positional slots and bypasses validation. Negative slots hold virtual
/// fields (cached sender, legacy chain id) that never reach the wire.
///
/// A record is an independent value: no shared state, no interior caching
/// beyond the slots themselves. Callers that share one across threads must
/// serialize access externally.
#[derive(Clone, Debug)]
pub struct Transaction {
    variant: TxVariant,
    slots: BTreeMap<i8, Value>,
}

impl Transaction {
    /// Create an empty record for the given variant.
    pub fn new(variant: TxVariant) -> Self {
        Self {
            variant,
            slots: BTreeMap::new(),
        }
    }

    /// Build a record from named fields.
    ///
    /// Entries are applied through the validated setter; `Null` values and
    /// unknown field names store nothing, so a map of only null entries
    /// yields a record equal to the empty one.
    pub fn from_map<I, K, V>(variant: TxVariant, fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut tx = Self::new(variant);
        for (name, value) in fields {
            tx.set(name.as_ref(), value)?;
        }
        Ok(tx)
    }

    /// Decode a record of the given variant from wire bytes.
    ///
    /// A single leading type byte in `0x00..=0x7f` is stripped; legacy
    /// payloads have none (their first byte is the RLP list prefix). The
    /// remaining bytes are decoded into positional slots, every non-empty
    /// byte string re-prefixed with `0x`. Decoded slots bypass the schema
    /// validator.
    pub fn from_bytes(variant: TxVariant, bytes: &[u8]) -> Result<Self, Error> {
        let (&first, rest) = bytes
            .split_first()
            .ok_or(Error::Decode(alloy_rlp::Error::InputTooShort))?;
        let payload = if first <= 0x7f { rest } else { bytes };

        let items = codec::decode_items(payload)?;
        let mut slots = BTreeMap::new();
        for (index, item) in items.into_iter().enumerate() {
            // Anything past i8 range could never correspond to a schema slot.
            let Ok(slot) = i8::try_from(index) else { break };
            slots.insert(slot, decoded_value(item));
        }
        trace!(variant = ?variant, slots = slots.len(), "decoded transaction fields");

        Ok(Self { variant, slots })
    }

    /// Decode a record of the given variant from a hex string, `0x` prefix
    /// optional.
    pub fn from_encoded(variant: TxVariant, encoded: &str) -> Result<Self, Error> {
        if !value::is_hex(encoded) {
            return Err(Error::InvalidHex);
        }
        let bytes =
            hex::decode(value::strip_hex_prefix(encoded)).map_err(|_| Error::InvalidHex)?;
        Self::from_bytes(variant, &bytes)
    }

    /// Decode wire bytes, inferring the variant from the leading byte.
    ///
    /// `0x01`/`0x02` select the typed variants; an RLP list prefix
    /// (`>= 0xc0`) selects legacy; any other leading byte is an unsupported
    /// transaction type.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.first() {
            None => Err(Error::Decode(alloy_rlp::Error::InputTooShort)),
            Some(0x01) => Self::from_bytes(TxVariant::AccessList, bytes),
            Some(0x02) => Self::from_bytes(TxVariant::FeeMarket, bytes),
            Some(first) if *first >= 0xc0 => Self::from_bytes(TxVariant::Legacy, bytes),
            Some(_) => Err(Error::Decode(alloy_rlp::Error::Custom(
                "unsupported transaction type",
            ))),
        }
    }

    /// The wire variant of this record.
    pub fn variant(&self) -> TxVariant {
        self.variant
    }

    /// Set a named field, validating and normalizing the value.
    ///
    /// Unknown field names are ignored, as are `Null` values; a failed
    /// validation leaves the record unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let Some((field, rule)) = self.variant.schema().entry(name) else {
            return Ok(());
        };
        let value = value.into();
        if matches!(value, Value::Null) {
            return Ok(());
        }
        let value = value::validate(field, rule, value)?;
        self.slots.insert(rule.slot, value);
        Ok(())
    }

    /// Read a named field; `None` marks an absent value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let rule = self.variant.schema().rule(name)?;
        self.slots.get(&rule.slot)
    }

    /// Remove a named field, if present.
    pub fn clear(&mut self, name: &str) {
        if let Some(rule) = self.variant.schema().rule(name) {
            self.slots.remove(&rule.slot);
        }
    }

    /// Serialize to final wire bytes.
    ///
    /// Builds the full-width positional array (unsigned v/r/s become empty
    /// placeholders), encodes it through the list codec, and prepends the
    /// type byte for the typed variants.
    pub fn serialize(&self) -> Vec<u8> {
        let schema = self.variant.schema();
        let items = codec::positional_items(&self.slots, schema.slot_count);
        let body = codec::encode_items(&items);

        match self.variant.type_byte() {
            Some(type_byte) => {
                let mut out = Vec::with_capacity(1 + body.len());
                out.push(type_byte);
                out.extend_from_slice(&body);
                out
            }
            None => body,
        }
    }

    /// Hash of the serialized transaction (type byte included).
    pub fn tx_hash(&self) -> B256 {
        keccak256(self.serialize())
    }

    /// The chain id as an integer, treating empty/zero as absent.
    pub(crate) fn chain_id(&self) -> Result<Option<u64>, Error> {
        match self.get("chainId") {
            None => Ok(None),
            Some(value) => match value.as_u64("chainId")? {
                0 => Ok(None),
                id => Ok(Some(id)),
            },
        }
    }

    pub(crate) fn slots(&self) -> &BTreeMap<i8, Value> {
        &self.slots
    }

    fn virtual_items(&self) -> BTreeMap<i8, Item> {
        self.slots
            .iter()
            .filter(|(slot, _)| **slot < 0)
            .map(|(slot, value)| (*slot, value.to_item()))
            .filter(|(_, item)| !matches!(item, Item::Bytes(bytes) if bytes.is_empty()))
            .collect()
    }
}

/// Wire-content equality: two records are equal when their full-width
/// positional arrays carry the same canonical bytes (so an absent slot equals
/// a stored empty string) and their non-empty virtual slots match.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        if self.variant != other.variant {
            return false;
        }
        let width = self.variant.schema().slot_count;
        codec::positional_items(&self.slots, width) == codec::positional_items(&other.slots, width)
            && self.virtual_items() == other.virtual_items()
    }
}

impl Eq for Transaction {}

fn decoded_value(item: Item) -> Value {
    match item {
        Item::Bytes(bytes) if bytes.is_empty() => Value::Text(String::new()),
        Item::Bytes(bytes) => Value::Text(format!("0x{}", hex::encode(bytes))),
        Item::List(items) => Value::List(items.into_iter().map(decoded_value).collect()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn call_fields() -> Vec<(&'static str, Value)> {
        vec![
            ("from", Value::from("0xb60e8dd61c5d32be8058bb8eb970870f07233155")),
            ("to", Value::from("0xd46e8dd67c5d32be8058bb8eb970870f07244567")),
            ("gas", Value::from("0x76c0")),
            ("gasPrice", Value::from("0x9184e72a000")),
            ("value", Value::from("0x9184e72a")),
            ("data", Value::from("0xd46e8dd67c5d32be8d46e8dd67c5d32be8058bb8eb970870f072445675058bb8eb970870f072445675")),
        ]
    }

    #[test]
    fn test_get_returns_stored_values() {
        let tx = Transaction::from_map(TxVariant::Legacy, call_fields()).unwrap();

        assert_eq!(
            tx.get("from"),
            Some(&Value::Text("0xb60e8dd61c5d32be8058bb8eb970870f07233155".into()))
        );
        assert_eq!(tx.get("gas"), Some(&Value::Text("0x76c0".into())));
        assert_eq!(tx.get("gasPrice"), Some(&Value::Text("0x9184e72a000".into())));
        assert_eq!(tx.get("chainId"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let mut tx = Transaction::from_map(TxVariant::Legacy, call_fields()).unwrap();

        tx.set("to", "0xb60e8dd61c5d32be8058bb8eb970870f07233155").unwrap();
        assert_eq!(
            tx.get("to"),
            Some(&Value::Text("0xb60e8dd61c5d32be8058bb8eb970870f07233155".into()))
        );

        tx.set("gas", "0x76").unwrap();
        assert_eq!(tx.get("gas"), Some(&Value::Text("0x76".into())));
        // gas and gasLimit share a slot.
        assert_eq!(tx.get("gasLimit"), Some(&Value::Text("0x76".into())));

        tx.set("chainId", 4u64).unwrap();
        assert_eq!(tx.get("chainId"), Some(&Value::Uint(4)));
    }

    #[test]
    fn test_zero_collapses_unless_allowed() {
        let mut tx = Transaction::new(TxVariant::Legacy);
        tx.set("nonce", "0x00").unwrap();
        assert_eq!(tx.get("nonce"), Some(&Value::Text(String::new())));

        let zero_addr = "0x0000000000000000000000000000000000000000";
        tx.set("to", zero_addr).unwrap();
        assert_eq!(tx.get("to"), Some(&Value::Text(zero_addr.into())));
    }

    #[test]
    fn test_failed_set_leaves_record_unchanged() {
        let mut tx = Transaction::new(TxVariant::Legacy);
        tx.set("to", "0xd46e8dd67c5d32be8058bb8eb970870f07244567").unwrap();

        let before = tx.clone();
        let long = format!("0x{}", "35".repeat(21));
        assert!(tx.set("to", long.as_str()).is_err());
        assert_eq!(tx, before);
        assert_eq!(
            tx.get("to"),
            Some(&Value::Text("0xd46e8dd67c5d32be8058bb8eb970870f07244567".into()))
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let tx = Transaction::from_map(
            TxVariant::Legacy,
            [("blobHashes", Value::from("0x01")), ("nonce", Value::from("0x01"))],
        )
        .unwrap();
        assert_eq!(tx.get("nonce"), Some(&Value::Text("0x01".into())));
        assert_eq!(tx.get("blobHashes"), None);
    }

    #[test]
    fn test_empty_record_equivalence() {
        let bare = Transaction::new(TxVariant::Legacy);
        let from_empty_map =
            Transaction::from_map(TxVariant::Legacy, Vec::<(&str, Value)>::new()).unwrap();
        let from_null_entry =
            Transaction::from_map(TxVariant::Legacy, [("to", Value::Null)]).unwrap();

        assert_eq!(bare, from_empty_map);
        assert_eq!(bare, from_null_entry);
    }

    #[test]
    fn test_clear() {
        let mut tx = Transaction::from_map(TxVariant::Legacy, call_fields()).unwrap();
        tx.clear("to");
        assert_eq!(tx.get("to"), None);
    }

    #[test]
    fn test_equality_is_wire_content() {
        let a = Transaction::from_map(TxVariant::Legacy, [("nonce", Value::from("0x09"))]).unwrap();
        // Same canonical bytes, different spelling and explicit empty data.
        let b = Transaction::from_map(
            TxVariant::Legacy,
            [("nonce", Value::from(9u64)), ("data", Value::from(""))],
        )
        .unwrap();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.set("chainId", 1u64).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Transaction::from_encoded(TxVariant::Legacy, "not hex").is_err());
        assert!(Transaction::from_bytes(TxVariant::Legacy, &[]).is_err());
        assert!(Transaction::decode(&[0x05, 0xc0]).is_err());
    }
}
