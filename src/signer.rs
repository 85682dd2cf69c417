//! Digest construction and the signing engine.

use alloy_primitives::{keccak256, B256};
use secp256k1::{Message, SecretKey};
use tracing::debug;

use crate::codec::{self, Item};
use crate::error::Error;
use crate::record::Transaction;
use crate::recovery::secp;
use crate::schema::TxVariant;
use crate::value::{self, Value};

impl Transaction {
    /// The pre-signature digest for the current field contents.
    ///
    /// Covers only the non-signature slots: typed variants hash the type
    /// byte followed by the truncated slot array; legacy transactions hash
    /// the six content slots, or the EIP-155 nine-slot form (chain id in the
    /// v position, r/s empty) when a non-zero chain id is present. The
    /// EIP-155 array is transient - the record itself is never touched.
    pub fn signature_hash(&self) -> Result<B256, Error> {
        let schema = self.variant().schema();
        let mut items = codec::positional_items(self.slots(), schema.digest_width);

        let payload = match self.variant().type_byte() {
            Some(type_byte) => {
                let body = codec::encode_items(&items);
                let mut buf = Vec::with_capacity(1 + body.len());
                buf.push(type_byte);
                buf.extend_from_slice(&body);
                buf
            }
            None => {
                if let Some(chain_id) = self.chain_id()? {
                    items.push(Item::Bytes(value::uint_bytes(chain_id)));
                    items.push(Item::Bytes(Vec::new()));
                    items.push(Item::Bytes(Vec::new()));
                }
                codec::encode_items(&items)
            }
        };
        Ok(keccak256(payload))
    }

    /// Sign the transaction with a hex-encoded private key and return the
    /// fully serialized signed bytes.
    ///
    /// The signature is deterministic (RFC 6979) and canonical (low-s), so
    /// signing identical content with the same key twice yields byte-identical
    /// output. For legacy transactions v is `parity + 35 + 2 * chain_id` when
    /// a non-zero chain id is present (EIP-155); the typed variants store the
    /// raw parity bit.
    pub fn sign(&mut self, private_key: &str) -> Result<Vec<u8>, Error> {
        if !value::is_hex(private_key) {
            return Err(Error::MalformedKey);
        }
        let key_bytes =
            hex::decode(value::strip_hex_prefix(private_key)).map_err(|_| Error::MalformedKey)?;
        let secret = SecretKey::from_slice(&key_bytes).map_err(|_| Error::MalformedKey)?;

        let digest = self.signature_hash()?;
        let message = Message::from_digest_slice(digest.as_slice())?;
        let signature = secp().sign_ecdsa_recoverable(&message, &secret);
        let (recovery_id, compact) = signature.serialize_compact();
        let parity = recovery_id.to_i32() as u64;

        let v = match self.variant() {
            TxVariant::Legacy => {
                let base = parity + 35;
                match self.chain_id()? {
                    Some(chain_id) => chain_id
                        .checked_mul(2)
                        .and_then(|doubled| doubled.checked_add(base))
                        .ok_or(Error::ValueTooLarge { field: "chainId" })?,
                    None => base,
                }
            }
            TxVariant::AccessList | TxVariant::FeeMarket => parity,
        };

        self.set("r", minimal_hex(&compact[..32]))?;
        self.set("s", minimal_hex(&compact[32..]))?;
        self.set("v", Value::Uint(v))?;
        debug!(variant = ?self.variant(), v, "transaction signed");

        Ok(self.serialize())
    }
}

/// Minimal big-endian hex of a fixed-width magnitude (leading zero bytes
/// stripped).
fn minimal_hex(bytes: &[u8]) -> String {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    format!("0x{}", hex::encode(bytes.get(start..).unwrap_or_default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::TxVariant;
    use crate::value::Value;

    #[test]
    fn test_minimal_hex_strips_leading_zeros() {
        assert_eq!(minimal_hex(&[0x00, 0x00, 0x12, 0x34]), "0x1234");
        assert_eq!(minimal_hex(&[0x12]), "0x12");
        assert_eq!(minimal_hex(&[0x00, 0x00]), "0x");
    }

    #[test]
    fn test_chain_id_changes_legacy_digest() {
        let mut tx = Transaction::from_map(
            TxVariant::Legacy,
            [("nonce", Value::from("0x09")), ("gasLimit", Value::from("0x5208"))],
        )
        .unwrap();
        let unprotected = tx.signature_hash().unwrap();

        tx.set("chainId", 1u64).unwrap();
        let protected = tx.signature_hash().unwrap();
        assert_ne!(unprotected, protected);

        // Zero chain id behaves as absent.
        tx.set("chainId", 0u64).unwrap();
        assert_eq!(tx.signature_hash().unwrap(), unprotected);
    }

    #[test]
    fn test_digest_ignores_signature_slots() {
        let mut tx = Transaction::from_map(
            TxVariant::FeeMarket,
            [("chainId", Value::from(1u64)), ("nonce", Value::from("0x01"))],
        )
        .unwrap();
        let unsigned = tx.signature_hash().unwrap();

        tx.set("v", 1u64).unwrap();
        tx.set("r", "0x0102").unwrap();
        tx.set("s", "0x0304").unwrap();
        assert_eq!(tx.signature_hash().unwrap(), unsigned);
    }

    #[test]
    fn test_sign_rejects_malformed_keys() {
        let mut tx = Transaction::new(TxVariant::Legacy);
        assert!(matches!(tx.sign("not a key"), Err(Error::MalformedKey)));
        // Valid hex, wrong width.
        assert!(matches!(tx.sign("0x1234"), Err(Error::MalformedKey)));
        // Zero is not a valid scalar.
        let zeros = format!("0x{}", "00".repeat(32));
        assert!(matches!(tx.sign(&zeros), Err(Error::MalformedKey)));
    }
}
