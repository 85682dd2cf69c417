//! Sender recovery from transaction signatures.

use std::sync::OnceLock;

use alloy_primitives::{keccak256, Address};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, Secp256k1};
use tracing::debug;

use crate::error::Error;
use crate::record::Transaction;
use crate::schema::TxVariant;
use crate::value::Value;

impl Transaction {
    /// Resolve the sender address from the signature fields.
    ///
    /// If a sender is already present it is returned unchanged. Otherwise
    /// the signing digest is recomputed, the public key recovered from
    /// (r, s) and the recovery parity, and the address derived as the last
    /// 20 bytes of the hashed key. The result is cached back into the record,
    /// so all signature fields must be final before the first call.
    ///
    /// For legacy transactions the parity is `v - 2 * chain_id - 35` (the
    /// chain id subtraction only when one is present); the typed variants
    /// use v directly.
    pub fn from_address(&mut self) -> Result<Address, Error> {
        if let Some(value) = self.get("from") {
            if !value.is_vacant() {
                if let Value::Text(from) = value {
                    return from.parse::<Address>().map_err(|_| Error::InvalidHex);
                }
            }
        }

        let r = self.signature_word("r")?;
        let s = self.signature_word("s")?;
        let v = self
            .get("v")
            .ok_or(Error::MissingSignature)?
            .as_u64("v")?;

        let parity = match self.variant() {
            TxVariant::Legacy => {
                let base = match self.chain_id()? {
                    Some(chain_id) => {
                        let doubled = chain_id.checked_mul(2).ok_or(Error::InvalidRecoveryId)?;
                        v.checked_sub(doubled).ok_or(Error::InvalidRecoveryId)?
                    }
                    None => v,
                };
                base.checked_sub(35).ok_or(Error::InvalidRecoveryId)?
            }
            TxVariant::AccessList | TxVariant::FeeMarket => v,
        };
        if parity > 1 {
            return Err(Error::InvalidRecoveryId);
        }
        let recovery_id =
            RecoveryId::from_i32(parity as i32).map_err(|_| Error::InvalidRecoveryId)?;

        let mut compact = [0u8; 64];
        compact[32 - r.len()..32].copy_from_slice(&r);
        compact[64 - s.len()..].copy_from_slice(&s);
        let signature =
            RecoverableSignature::from_compact(&compact, recovery_id).map_err(|_| Error::Recovery)?;

        let digest = self.signature_hash()?;
        let message = Message::from_digest_slice(digest.as_slice()).map_err(|_| Error::Recovery)?;
        let public_key = secp()
            .recover_ecdsa(&message, &signature)
            .map_err(|_| Error::Recovery)?;

        let uncompressed = public_key.serialize_uncompressed();
        let key_payload = uncompressed.get(1..).ok_or(Error::Recovery)?;
        let hash = keccak256(key_payload);
        let tail = hash.as_slice().get(12..).ok_or(Error::Recovery)?;
        let address = Address::from_slice(tail);

        self.set("from", format!("0x{}", hex::encode(tail)))?;
        debug!(from = %address, "sender recovered");
        Ok(address)
    }

    /// A signature magnitude as canonical bytes, required present, non-empty,
    /// and at most 32 bytes wide (decoded slots bypass the validator).
    fn signature_word(&self, name: &'static str) -> Result<Vec<u8>, Error> {
        let value = self.get(name).ok_or(Error::MissingSignature)?;
        match value.to_item() {
            crate::codec::Item::Bytes(bytes) if bytes.is_empty() => Err(Error::MissingSignature),
            crate::codec::Item::Bytes(bytes) if bytes.len() > 32 => {
                Err(Error::FieldTooLong { field: name })
            }
            crate::codec::Item::Bytes(bytes) => Ok(bytes),
            crate::codec::Item::List(_) => Err(Error::UnexpectedList { field: name }),
        }
    }
}

pub(crate) fn secp() -> &'static Secp256k1<All> {
    static SECP: OnceLock<Secp256k1<All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}
