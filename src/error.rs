//! Transaction-specific error types.

use thiserror::Error;

/// Errors raised while building, signing, or recovering a transaction.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value is wider than the schema allows.
    #[error("{field} exceeds the length limit")]
    FieldTooLong {
        /// Schema name of the offending field.
        field: &'static str,
    },

    /// A nested list was supplied for a scalar-only field.
    #[error("{field} should not be a list")]
    UnexpectedList {
        /// Schema name of the offending field.
        field: &'static str,
    },

    /// An integer-bearing field does not fit in 64 bits.
    #[error("{field} does not fit in 64 bits")]
    ValueTooLarge {
        /// Schema name of the offending field.
        field: &'static str,
    },

    /// The private key input is not usable hex key material.
    #[error("private key should be a hex encoded string")]
    MalformedKey,

    /// Sender recovery was attempted without both r and s populated.
    #[error("signature r and s are missing")]
    MissingSignature,

    /// The recovery parameter does not resolve to parity 0 or 1.
    #[error("recovery parameter is out of range")]
    InvalidRecoveryId,

    /// Input that should be hex encoded is not.
    #[error("input is not valid hex")]
    InvalidHex,

    /// The wire payload could not be decoded by the list codec.
    #[error("failed to decode transaction: {0}")]
    Decode(alloy_rlp::Error),

    /// Public-key recovery from the signature failed.
    #[error("failed to recover signer from signature")]
    Recovery,

    /// Unexpected failure inside the curve primitive.
    #[error("cryptographic primitive failure: {0}")]
    Crypto(#[from] secp256k1::Error),
}
