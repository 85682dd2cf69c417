//! Account-based ledger transaction construction, signing, and recovery.
//!
//! This crate builds, serializes, signs, and authenticates Ethereum
//! transactions across the three standard wire variants.
//!
//! # Transaction Types
//!
//! - **Legacy (untyped)**: Pre-EIP-2718 transactions, optionally with EIP-155
//!   replay protection via a chain id folded into the signing digest and `v`
//! - **Access list (0x01)**: EIP-2930 transactions carrying an access list
//! - **Fee market (0x02)**: EIP-1559 transactions with split gas pricing
//!
//! # Usage
//!
//! ```text
//! use eth_tx::{Transaction, TxVariant, Value};
//!
//! // Build a transaction from named fields
//! let mut tx = Transaction::from_map(TxVariant::Legacy, [
//!     ("nonce", Value::from("0x09")),
//!     ("gasPrice", Value::from("0x4a817c800")),
//!     ("gasLimit", Value::from("0x5208")),
//!     ("to", Value::from("0x3535353535353535353535353535353535353535")),
//!     ("value", Value::from("0xde0b6b3a7640000")),
//!     ("chainId", Value::from(1u64)),
//! ])?;
//!
//! // Sign with a hex-encoded private key and get the wire bytes
//! let raw = tx.sign("0x4646464646464646464646464646464646464646464646464646464646464646")?;
//!
//! // Or decode existing wire bytes and recover the sender
//! let mut decoded = Transaction::decode(&raw)?;
//! decoded.set("chainId", Value::from(1u64))?;
//! let sender = decoded.from_address()?;
//! ```
//!
//! # Architecture
//!
//! Each transaction is a sparse slot-indexed record validated against a
//! per-variant field schema:
//!
//! 1. [`schema::Schema`] - Declarative field table (slot, length, zero and
//!    list permissions) selected by [`TxVariant`]
//! 2. [`Value`] - Normalized field payloads (hex text, integers, access lists)
//! 3. [`Transaction`] - The record itself: validated setters, wire
//!    encode/decode, signing, and sender recovery
//!
//! Wire encoding is delegated to the RLP list codec (`alloy-rlp`), hashing to
//! `alloy_primitives::keccak256`, and curve operations to `secp256k1`; this
//! crate owns the field ordering, normalization, digest construction, and
//! replay-protection rules layered on top of them.

mod codec;
pub mod error;
pub mod record;
mod recovery;
pub mod schema;
mod signer;
pub mod value;

// Re-export main types
pub use error::Error;
pub use record::Transaction;
pub use schema::{FieldRule, Schema, TxVariant};
pub use value::Value;
