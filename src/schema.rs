//! Per-variant field schemas.
//!
//! Each transaction variant is described by a declarative table mapping a
//! field name to its wire slot and validation rule. The tables differ only in
//! slot numbering and field set; all shared behavior is driven by the
//! [`TxVariant`] descriptor rather than per-type implementations.

/// Validation rule and wire position for a single named field.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    /// Wire slot. Negative slots are virtual fields (cached sender, legacy
    /// chain id) that participate in digest math but are never encoded.
    pub slot: i8,
    /// Maximum payload width in bytes, when the field declares one.
    pub max_len: Option<usize>,
    /// Whether shorter-than-maximum representations are permitted.
    pub allow_short: bool,
    /// Whether numeric zero may be stored instead of collapsing to empty.
    pub allow_zero: bool,
    /// Whether the value may be a nested list (access lists only).
    pub allow_list: bool,
}

impl FieldRule {
    /// Bare slot mapping with no extra permissions (from, chain id).
    const fn strict(slot: i8) -> Self {
        Self {
            slot,
            max_len: None,
            allow_short: false,
            allow_zero: false,
            allow_list: false,
        }
    }

    /// Variable-width numeric quantity capped at 32 bytes.
    const fn quantity(slot: i8) -> Self {
        Self {
            slot,
            max_len: Some(32),
            allow_short: true,
            allow_zero: false,
            allow_list: false,
        }
    }

    /// 20-byte address field; the zero address is a legal stored value.
    const fn address(slot: i8) -> Self {
        Self {
            slot,
            max_len: Some(20),
            allow_short: false,
            allow_zero: true,
            allow_list: false,
        }
    }

    /// Unbounded byte payload (calldata).
    const fn payload(slot: i8) -> Self {
        Self {
            slot,
            max_len: None,
            allow_short: true,
            allow_zero: true,
            allow_list: false,
        }
    }

    /// Recovery parameter: small integer, zero is meaningful.
    const fn parity(slot: i8) -> Self {
        Self {
            slot,
            max_len: None,
            allow_short: false,
            allow_zero: true,
            allow_list: false,
        }
    }

    /// Signature magnitude (r or s), at most 32 bytes.
    const fn sig_word(slot: i8) -> Self {
        Self {
            slot,
            max_len: Some(32),
            allow_short: false,
            allow_zero: true,
            allow_list: false,
        }
    }

    /// Access list: nested (address, storage keys) tuples.
    const fn access_list(slot: i8) -> Self {
        Self {
            slot,
            max_len: None,
            allow_short: true,
            allow_zero: true,
            allow_list: true,
        }
    }
}

/// Ordered field table for one transaction variant.
#[derive(Debug)]
pub struct Schema {
    fields: &'static [(&'static str, FieldRule)],
    /// Full positional width of the wire list, v/r/s included.
    pub slot_count: usize,
    /// Leading slots covered by the signing digest (everything before v).
    pub digest_width: usize,
}

impl Schema {
    /// Look up a field rule by name.
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.entry(name).map(|(_, rule)| rule)
    }

    /// Look up a field by name, returning its canonical table entry.
    pub(crate) fn entry(&self, name: &str) -> Option<(&'static str, &FieldRule)> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(field, rule)| (*field, rule))
    }
}

static LEGACY: Schema = Schema {
    fields: &[
        ("from", FieldRule::strict(-1)),
        ("chainId", FieldRule::strict(-2)),
        ("nonce", FieldRule::quantity(0)),
        ("gasPrice", FieldRule::quantity(1)),
        ("gasLimit", FieldRule::quantity(2)),
        ("gas", FieldRule::quantity(2)),
        ("to", FieldRule::address(3)),
        ("value", FieldRule::quantity(4)),
        ("data", FieldRule::payload(5)),
        ("v", FieldRule::parity(6)),
        ("r", FieldRule::sig_word(7)),
        ("s", FieldRule::sig_word(8)),
    ],
    slot_count: 9,
    digest_width: 6,
};

static ACCESS_LIST: Schema = Schema {
    fields: &[
        ("from", FieldRule::strict(-1)),
        ("chainId", FieldRule::strict(0)),
        ("nonce", FieldRule::quantity(1)),
        ("gasPrice", FieldRule::quantity(2)),
        ("gasLimit", FieldRule::quantity(3)),
        ("gas", FieldRule::quantity(3)),
        ("to", FieldRule::address(4)),
        ("value", FieldRule::quantity(5)),
        ("data", FieldRule::payload(6)),
        ("accessList", FieldRule::access_list(7)),
        ("v", FieldRule::parity(8)),
        ("r", FieldRule::sig_word(9)),
        ("s", FieldRule::sig_word(10)),
    ],
    slot_count: 11,
    digest_width: 8,
};

static FEE_MARKET: Schema = Schema {
    fields: &[
        ("from", FieldRule::strict(-1)),
        ("chainId", FieldRule::strict(0)),
        ("nonce", FieldRule::quantity(1)),
        ("maxPriorityFeePerGas", FieldRule::quantity(2)),
        ("maxFeePerGas", FieldRule::quantity(3)),
        ("gasLimit", FieldRule::quantity(4)),
        ("gas", FieldRule::quantity(4)),
        ("to", FieldRule::address(5)),
        ("value", FieldRule::quantity(6)),
        ("data", FieldRule::payload(7)),
        ("accessList", FieldRule::access_list(8)),
        ("v", FieldRule::parity(9)),
        ("r", FieldRule::sig_word(10)),
        ("s", FieldRule::sig_word(11)),
    ],
    slot_count: 12,
    digest_width: 9,
};

/// Wire variant of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxVariant {
    /// Untyped pre-EIP-2718 transaction, optionally EIP-155 protected.
    Legacy,
    /// EIP-2930 access list transaction (type 0x01).
    AccessList,
    /// EIP-1559 fee market transaction (type 0x02).
    FeeMarket,
}

impl TxVariant {
    /// EIP-2718 type prefix byte, absent for legacy transactions.
    pub const fn type_byte(self) -> Option<u8> {
        match self {
            TxVariant::Legacy => None,
            TxVariant::AccessList => Some(0x01),
            TxVariant::FeeMarket => Some(0x02),
        }
    }

    /// The field schema for this variant.
    pub fn schema(self) -> &'static Schema {
        match self {
            TxVariant::Legacy => &LEGACY,
            TxVariant::AccessList => &ACCESS_LIST,
            TxVariant::FeeMarket => &FEE_MARKET,
        }
    }
}
