//! Domain primitives: Address, PositionId, BlockHeight, Direction.

use serde::{Deserialize, Serialize};

/// Ledger account address (bech32-style string, e.g. "aleo1...").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Create an Address from a string.
    pub fn new(addr: String) -> Self {
        Address(addr)
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque position identifier in the ledger's field-element domain
/// (e.g. "12345field"). May carry a trailing visibility suffix such as
/// ".private" when taken verbatim from a record plaintext.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

impl PositionId {
    /// Create a PositionId from a string.
    pub fn new(id: String) -> Self {
        PositionId(id)
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block height on the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct BlockHeight(pub u32);

impl BlockHeight {
    /// Create a BlockHeight from a raw height.
    pub fn new(height: u32) -> Self {
        BlockHeight(height)
    }

    /// Get the underlying height value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Blocks elapsed since an earlier height. Saturates at zero if `earlier`
    /// is in the future (clock skew between explorer reads).
    pub fn blocks_since(&self, earlier: BlockHeight) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Trade direction: Long or Short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Long exposure (profits when price rises).
    Long,
    /// Short exposure (profits when price falls).
    Short,
}

impl Direction {
    /// Get the signed multiplier for this direction (+1 for Long, -1 for Short).
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }

    /// Map from the boolean the on-chain record encodes.
    pub fn from_is_long(is_long: bool) -> Self {
        if is_long {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Direction::Long)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}
