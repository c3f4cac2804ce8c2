//! Position and LP share records decoded from the ledger.

use serde::{Deserialize, Serialize};

use super::{Address, BlockHeight, Direction, PositionId};
use crate::error::EngineError;

/// A leveraged long/short exposure decoded from a private ledger record.
///
/// Amounts (`size`, `collateral`) are USDC scaled by 10^6; `entry_price` is
/// scaled by 10^8. Mandatory fields are always positive; a record that would
/// violate that is rejected at construction instead of being carried around
/// with placeholder zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub owner: Address,
    pub id: PositionId,
    pub direction: Direction,
    /// Position size in quote-currency units, scaled by 10^6.
    pub size: u64,
    /// Posted collateral, scaled by 10^6.
    pub collateral: u64,
    /// Entry price, scaled by 10^8.
    pub entry_price: u64,
    pub open_block: BlockHeight,
    /// Raw record plaintext, retained verbatim so the position can be passed
    /// back to the protocol as a call input (close/liquidate).
    pub plaintext: Option<String>,
}

impl Position {
    /// Construct a position, validating the mandatory-field invariants
    /// (size > 0, collateral > 0, entry price > 0).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: Address,
        id: PositionId,
        direction: Direction,
        size: u64,
        collateral: u64,
        entry_price: u64,
        open_block: BlockHeight,
    ) -> Result<Self, EngineError> {
        if size == 0 {
            return Err(EngineError::InvalidInput("size must be positive".to_string()));
        }
        if collateral == 0 {
            return Err(EngineError::InvalidInput(
                "collateral must be positive".to_string(),
            ));
        }
        if entry_price == 0 {
            return Err(EngineError::InvalidInput(
                "entry price must be positive".to_string(),
            ));
        }

        Ok(Position {
            owner,
            id,
            direction,
            size,
            collateral,
            entry_price,
            open_block,
            plaintext: None,
        })
    }

    /// Attach the source record plaintext for later resubmission.
    pub fn with_plaintext(mut self, plaintext: String) -> Self {
        self.plaintext = Some(plaintext);
        self
    }
}

/// An LP share record (the pool's liquidity-provider token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpShare {
    /// Record identifier (the record nonce when available, otherwise empty).
    pub id: String,
    pub owner: Address,
    /// Share amount, scaled by 10^6 like USDC.
    pub amount: u64,
    /// Raw record blob, passed back verbatim when burning the share.
    pub record: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::new("aleo1abc".to_string())
    }

    #[test]
    fn test_position_new_valid() {
        let position = Position::new(
            owner(),
            PositionId::new("12345field".to_string()),
            Direction::Long,
            50_000_000,
            4_950_000,
            10_000_000_000_000,
            BlockHeight::new(0),
        )
        .unwrap();
        assert_eq!(position.size, 50_000_000);
        assert!(position.plaintext.is_none());
    }

    #[test]
    fn test_position_new_rejects_zero_size() {
        let result = Position::new(
            owner(),
            PositionId::new("1field".to_string()),
            Direction::Long,
            0,
            4_950_000,
            10_000_000_000_000,
            BlockHeight::new(0),
        );
        match result {
            Err(EngineError::InvalidInput(msg)) => assert!(msg.contains("size")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_position_new_rejects_zero_collateral() {
        let result = Position::new(
            owner(),
            PositionId::new("1field".to_string()),
            Direction::Short,
            50_000_000,
            0,
            10_000_000_000_000,
            BlockHeight::new(0),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_position_with_plaintext() {
        let position = Position::new(
            owner(),
            PositionId::new("1field".to_string()),
            Direction::Long,
            1_000_000,
            1_000_000,
            10_000_000_000_000,
            BlockHeight::new(0),
        )
        .unwrap()
        .with_plaintext("{ owner: aleo1abc }".to_string());
        assert!(position.plaintext.is_some());
    }
}
