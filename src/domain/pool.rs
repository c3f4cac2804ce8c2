//! Pool-wide public state read from on-chain mappings.

use serde::{Deserialize, Serialize};

use super::BlockHeight;

/// Aggregate pool totals, all USDC amounts scaled by 10^6.
///
/// Each field independently defaults to zero when its mapping entry is
/// absent. The protocol maintains `total_liquidity >= long OI + short OI`,
/// but that invariant is not enforced here: a client must tolerate reading
/// a violating snapshot without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolState {
    pub total_liquidity: u64,
    pub total_lp_shares: u64,
    pub long_open_interest: u64,
    pub short_open_interest: u64,
    pub accumulated_fees: u64,
}

impl PoolState {
    pub fn total_open_interest(&self) -> u64 {
        self.long_open_interest
            .saturating_add(self.short_open_interest)
    }
}

/// Oracle price from the public price mapping, scaled by 10^8.
///
/// The mapping entry may not exist yet (no price pushed); consumers fall
/// back to a caller-supplied synthetic price in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePrice {
    pub price: u64,
    /// Block height at which the price was set.
    pub block: BlockHeight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_state_default_is_zero() {
        let state = PoolState::default();
        assert_eq!(state.total_liquidity, 0);
        assert_eq!(state.total_open_interest(), 0);
    }

    #[test]
    fn test_total_open_interest_saturates() {
        let state = PoolState {
            long_open_interest: u64::MAX,
            short_open_interest: 1,
            ..Default::default()
        };
        assert_eq!(state.total_open_interest(), u64::MAX);
    }
}
