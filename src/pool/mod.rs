//! Pool-wide read model over the program's public mappings.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{OraclePrice, PoolState};
use crate::error::EngineError;
use crate::ledger::ChainReader;
use crate::math::fixed::mul_div;
use crate::parser::{parse_oracle_price, parse_pool_state};

/// Mapping names published by the program. Both are keyed by the single
/// market at `0field`.
const POOL_STATE_MAPPING: &str = "pool_state";
const ORACLE_PRICES_MAPPING: &str = "oracle_prices";
const MARKET_KEY: &str = "0field";

/// Half of the basis-point scale: the neutral midpoint reported when open
/// interest is empty.
const NEUTRAL_SHARE_BPS: u64 = 5_000;

/// Fetches and aggregates pool totals and the oracle price.
#[derive(Debug, Clone)]
pub struct PoolAccounting {
    reader: Arc<dyn ChainReader>,
    program_id: String,
}

impl PoolAccounting {
    pub fn new(reader: Arc<dyn ChainReader>, program_id: String) -> Self {
        Self { reader, program_id }
    }

    /// Read the current pool snapshot.
    ///
    /// An absent `pool_state` entry reads as an all-zero pool (nothing
    /// deposited yet); an absent or unparsable oracle entry reads as no
    /// price, which consumers replace with a synthetic fallback.
    pub async fn snapshot(&self) -> Result<PoolSnapshot, EngineError> {
        let state = match self
            .reader
            .read_mapping(&self.program_id, POOL_STATE_MAPPING, MARKET_KEY)
            .await?
        {
            Some(raw) => parse_pool_state(&raw),
            None => PoolState::default(),
        };

        let oracle = match self
            .reader
            .read_mapping(&self.program_id, ORACLE_PRICES_MAPPING, MARKET_KEY)
            .await?
        {
            Some(raw) => match parse_oracle_price(&raw) {
                Ok(price) => Some(price),
                Err(err) => {
                    warn!("Failed to parse oracle price: {}", err);
                    None
                }
            },
            None => None,
        };

        Ok(PoolSnapshot { state, oracle })
    }
}

/// One consistent read of pool totals plus the oracle price, with the
/// division-guarded derived values the caller renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub state: PoolState,
    pub oracle: Option<OraclePrice>,
}

impl PoolSnapshot {
    /// Open interest as basis points of pool liquidity; 0 for an empty pool.
    pub fn utilization_bps(&self) -> u64 {
        mul_div(
            self.state.total_open_interest(),
            10_000,
            self.state.total_liquidity,
        )
    }

    /// Long side's share of open interest in basis points; the neutral
    /// 50/50 midpoint when there is no open interest.
    pub fn long_share_bps(&self) -> u64 {
        let total = self.state.total_open_interest();
        if total == 0 {
            return NEUTRAL_SHARE_BPS;
        }
        mul_div(self.state.long_open_interest, 10_000, total)
    }

    /// Short side's share of open interest in basis points.
    pub fn short_share_bps(&self) -> u64 {
        let total = self.state.total_open_interest();
        if total == 0 {
            return NEUTRAL_SHARE_BPS;
        }
        mul_div(self.state.short_open_interest, 10_000, total)
    }

    /// Current USDC value of an LP share amount (pro-rata slice of pool
    /// liquidity; the +1 keeps an empty supply from dividing by zero).
    pub fn lp_share_value(&self, lp_amount: u64) -> u64 {
        mul_div(
            lp_amount,
            self.state.total_liquidity,
            self.state.total_lp_shares.saturating_add(1),
        )
    }

    /// The oracle price, or the caller-supplied synthetic fallback when the
    /// protocol has not set one yet.
    pub fn effective_price(&self, synthetic: u64) -> u64 {
        self.oracle.map(|o| o.price).unwrap_or(synthetic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlockHeight;
    use crate::ledger::MockChainReader;

    fn snapshot(state: PoolState) -> PoolSnapshot {
        PoolSnapshot {
            state,
            oracle: None,
        }
    }

    #[tokio::test]
    async fn test_snapshot_absent_mappings_default() {
        let accounting = PoolAccounting::new(
            Arc::new(MockChainReader::new()),
            "zkperp_v4.aleo".to_string(),
        );
        let snapshot = accounting.snapshot().await.unwrap();
        assert_eq!(snapshot.state, PoolState::default());
        assert!(snapshot.oracle.is_none());
        assert_eq!(snapshot.effective_price(42), 42);
    }

    #[tokio::test]
    async fn test_snapshot_reads_mappings() {
        let reader = MockChainReader::new()
            .with_entry(
                "pool_state",
                "0field",
                "{ total_liquidity: 100000000u64, total_lp_tokens: 50000000u64, long_open_interest: 30000000u64, short_open_interest: 10000000u64, accumulated_fees: 7u64 }",
            )
            .with_entry(
                "oracle_prices",
                "0field",
                "{ price: 10000000000000u64, timestamp: 5u32 }",
            );
        let accounting = PoolAccounting::new(Arc::new(reader), "zkperp_v4.aleo".to_string());
        let snapshot = accounting.snapshot().await.unwrap();

        assert_eq!(snapshot.state.total_liquidity, 100_000_000);
        assert_eq!(snapshot.state.accumulated_fees, 7);
        assert_eq!(
            snapshot.oracle,
            Some(OraclePrice {
                price: 10_000_000_000_000,
                block: BlockHeight::new(5),
            })
        );
        assert_eq!(snapshot.effective_price(42), 10_000_000_000_000);
        // (30M + 10M) / 100M = 40%
        assert_eq!(snapshot.utilization_bps(), 4_000);
        assert_eq!(snapshot.long_share_bps(), 7_500);
        assert_eq!(snapshot.short_share_bps(), 2_500);
    }

    #[tokio::test]
    async fn test_snapshot_unparsable_oracle_is_none() {
        let reader = MockChainReader::new().with_entry("oracle_prices", "0field", "garbage");
        let accounting = PoolAccounting::new(Arc::new(reader), "zkperp_v4.aleo".to_string());
        let snapshot = accounting.snapshot().await.unwrap();
        assert!(snapshot.oracle.is_none());
    }

    #[test]
    fn test_utilization_zero_liquidity() {
        let s = snapshot(PoolState {
            long_open_interest: 10,
            ..Default::default()
        });
        assert_eq!(s.utilization_bps(), 0);
    }

    #[test]
    fn test_shares_neutral_midpoint_without_oi() {
        let s = snapshot(PoolState {
            total_liquidity: 100,
            ..Default::default()
        });
        assert_eq!(s.long_share_bps(), 5_000);
        assert_eq!(s.short_share_bps(), 5_000);
    }

    #[test]
    fn test_client_tolerates_oi_exceeding_liquidity() {
        // A protocol-side invariant violation must not break derived math.
        let s = snapshot(PoolState {
            total_liquidity: 10,
            long_open_interest: 100,
            short_open_interest: 100,
            ..Default::default()
        });
        assert_eq!(s.utilization_bps(), 200_000);
    }

    #[test]
    fn test_lp_share_value_empty_pool() {
        let s = snapshot(PoolState::default());
        assert_eq!(s.lp_share_value(1_000_000), 0);
    }
}
