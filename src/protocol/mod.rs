//! Builders for the protocol's transition calls.
//!
//! Each builder validates its inputs against the configured limits and
//! produces a [`SubmitRequest`] whose inputs are formatted exactly as the
//! deployed program expects them (type-suffixed integers, booleans and raw
//! record plaintexts in positional order).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{Address, BlockHeight, Direction, LpShare, PoolState, Position};
use crate::error::EngineError;
use crate::math::fixed::{mul_div, BPS_SCALE};
use crate::math::{expected_payout, leverage};

/// One opaque protocol call, ready to hand to the wallet capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub program: String,
    pub function: String,
    pub inputs: Vec<String>,
    /// Fee in microcredits.
    pub fee: u64,
}

/// Builds submit requests for the trading protocol's transitions.
#[derive(Debug, Clone)]
pub struct CallBuilder {
    config: EngineConfig,
}

impl CallBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build an `open_position` call.
    ///
    /// Rejects zero collateral/size, dust-sized positions, and leverage
    /// outside (0, max]. The contract stores collateral as u128.
    pub fn open_position(
        &self,
        collateral: u64,
        size: u64,
        direction: Direction,
        entry_price: u64,
        max_slippage: u64,
        recipient: &Address,
    ) -> Result<SubmitRequest, EngineError> {
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
        if size < self.config.min_position_size {
            return Err(EngineError::InvalidInput(format!(
                "size {} below minimum {}",
                size, self.config.min_position_size
            )));
        }

        let lev = leverage(collateral, size);
        if lev == 0 || lev > self.config.max_leverage {
            return Err(EngineError::InvalidInput(format!(
                "leverage {} outside (0, {}]",
                lev, self.config.max_leverage
            )));
        }

        Ok(SubmitRequest {
            program: self.config.program_id.clone(),
            function: "open_position".to_string(),
            inputs: vec![
                format!("{}u128", collateral),
                format!("{}u64", size),
                direction.is_long().to_string(),
                format!("{}u64", entry_price),
                format!("{}u64", max_slippage),
                generate_nonce(),
                recipient.to_string(),
            ],
            fee: self.config.transaction_fee,
        })
    }

    /// Build a `close_position` call.
    ///
    /// The price bounds come from the current price plus/minus the
    /// configured slippage tolerance; the pre-committed payout is the
    /// buffered model value, coerced up to one micro-unit because the
    /// contract's public transfer rejects a zero amount.
    pub fn close_position(
        &self,
        position: &Position,
        current_price: u64,
        current_block: BlockHeight,
    ) -> Result<SubmitRequest, EngineError> {
        let plaintext = position.plaintext.as_ref().ok_or_else(|| {
            EngineError::InvalidInput(
                "position has no retained record plaintext to resubmit".to_string(),
            )
        })?;
        if current_price == 0 {
            return Err(EngineError::InvalidInput(
                "current price must be positive".to_string(),
            ));
        }

        let slippage = mul_div(
            current_price,
            self.config.default_slippage_bps,
            BPS_SCALE as u64,
        );
        let min_price = current_price.saturating_sub(slippage);
        let max_price = current_price.saturating_add(slippage);

        let blocks_open = current_block.blocks_since(position.open_block);
        let payout = expected_payout(
            position.collateral,
            position.size,
            position.entry_price,
            current_price,
            position.direction,
            blocks_open,
            self.config.safety_buffer_pct,
            self.config.borrow_fee_divisor,
        )
        .max(1);

        Ok(SubmitRequest {
            program: self.config.program_id.clone(),
            function: "close_position".to_string(),
            inputs: vec![
                plaintext.clone(),
                format!("{}u64", min_price),
                format!("{}u64", max_price),
                format!("{}u128", payout),
            ],
            fee: self.config.transaction_fee,
        })
    }

    /// Build an `add_liquidity` call. The contract stores the deposit as u128.
    pub fn add_liquidity(
        &self,
        amount: u64,
        recipient: &Address,
    ) -> Result<SubmitRequest, EngineError> {
        if amount < self.config.min_liquidity {
            return Err(EngineError::InvalidInput(format!(
                "deposit {} below minimum {}",
                amount, self.config.min_liquidity
            )));
        }

        Ok(SubmitRequest {
            program: self.config.program_id.clone(),
            function: "add_liquidity".to_string(),
            inputs: vec![format!("{}u128", amount), recipient.to_string()],
            fee: self.config.transaction_fee,
        })
    }

    /// Build a `remove_liquidity` call burning `lp_amount` of the given
    /// share. The expected USDC is the share's pro-rata slice of pool
    /// liquidity; the +1 on the supply keeps an empty pool from dividing
    /// by zero.
    pub fn remove_liquidity(
        &self,
        share: &LpShare,
        lp_amount: u64,
        pool: &PoolState,
    ) -> Result<SubmitRequest, EngineError> {
        if lp_amount == 0 {
            return Err(EngineError::InvalidInput(
                "lp amount must be positive".to_string(),
            ));
        }
        if lp_amount > share.amount {
            return Err(EngineError::InvalidInput(format!(
                "lp amount {} exceeds share balance {}",
                lp_amount, share.amount
            )));
        }

        let expected_usdc = mul_div(
            lp_amount,
            pool.total_liquidity,
            pool.total_lp_shares.saturating_add(1),
        );

        Ok(SubmitRequest {
            program: self.config.program_id.clone(),
            function: "remove_liquidity".to_string(),
            inputs: vec![
                share.record.clone(),
                format!("{}u64", lp_amount),
                format!("{}u128", expected_usdc),
            ],
            fee: self.config.transaction_fee,
        })
    }
}

/// Random field-element nonce for record uniqueness, drawn from uuid-v4
/// entropy (122 random bits, comfortably inside the field modulus).
pub fn generate_nonce() -> String {
    format!("{}field", Uuid::new_v4().as_u128())
}
