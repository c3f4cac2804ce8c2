//! Pure position financial model.
//!
//! Every operation is side-effect free and integer-only. Inputs that would
//! make a result meaningless (zero leverage, zero size) fail fast with
//! `EngineError::InvalidInput`; the only deliberate exceptions are the
//! documented epsilon on the PnL divisor and the zero floor on payouts.

use crate::domain::Direction;
use crate::error::EngineError;

use super::fixed::{clamp_u64, mul_div, BPS_SCALE, LEVERAGE_SCALE};

/// 0.99 at leverage scale: the margin fraction numerator used for the
/// liquidation price (liquidation fires when 99% of collateral is gone).
const LIQUIDATION_MARGIN_NUMERATOR: u64 = 990_000;

/// Signed profit/loss of a position at a given mark price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pnl {
    /// Profit (positive) or loss (negative) in amount units (10^6 scale).
    pub amount: i128,
    /// Return on position size in basis points.
    pub bps: i64,
}

impl Pnl {
    pub fn is_profit(&self) -> bool {
        self.amount >= 0
    }
}

/// Leverage ratio `size / collateral` at 10^6 scale.
/// Returns 0 when collateral is 0 rather than dividing by zero.
pub fn leverage(collateral: u64, size: u64) -> u64 {
    if collateral == 0 {
        return 0;
    }
    mul_div(size, LEVERAGE_SCALE, collateral)
}

/// Price at which a position becomes liquidatable.
///
/// The margin fraction is 0.99 / leverage: a long is liquidated at
/// `entry * (1 - margin)`, a short at `entry * (1 + margin)`. Callers must
/// have validated leverage already; a zero leverage or entry price here is
/// an error, never a silently nonsensical price.
pub fn liquidation_price(
    entry_price: u64,
    direction: Direction,
    leverage: u64,
) -> Result<u64, EngineError> {
    if leverage == 0 {
        return Err(EngineError::InvalidInput(
            "leverage must be positive".to_string(),
        ));
    }
    if entry_price == 0 {
        return Err(EngineError::InvalidInput(
            "entry price must be positive".to_string(),
        ));
    }

    let margin = mul_div(LIQUIDATION_MARGIN_NUMERATOR, LEVERAGE_SCALE, leverage);
    let price = match direction {
        // Sub-1x leverage puts the long trigger at or below zero.
        Direction::Long => mul_div(
            entry_price,
            LEVERAGE_SCALE.saturating_sub(margin),
            LEVERAGE_SCALE,
        ),
        Direction::Short => {
            let wide = entry_price as u128 * (LEVERAGE_SCALE as u128 + margin as u128)
                / LEVERAGE_SCALE as u128;
            clamp_u64(wide)
        }
    };
    Ok(price)
}

/// Running profit/loss of a position at `current_price`.
///
/// The divisor is `entry_price + 1` so a zero entry price cannot divide by
/// zero; at realistic 10^8-scaled prices the bias is negligible.
pub fn pnl(entry_price: u64, current_price: u64, size: u64, direction: Direction) -> Pnl {
    let entry = entry_price as i128;
    let diff = current_price as i128 - entry;
    let safe_entry = entry + 1;
    let sign = direction.sign() as i128;

    Pnl {
        amount: diff * size as i128 / safe_entry * sign,
        bps: (diff * BPS_SCALE as i128 / safe_entry * sign) as i64,
    }
}

/// Remaining collateral after PnL as basis points of position size.
pub fn margin_ratio(collateral: u64, pnl_amount: i128, size: u64) -> Result<i64, EngineError> {
    if size == 0 {
        return Err(EngineError::InvalidInput("size must be positive".to_string()));
    }
    let ratio = (collateral as i128 + pnl_amount) * BPS_SCALE as i128 / size as i128;
    Ok(ratio as i64)
}

/// Liquidation trigger. The boundary is exclusive: a ratio exactly at the
/// threshold is still healthy.
pub fn is_liquidatable(margin_ratio_bps: i64, threshold_bps: i64) -> bool {
    margin_ratio_bps < threshold_bps
}

/// Borrow fee accrued over `blocks_open` blocks: `size * blocks / divisor`.
pub fn borrow_fee(size: u64, blocks_open: u32, fee_divisor: u64) -> u64 {
    mul_div(size, blocks_open as u64, fee_divisor)
}

/// Expected payout a close/liquidate call should pre-commit to.
///
/// Computes collateral plus signed PnL minus the accrued borrow fee, floored
/// at zero on the loss side, then scaled down by `safety_buffer_pct`. The
/// ledger validates the committed value against a slippage tolerance, so
/// under-estimating prevents spurious rejection from execution-time price
/// drift at the cost of a few unclaimed micro-units. A positive unbuffered
/// payout never rounds down to zero: the minimum is one micro-unit, because
/// a zero-value transfer is rejected downstream.
#[allow(clippy::too_many_arguments)]
pub fn expected_payout(
    collateral: u64,
    size: u64,
    entry_price: u64,
    current_price: u64,
    direction: Direction,
    blocks_open: u32,
    safety_buffer_pct: u64,
    borrow_fee_divisor: u64,
) -> u64 {
    let pnl = pnl(entry_price, current_price, size, direction);
    let fee = borrow_fee(size, blocks_open, borrow_fee_divisor) as i128;
    let unbuffered = collateral as i128 + pnl.amount - fee;
    if unbuffered <= 0 {
        return 0;
    }

    let buffered = unbuffered * safety_buffer_pct as i128 / 100;
    clamp_u64(buffered.max(1) as u128)
}
