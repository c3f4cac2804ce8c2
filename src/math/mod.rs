//! Deterministic fixed-point financial math.

pub mod fixed;
pub mod position_model;

pub use fixed::{AMOUNT_SCALE, BPS_SCALE, LEVERAGE_SCALE, PRICE_SCALE};
pub use position_model::{
    borrow_fee, expected_payout, is_liquidatable, leverage, liquidation_price, margin_ratio, pnl,
    Pnl,
};
