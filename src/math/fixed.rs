//! Scale-aware integer arithmetic helpers.
//!
//! All protocol values are scaled integers: USDC amounts carry 6 decimals,
//! prices carry 8, leverage ratios 6. Intermediate products are computed in
//! 128-bit precision so the maximum size x maximum price product cannot
//! overflow.

/// Scale for USDC amounts (6 decimals).
pub const AMOUNT_SCALE: u64 = 1_000_000;

/// Scale for prices (8 decimals).
pub const PRICE_SCALE: u64 = 100_000_000;

/// Scale for leverage ratios (6 decimals; 10_000_000 == 10x).
pub const LEVERAGE_SCALE: u64 = 1_000_000;

/// Basis points per whole (1 bp = 0.01%).
pub const BPS_SCALE: i64 = 10_000;

/// `value * numerator / denominator` with a 128-bit intermediate.
/// Returns 0 on a zero denominator; results beyond u64 clamp to `u64::MAX`.
pub fn mul_div(value: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let wide = value as u128 * numerator as u128 / denominator as u128;
    clamp_u64(wide)
}

/// Signed `value * numerator / denominator` with a 128-bit intermediate.
/// Returns 0 on a zero denominator. Truncates toward zero like Rust's `/`.
pub fn mul_div_signed(value: i128, numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    value * numerator / denominator
}

/// Clamp a 128-bit intermediate back into the u64 wire domain.
pub fn clamp_u64(value: u128) -> u64 {
    if value > u64::MAX as u128 {
        u64::MAX
    } else {
        value as u64
    }
}
