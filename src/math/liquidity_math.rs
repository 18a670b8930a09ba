use crate::RESOLUTION;
use crate::error::MathError;
use crate::math::math_helpers::{mul_div, u256_to_u128};
use alloy_primitives::U256;

/// Applies a signed liquidity delta, failing instead of wrapping.
pub fn add_delta(liquidity: u128, delta: i128) -> Result<u128, MathError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::Underflow)
    } else {
        liquidity
            .checked_add(delta as u128)
            .ok_or(MathError::Overflow)
    }
}

/// Liquidity supported by `amount` of token A over `[sqrt_price_lower, sqrt_price_upper]`,
/// rounded down: `amount * lower * upper / (upper - lower) / 2^64`.
pub fn liquidity_from_a(
    amount: u64,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
) -> Result<u128, MathError> {
    if sqrt_price_upper <= sqrt_price_lower {
        return Err(MathError::DivisionByZero);
    }
    let numerator = U256::from(amount) * U256::from(sqrt_price_lower);
    let liquidity = mul_div(
        numerator,
        U256::from(sqrt_price_upper),
        U256::from(sqrt_price_upper - sqrt_price_lower),
    )? >> RESOLUTION;
    u256_to_u128(liquidity)
}

/// Liquidity supported by `amount` of token B over `[sqrt_price_lower, sqrt_price_upper]`,
/// rounded down: `amount * 2^64 / (upper - lower)`.
pub fn liquidity_from_b(
    amount: u64,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
) -> Result<u128, MathError> {
    if sqrt_price_upper <= sqrt_price_lower {
        return Err(MathError::DivisionByZero);
    }
    let liquidity = (U256::from(amount) << RESOLUTION) / U256::from(sqrt_price_upper - sqrt_price_lower);
    u256_to_u128(liquidity)
}
