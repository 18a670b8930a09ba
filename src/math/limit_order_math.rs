use crate::error::MathError;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up, u256_to_u64};
use crate::{Q64, RESOLUTION};
use alloy_primitives::U256;

/// Converts a limit order's input into its output at a tick's sqrt price.
/// An A to B order receives `input * price`, a B to A order `input / price`,
/// with `price = sqrt_price^2 / 2^128`.
pub fn get_limit_order_output_amount(
    input_amount: u64,
    a_to_b_order: bool,
    sqrt_price: u128,
    round_up: bool,
) -> Result<u64, MathError> {
    if input_amount == 0 {
        return Ok(0);
    }
    let sqrt_price = U256::from(sqrt_price);
    let q128 = Q64 << RESOLUTION;

    let (numerator, multiplier, denominator) = if a_to_b_order {
        (U256::from(input_amount) * sqrt_price, sqrt_price, q128)
    } else {
        (U256::from(input_amount), q128, sqrt_price * sqrt_price)
    };

    let output = if round_up {
        mul_div_rounding_up(numerator, multiplier, denominator)?
    } else {
        mul_div(numerator, multiplier, denominator)?
    };
    u256_to_u64(output)
}
