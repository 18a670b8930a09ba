use crate::error::{Error, MathError};
use crate::math::token_math::{
    try_apply_swap_fee, try_get_amount_delta_a, try_get_amount_delta_b,
    try_get_next_sqrt_price_from_a, try_get_next_sqrt_price_from_b, try_reverse_apply_swap_fee,
};

/// Result of one constant-liquidity swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapStepQuote {
    pub amount_in: u64,
    pub amount_out: u64,
    pub next_sqrt_price: u128,
    pub fee_amount: u64,
}

/// Moves the price from `current_sqrt_price` towards `target_sqrt_price` with
/// constant `liquidity`, consuming at most `amount_remaining` of the
/// specified side. `amount_in` excludes the fee.
///
/// The amount of the specified side needed to reach the target ("fixed" delta)
/// may not fit in a u64; in that case the step cannot reach the target and the
/// next price is derived from the remaining amount instead.
pub fn compute_swap_step(
    amount_remaining: u64,
    fee_rate: u16,
    liquidity: u128,
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    a_to_b: bool,
    specified_input: bool,
) -> Result<SwapStepQuote, Error> {
    let initial_fixed_delta = match fixed_delta(
        current_sqrt_price,
        target_sqrt_price,
        liquidity,
        a_to_b,
        specified_input,
    ) {
        Ok(delta) => Some(delta),
        Err(MathError::AmountExceedsMaxU64) => None,
        Err(err) => return Err(err.into()),
    };

    let amount_calculated = if specified_input {
        try_apply_swap_fee(amount_remaining, fee_rate)?
    } else {
        amount_remaining
    };

    let next_sqrt_price = match initial_fixed_delta {
        Some(delta) if delta <= amount_calculated => target_sqrt_price,
        _ => next_sqrt_price(
            current_sqrt_price,
            liquidity,
            amount_calculated,
            a_to_b,
            specified_input,
        )?,
    };

    let is_max_swap = next_sqrt_price == target_sqrt_price;

    let amount_unfixed = unfixed_delta(
        current_sqrt_price,
        next_sqrt_price,
        liquidity,
        a_to_b,
        specified_input,
    )?;

    let amount_fixed = match initial_fixed_delta {
        Some(delta) if is_max_swap => delta,
        _ => fixed_delta(
            current_sqrt_price,
            next_sqrt_price,
            liquidity,
            a_to_b,
            specified_input,
        )?,
    };

    let (amount_in, mut amount_out) = if specified_input {
        (amount_fixed, amount_unfixed)
    } else {
        (amount_unfixed, amount_fixed)
    };

    // rounding in the stepper may overshoot the requested output by one unit
    if !specified_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if specified_input && !is_max_swap {
        amount_remaining - amount_in
    } else {
        try_reverse_apply_swap_fee(amount_in, fee_rate)? - amount_in
    };

    Ok(SwapStepQuote {
        amount_in,
        amount_out,
        next_sqrt_price,
        fee_amount,
    })
}

// amount of the specified side between two prices, rounded against the swapper
fn fixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> Result<u64, MathError> {
    if a_to_b == specified_input {
        try_get_amount_delta_a(current_sqrt_price, target_sqrt_price, liquidity, specified_input)
    } else {
        try_get_amount_delta_b(current_sqrt_price, target_sqrt_price, liquidity, specified_input)
    }
}

fn unfixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> Result<u64, MathError> {
    if a_to_b == specified_input {
        try_get_amount_delta_b(current_sqrt_price, target_sqrt_price, liquidity, !specified_input)
    } else {
        try_get_amount_delta_a(current_sqrt_price, target_sqrt_price, liquidity, !specified_input)
    }
}

fn next_sqrt_price(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    a_to_b: bool,
    specified_input: bool,
) -> Result<u128, Error> {
    if a_to_b == specified_input {
        try_get_next_sqrt_price_from_a(sqrt_price, liquidity, amount, specified_input)
    } else {
        try_get_next_sqrt_price_from_b(sqrt_price, liquidity, amount, specified_input)
    }
}
