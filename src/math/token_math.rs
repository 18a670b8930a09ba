//! Token amount math over Q64.64 sqrt prices: liquidity deltas, next-price
//! primitives used by the swap stepper, and the fee/slippage adjustments
//! applied by quotes.

use crate::error::{Error, MathError, QuoteError, StateError};
use crate::math::math_helpers::{
    div_rounding_up, mul_div, mul_div_rounding_up, try_mul_div, u256_to_u64, u256_to_u128, unlikely,
};
use crate::math::tick_math::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use crate::{BPS_DENOMINATOR, FEE_RATE_DENOMINATOR, Q64, RESOLUTION};
use alloy_primitives::U256;

/// Transfer fee configured on a mint, in basis points, capped at `max_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFee {
    pub fee_bps: u16,
    pub max_fee: u64,
}

impl TransferFee {
    pub fn new(fee_bps: u16) -> Self {
        Self {
            fee_bps,
            max_fee: u64::MAX,
        }
    }

    pub fn new_with_max(fee_bps: u16, max_fee: u64) -> Self {
        Self { fee_bps, max_fee }
    }
}

#[inline]
fn order_prices(sqrt_price_1: u128, sqrt_price_2: u128) -> (u128, u128) {
    if sqrt_price_1 > sqrt_price_2 {
        (sqrt_price_2, sqrt_price_1)
    } else {
        (sqrt_price_1, sqrt_price_2)
    }
}

#[inline]
fn check_sqrt_price_bounds(sqrt_price: u128) -> Result<u128, StateError> {
    if (MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        Ok(sqrt_price)
    } else {
        Err(StateError::SqrtPriceOutOfBounds)
    }
}

/// Amount of token A held by `liquidity` between two sqrt prices:
/// `liquidity * (upper - lower) * 2^64 / (lower * upper)`.
pub fn try_get_amount_delta_a(
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, MathError> {
    let (lower, upper) = order_prices(sqrt_price_1, sqrt_price_2);
    if liquidity == 0 || lower == upper {
        return Ok(0);
    }
    if unlikely(lower == 0) {
        return Err(MathError::DivisionByZero);
    }

    let numerator = U256::from(liquidity) * U256::from(upper - lower);
    let denominator = U256::from(lower) * U256::from(upper);

    let amount = if round_up {
        mul_div_rounding_up(numerator, Q64, denominator)?
    } else {
        mul_div(numerator, Q64, denominator)?
    };
    u256_to_u64(amount)
}

/// Amount of token B held by `liquidity` between two sqrt prices:
/// `liquidity * (upper - lower) / 2^64`.
pub fn try_get_amount_delta_b(
    sqrt_price_1: u128,
    sqrt_price_2: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, MathError> {
    let (lower, upper) = order_prices(sqrt_price_1, sqrt_price_2);
    let product = U256::from(liquidity) * U256::from(upper - lower);

    let mut amount = product >> RESOLUTION;
    if round_up && !(product & U256::from(u64::MAX)).is_zero() {
        amount += U256::ONE;
    }
    u256_to_u64(amount)
}

/// Sqrt price reached after `amount` of token A enters (`specified_input`)
/// or leaves the pool. Always rounds up, away from the side that would
/// favour the swapper.
pub fn try_get_next_sqrt_price_from_a(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    specified_input: bool,
) -> Result<u128, Error> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    let liquidity_shifted = U256::from(liquidity) << RESOLUTION;
    let product = U256::from(sqrt_price) * U256::from(amount);

    let denominator = if specified_input {
        liquidity_shifted + product
    } else {
        if product >= liquidity_shifted {
            return Err(StateError::InsufficientReserves.into());
        }
        liquidity_shifted - product
    };

    let next = mul_div_rounding_up(liquidity_shifted, U256::from(sqrt_price), denominator)?;
    Ok(check_sqrt_price_bounds(u256_to_u128(next)?)?)
}

/// Sqrt price reached after `amount` of token B enters (`specified_input`)
/// or leaves the pool. Rounds down on input and up on output.
pub fn try_get_next_sqrt_price_from_b(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    specified_input: bool,
) -> Result<u128, Error> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    if liquidity == 0 {
        return Err(MathError::DivisionByZero.into());
    }

    let amount_shifted = U256::from(amount) << RESOLUTION;
    let liquidity = U256::from(liquidity);

    let next = if specified_input {
        let delta = u256_to_u128(amount_shifted / liquidity)?;
        sqrt_price.checked_add(delta).ok_or(MathError::Overflow)?
    } else {
        let delta = u256_to_u128(div_rounding_up(amount_shifted, liquidity)?)?;
        sqrt_price
            .checked_sub(delta)
            .ok_or(StateError::InsufficientReserves)?
    };
    Ok(check_sqrt_price_bounds(next)?)
}

// ----- fees -----

/// Deducts the swap fee from a gross input: `amount - ceil(amount * fee_rate / 1e6)`.
pub fn try_apply_swap_fee(amount: u64, fee_rate: u16) -> Result<u64, MathError> {
    let fee = try_mul_div(amount, fee_rate as u128, FEE_RATE_DENOMINATOR as u128, true)?;
    amount.checked_sub(fee).ok_or(MathError::Underflow)
}

/// Gross input that nets `amount` after the swap fee: `ceil(amount * 1e6 / (1e6 - fee_rate))`.
pub fn try_reverse_apply_swap_fee(amount: u64, fee_rate: u16) -> Result<u64, MathError> {
    try_mul_div(
        amount,
        FEE_RATE_DENOMINATOR as u128,
        (FEE_RATE_DENOMINATOR - fee_rate as u32) as u128,
        true,
    )
}

/// Amount received after a transfer fee is withheld.
pub fn try_apply_transfer_fee(amount: u64, transfer_fee: TransferFee) -> Result<u64, Error> {
    if transfer_fee.fee_bps > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidTransferFee(transfer_fee.fee_bps).into());
    }
    if transfer_fee.fee_bps == 0 || amount == 0 {
        return Ok(amount);
    }

    let fee = try_mul_div(
        amount,
        transfer_fee.fee_bps as u128,
        BPS_DENOMINATOR as u128,
        true,
    )?
    .min(transfer_fee.max_fee);
    Ok(amount.checked_sub(fee).ok_or(MathError::Underflow)?)
}

/// Amount that must be sent so that `amount` arrives after the transfer fee.
pub fn try_reverse_apply_transfer_fee(amount: u64, transfer_fee: TransferFee) -> Result<u64, Error> {
    if transfer_fee.fee_bps > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidTransferFee(transfer_fee.fee_bps).into());
    }
    if transfer_fee.fee_bps == 0 || amount == 0 {
        return Ok(amount);
    }

    let capped = || {
        amount
            .checked_add(transfer_fee.max_fee)
            .ok_or(MathError::AmountExceedsMaxU64)
    };
    if transfer_fee.fee_bps == BPS_DENOMINATOR {
        return Ok(capped()?);
    }

    let gross = try_mul_div(
        amount,
        BPS_DENOMINATOR as u128,
        (BPS_DENOMINATOR - transfer_fee.fee_bps) as u128,
        true,
    )?;
    if gross - amount >= transfer_fee.max_fee {
        return Ok(capped()?);
    }
    Ok(gross)
}

#[inline]
fn adjust_transfer_fee(
    amount: u64,
    transfer_fee: Option<TransferFee>,
    reverse: bool,
) -> Result<u64, Error> {
    match transfer_fee {
        Some(fee) if reverse => try_reverse_apply_transfer_fee(amount, fee),
        Some(fee) => try_apply_transfer_fee(amount, fee),
        None => Ok(amount),
    }
}

/// Nets an optional transfer fee off an amount; `None` leaves it unchanged.
pub fn apply_optional_transfer_fee(amount: u64, transfer_fee: Option<TransferFee>) -> Result<u64, Error> {
    adjust_transfer_fee(amount, transfer_fee, false)
}

/// Grosses an amount up by an optional transfer fee; `None` leaves it unchanged.
pub fn reverse_optional_transfer_fee(
    amount: u64,
    transfer_fee: Option<TransferFee>,
) -> Result<u64, Error> {
    adjust_transfer_fee(amount, transfer_fee, true)
}

// ----- slippage -----

pub fn try_get_max_amount_with_slippage_tolerance(
    amount: u64,
    slippage_tolerance_bps: u16,
) -> Result<u64, Error> {
    if slippage_tolerance_bps > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidSlippageTolerance(slippage_tolerance_bps).into());
    }
    Ok(try_mul_div(
        amount,
        (BPS_DENOMINATOR as u128) + slippage_tolerance_bps as u128,
        BPS_DENOMINATOR as u128,
        true,
    )?)
}

pub fn try_get_min_amount_with_slippage_tolerance(
    amount: u64,
    slippage_tolerance_bps: u16,
) -> Result<u64, Error> {
    if slippage_tolerance_bps > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidSlippageTolerance(slippage_tolerance_bps).into());
    }
    Ok(try_mul_div(
        amount,
        (BPS_DENOMINATOR - slippage_tolerance_bps) as u128,
        BPS_DENOMINATOR as u128,
        false,
    )?)
}
