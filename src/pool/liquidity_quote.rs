//! Liquidity quotes: converting between a liquidity amount and the token
//! amounts it represents over a range, with slippage bounds and transfer fees.

use crate::error::{Error, QuoteError, RangeError};
use crate::math::liquidity_math::{liquidity_from_a, liquidity_from_b};
use crate::math::position_math::{PositionStatus, position_status};
use crate::math::tick_math::tick_index_to_sqrt_price;
use crate::math::token_math::{
    TransferFee, apply_optional_transfer_fee, reverse_optional_transfer_fee,
    try_get_amount_delta_a, try_get_amount_delta_b, try_get_max_amount_with_slippage_tolerance,
    try_get_min_amount_with_slippage_tolerance,
};
use crate::BPS_DENOMINATOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncreaseLiquidityQuote {
    pub liquidity_delta: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_max_a: u64,
    pub token_max_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecreaseLiquidityQuote {
    pub liquidity_delta: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_min_a: u64,
    pub token_min_b: u64,
}

fn check_range(tick_lower_index: i32, tick_upper_index: i32) -> Result<(), RangeError> {
    if tick_lower_index >= tick_upper_index {
        return Err(RangeError::InvertedRange {
            lower: tick_lower_index,
            upper: tick_upper_index,
        });
    }
    Ok(())
}

fn check_slippage_tolerance(slippage_tolerance_bps: u16) -> Result<(), QuoteError> {
    if slippage_tolerance_bps > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidSlippageTolerance(slippage_tolerance_bps));
    }
    Ok(())
}

/// Token amounts held by `liquidity` over `[tick_lower_index, tick_upper_index)`
/// at `sqrt_price`, before any transfer fee.
pub fn get_token_estimates_from_liquidity(
    liquidity: u128,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    round_up: bool,
) -> Result<(u64, u64), Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    if liquidity == 0 {
        return Ok((0, 0));
    }
    let sqrt_price_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_price_upper = tick_index_to_sqrt_price(tick_upper_index)?;

    let estimates = match position_status(sqrt_price, tick_lower_index, tick_upper_index)? {
        PositionStatus::PriceBelowRange => (
            try_get_amount_delta_a(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?,
            0,
        ),
        PositionStatus::PriceAboveRange => (
            0,
            try_get_amount_delta_b(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?,
        ),
        PositionStatus::PriceInRange => (
            try_get_amount_delta_a(sqrt_price, sqrt_price_upper, liquidity, round_up)?,
            try_get_amount_delta_b(sqrt_price_lower, sqrt_price, liquidity, round_up)?,
        ),
        PositionStatus::Invalid => (0, 0),
    };
    Ok(estimates)
}

/// Liquidity `amount` of token A supports over the part of the range above
/// the current price. Zero once the price is at or above the range.
fn liquidity_for_a(
    amount: u64,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> Result<u128, Error> {
    let sqrt_price_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_price_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    let liquidity = match position_status(sqrt_price, tick_lower_index, tick_upper_index)? {
        PositionStatus::PriceBelowRange => liquidity_from_a(amount, sqrt_price_lower, sqrt_price_upper)?,
        PositionStatus::PriceInRange => liquidity_from_a(amount, sqrt_price, sqrt_price_upper)?,
        PositionStatus::PriceAboveRange | PositionStatus::Invalid => 0,
    };
    Ok(liquidity)
}

/// Liquidity `amount` of token B supports over the part of the range below
/// the current price. Zero while the price is at or below the range.
fn liquidity_for_b(
    amount: u64,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> Result<u128, Error> {
    let sqrt_price_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_price_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    let liquidity = match position_status(sqrt_price, tick_lower_index, tick_upper_index)? {
        PositionStatus::PriceAboveRange => liquidity_from_b(amount, sqrt_price_lower, sqrt_price_upper)?,
        PositionStatus::PriceInRange => liquidity_from_b(amount, sqrt_price_lower, sqrt_price)?,
        PositionStatus::PriceBelowRange | PositionStatus::Invalid => 0,
    };
    Ok(liquidity)
}

/// Quote for adding `liquidity_delta` to a position. Estimates round up and
/// every amount is grossed up by the mint's transfer fee.
pub fn increase_liquidity_quote(
    liquidity_delta: u128,
    slippage_tolerance_bps: u16,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<IncreaseLiquidityQuote, Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    check_slippage_tolerance(slippage_tolerance_bps)?;
    if liquidity_delta == 0 {
        return Ok(IncreaseLiquidityQuote::default());
    }

    let (est_a, est_b) =
        get_token_estimates_from_liquidity(liquidity_delta, sqrt_price, tick_lower_index, tick_upper_index, true)?;
    let max_a = try_get_max_amount_with_slippage_tolerance(est_a, slippage_tolerance_bps)?;
    let max_b = try_get_max_amount_with_slippage_tolerance(est_b, slippage_tolerance_bps)?;

    Ok(IncreaseLiquidityQuote {
        liquidity_delta,
        token_est_a: reverse_optional_transfer_fee(est_a, transfer_fee_a)?,
        token_est_b: reverse_optional_transfer_fee(est_b, transfer_fee_b)?,
        token_max_a: reverse_optional_transfer_fee(max_a, transfer_fee_a)?,
        token_max_b: reverse_optional_transfer_fee(max_b, transfer_fee_b)?,
    })
}

/// Quote for depositing `token_amount` of token A, transfer fee included.
pub fn increase_liquidity_quote_a(
    token_amount: u64,
    slippage_tolerance_bps: u16,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<IncreaseLiquidityQuote, Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    let token_delta = apply_optional_transfer_fee(token_amount, transfer_fee_a)?;
    let liquidity = liquidity_for_a(token_delta, sqrt_price, tick_lower_index, tick_upper_index)?;
    increase_liquidity_quote(
        liquidity,
        slippage_tolerance_bps,
        sqrt_price,
        tick_lower_index,
        tick_upper_index,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote for depositing `token_amount` of token B, transfer fee included.
pub fn increase_liquidity_quote_b(
    token_amount: u64,
    slippage_tolerance_bps: u16,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<IncreaseLiquidityQuote, Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    let token_delta = apply_optional_transfer_fee(token_amount, transfer_fee_b)?;
    let liquidity = liquidity_for_b(token_delta, sqrt_price, tick_lower_index, tick_upper_index)?;
    increase_liquidity_quote(
        liquidity,
        slippage_tolerance_bps,
        sqrt_price,
        tick_lower_index,
        tick_upper_index,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote for removing `liquidity_delta` from a position. Estimates round down
/// and every amount is netted by the mint's transfer fee.
pub fn decrease_liquidity_quote(
    liquidity_delta: u128,
    slippage_tolerance_bps: u16,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<DecreaseLiquidityQuote, Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    check_slippage_tolerance(slippage_tolerance_bps)?;
    if liquidity_delta == 0 {
        return Ok(DecreaseLiquidityQuote::default());
    }

    let (est_a, est_b) =
        get_token_estimates_from_liquidity(liquidity_delta, sqrt_price, tick_lower_index, tick_upper_index, false)?;
    let min_a = try_get_min_amount_with_slippage_tolerance(est_a, slippage_tolerance_bps)?;
    let min_b = try_get_min_amount_with_slippage_tolerance(est_b, slippage_tolerance_bps)?;

    Ok(DecreaseLiquidityQuote {
        liquidity_delta,
        token_est_a: apply_optional_transfer_fee(est_a, transfer_fee_a)?,
        token_est_b: apply_optional_transfer_fee(est_b, transfer_fee_b)?,
        token_min_a: apply_optional_transfer_fee(min_a, transfer_fee_a)?,
        token_min_b: apply_optional_transfer_fee(min_b, transfer_fee_b)?,
    })
}

/// Quote for withdrawing `token_amount` of token A after transfer fees.
pub fn decrease_liquidity_quote_a(
    token_amount: u64,
    slippage_tolerance_bps: u16,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<DecreaseLiquidityQuote, Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    let token_delta = reverse_optional_transfer_fee(token_amount, transfer_fee_a)?;
    let liquidity = liquidity_for_a(token_delta, sqrt_price, tick_lower_index, tick_upper_index)?;
    decrease_liquidity_quote(
        liquidity,
        slippage_tolerance_bps,
        sqrt_price,
        tick_lower_index,
        tick_upper_index,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote for withdrawing `token_amount` of token B after transfer fees.
pub fn decrease_liquidity_quote_b(
    token_amount: u64,
    slippage_tolerance_bps: u16,
    sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<DecreaseLiquidityQuote, Error> {
    check_range(tick_lower_index, tick_upper_index)?;
    let token_delta = reverse_optional_transfer_fee(token_amount, transfer_fee_b)?;
    let liquidity = liquidity_for_b(token_delta, sqrt_price, tick_lower_index, tick_upper_index)?;
    decrease_liquidity_quote(
        liquidity,
        slippage_tolerance_bps,
        sqrt_price,
        tick_lower_index,
        tick_upper_index,
        transfer_fee_a,
        transfer_fee_b,
    )
}
