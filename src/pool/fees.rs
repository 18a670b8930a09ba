//! Fee accounting: splitting trade fees between the protocol and the two
//! kinds of providers, and tracking per-range fee growth for positions.

use crate::error::{Error, MathError};
use crate::math::math_helpers::{try_mul_div, u256_to_u64};
use crate::math::token_math::{TransferFee, apply_optional_transfer_fee};
use crate::pool::position::Position;
use crate::pool::tick::Tick;
use crate::pool::amm_pool::Pool;
use crate::{BPS_DENOMINATOR, RESOLUTION};
use alloy_primitives::U256;

/// How the fee of one AMM step is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmmFeeSplit {
    pub protocol_fee: u64,
    /// Q64.64 growth added to the global accumulator of the input token.
    pub fee_growth: u128,
}

/// How the fee paid for filling resting orders is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderFeeSplit {
    pub protocol_fee: u64,
    /// Reward credited to order providers, in the swap input token.
    pub olp_fee: u64,
    /// Q64.64 growth added to the global accumulator of the input token.
    pub fee_growth: u128,
}

/// Growth of the fee accumulator when `lp_fee` is shared by `liquidity`.
/// Nothing accrues while no liquidity is active.
#[inline]
pub fn fee_growth_delta(lp_fee: u64, liquidity: u128) -> u128 {
    if liquidity == 0 {
        return 0;
    }
    ((lp_fee as u128) << RESOLUTION) / liquidity
}

#[inline]
fn bps_share(amount: u64, rate: u16) -> Result<u64, MathError> {
    try_mul_div(amount, rate as u128, BPS_DENOMINATOR as u128, false)
}

pub fn split_amm_fee(fee_amount: u64, protocol_fee_rate: u16, liquidity: u128) -> Result<AmmFeeSplit, MathError> {
    let protocol_fee = bps_share(fee_amount, protocol_fee_rate)?;
    Ok(AmmFeeSplit {
        protocol_fee,
        fee_growth: fee_growth_delta(fee_amount - protocol_fee, liquidity),
    })
}

/// Splits an order-fill fee. The protocol takes its share first; order
/// providers get `clp_to_olp_reward_ratio` of the rest and active liquidity
/// the remainder. Without active liquidity everything past the protocol share
/// goes to order providers.
pub fn split_order_fee(
    fee_amount: u64,
    order_protocol_fee_rate: u16,
    clp_to_olp_reward_ratio: u16,
    liquidity: u128,
) -> Result<OrderFeeSplit, MathError> {
    let protocol_fee = bps_share(fee_amount, order_protocol_fee_rate)?;
    let rest = fee_amount - protocol_fee;
    let clp_fee = bps_share(rest, BPS_DENOMINATOR - clp_to_olp_reward_ratio)?;

    if liquidity == 0 {
        return Ok(OrderFeeSplit {
            protocol_fee,
            olp_fee: rest,
            fee_growth: 0,
        });
    }
    Ok(OrderFeeSplit {
        protocol_fee,
        olp_fee: rest - clp_fee,
        fee_growth: fee_growth_delta(clp_fee, liquidity),
    })
}

/// Fee growth accrued inside `[tick_lower_index, tick_upper_index)`.
///
/// An uninitialized lower boundary counts all global growth as below it and
/// an uninitialized upper boundary counts none as above it. Arithmetic wraps:
/// only differences between readings are meaningful.
pub fn get_fee_growth_inside(
    tick_current_index: i32,
    tick_lower: &Tick,
    tick_lower_index: i32,
    tick_upper: &Tick,
    tick_upper_index: i32,
    fee_growth_global_a: u128,
    fee_growth_global_b: u128,
) -> (u128, u128) {
    let (below_a, below_b) = if !tick_lower.initialized {
        (fee_growth_global_a, fee_growth_global_b)
    } else if tick_current_index < tick_lower_index {
        (
            fee_growth_global_a.wrapping_sub(tick_lower.fee_growth_outside_a),
            fee_growth_global_b.wrapping_sub(tick_lower.fee_growth_outside_b),
        )
    } else {
        (tick_lower.fee_growth_outside_a, tick_lower.fee_growth_outside_b)
    };

    let (above_a, above_b) = if !tick_upper.initialized {
        (0, 0)
    } else if tick_current_index < tick_upper_index {
        (tick_upper.fee_growth_outside_a, tick_upper.fee_growth_outside_b)
    } else {
        (
            fee_growth_global_a.wrapping_sub(tick_upper.fee_growth_outside_a),
            fee_growth_global_b.wrapping_sub(tick_upper.fee_growth_outside_b),
        )
    };

    (
        fee_growth_global_a.wrapping_sub(below_a).wrapping_sub(above_a),
        fee_growth_global_b.wrapping_sub(below_b).wrapping_sub(above_b),
    )
}

/// Fees earned by `liquidity` since `checkpoint`: `((inside - checkpoint) * liquidity) >> 64`.
pub fn fee_owed_delta(fee_growth_inside: u128, checkpoint: u128, liquidity: u128) -> Result<u64, MathError> {
    let growth = fee_growth_inside.wrapping_sub(checkpoint);
    let owed = (U256::from(growth) * U256::from(liquidity)) >> RESOLUTION;
    u256_to_u64(owed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectFeesQuote {
    pub fee_owed_a: u64,
    pub fee_owed_b: u64,
}

/// Fees a position could collect right now, net of transfer fees.
pub fn collect_fees_quote(
    pool: &Pool,
    position: &Position,
    tick_lower: &Tick,
    tick_upper: &Tick,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<CollectFeesQuote, Error> {
    let (inside_a, inside_b) = get_fee_growth_inside(
        pool.tick_current_index,
        tick_lower,
        position.tick_lower_index,
        tick_upper,
        position.tick_upper_index,
        pool.fee_growth_global_a,
        pool.fee_growth_global_b,
    );

    let owed_a = position
        .fee_owed_a
        .checked_add(fee_owed_delta(inside_a, position.fee_growth_checkpoint_a, position.liquidity)?)
        .ok_or(MathError::Overflow)?;
    let owed_b = position
        .fee_owed_b
        .checked_add(fee_owed_delta(inside_b, position.fee_growth_checkpoint_b, position.liquidity)?)
        .ok_or(MathError::Overflow)?;

    Ok(CollectFeesQuote {
        fee_owed_a: apply_optional_transfer_fee(owed_a, transfer_fee_a)?,
        fee_owed_b: apply_optional_transfer_fee(owed_b, transfer_fee_b)?,
    })
}
