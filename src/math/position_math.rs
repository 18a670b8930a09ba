use crate::error::{Error, StateError};
use crate::math::math_helpers::{mul_div, u256_to_u128};
use crate::math::tick_index::order_tick_indexes;
use crate::math::tick_math::tick_index_to_sqrt_price;
use crate::{Q64, RESOLUTION};
use alloy_primitives::U256;

/// Where the pool price sits relative to a position's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionStatus {
    PriceInRange,
    PriceBelowRange,
    PriceAboveRange,
    /// Both ticks are equal.
    Invalid,
}

/// Share of a position's value held in each token, Q64.64 (the two sum to 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionRatio {
    pub ratio_a: u128,
    pub ratio_b: u128,
}

/// Classifies `sqrt_price` against the range spanned by the two ticks, in either order.
/// A price exactly on the lower bound is below the range and on the upper bound above it.
pub fn position_status(
    sqrt_price: u128,
    tick_index_1: i32,
    tick_index_2: i32,
) -> Result<PositionStatus, StateError> {
    if tick_index_1 == tick_index_2 {
        return Ok(PositionStatus::Invalid);
    }
    let (tick_lower_index, tick_upper_index) = order_tick_indexes(tick_index_1, tick_index_2);
    let sqrt_price_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_price_upper = tick_index_to_sqrt_price(tick_upper_index)?;

    Ok(if sqrt_price <= sqrt_price_lower {
        PositionStatus::PriceBelowRange
    } else if sqrt_price >= sqrt_price_upper {
        PositionStatus::PriceAboveRange
    } else {
        PositionStatus::PriceInRange
    })
}

/// Whether the position currently earns fees.
pub fn is_position_in_range(
    sqrt_price: u128,
    tick_index_1: i32,
    tick_index_2: i32,
) -> Result<bool, StateError> {
    Ok(position_status(sqrt_price, tick_index_1, tick_index_2)? == PositionStatus::PriceInRange)
}

/// Token A / token B value split of a unit-liquidity position at the current price.
pub fn position_ratio_x64(
    sqrt_price: u128,
    tick_index_1: i32,
    tick_index_2: i32,
) -> Result<PositionRatio, Error> {
    let one_x64 = 1u128 << 64;
    match position_status(sqrt_price, tick_index_1, tick_index_2)? {
        PositionStatus::Invalid => Ok(PositionRatio {
            ratio_a: 0,
            ratio_b: 0,
        }),
        PositionStatus::PriceBelowRange => Ok(PositionRatio {
            ratio_a: one_x64,
            ratio_b: 0,
        }),
        PositionStatus::PriceAboveRange => Ok(PositionRatio {
            ratio_a: 0,
            ratio_b: one_x64,
        }),
        PositionStatus::PriceInRange => {
            let (tick_lower_index, tick_upper_index) = order_tick_indexes(tick_index_1, tick_index_2);
            let sqrt_price_lower = tick_index_to_sqrt_price(tick_lower_index)?;
            let sqrt_price_upper = tick_index_to_sqrt_price(tick_upper_index)?;

            let price = U256::from(sqrt_price) * U256::from(sqrt_price);
            let q128 = Q64 << RESOLUTION;

            // value of the A leg in B terms: (1/sqrt_price - 1/sqrt_upper) * price
            let deposit_a_inverse = q128 / U256::from(sqrt_price) - q128 / U256::from(sqrt_price_upper);
            let deposit_a = mul_div(deposit_a_inverse, price, Q64)?;
            let deposit_b = Q64 * U256::from(sqrt_price - sqrt_price_lower);

            let ratio_a = u256_to_u128(mul_div(deposit_a, Q64, deposit_a + deposit_b)?)?;
            Ok(PositionRatio {
                ratio_a,
                ratio_b: one_x64 - ratio_a,
            })
        }
    }
}
