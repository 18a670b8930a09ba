//! Decimal-aware conversions between human prices, Q64.64 sqrt prices and
//! tick indexes. Float based, so only meant for display and input parsing.

use crate::error::StateError;
use crate::math::tick_math::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};

const Q64_RESOLUTION: f64 = 18446744073709551616.0;

/// Converts a price of token B per token A into a Q64.64 sqrt price.
pub fn price_to_sqrt_price(price: f64, decimals_a: u8, decimals_b: u8) -> u128 {
    let power = 10f64.powi(decimals_a as i32 - decimals_b as i32);
    ((price / power).sqrt() * Q64_RESOLUTION).floor() as u128
}

pub fn sqrt_price_to_price(sqrt_price: u128, decimals_a: u8, decimals_b: u8) -> f64 {
    let power = 10f64.powi(decimals_a as i32 - decimals_b as i32);
    let sqrt_price = sqrt_price as f64 / Q64_RESOLUTION;
    sqrt_price.powi(2) * power
}

pub fn price_to_tick_index(price: f64, decimals_a: u8, decimals_b: u8) -> Result<i32, StateError> {
    sqrt_price_to_tick_index(price_to_sqrt_price(price, decimals_a, decimals_b))
}

pub fn tick_index_to_price(tick_index: i32, decimals_a: u8, decimals_b: u8) -> Result<f64, StateError> {
    Ok(sqrt_price_to_price(
        tick_index_to_sqrt_price(tick_index)?,
        decimals_a,
        decimals_b,
    ))
}

/// Tick index of the same price quoted the other way round (A per B).
#[inline]
pub fn invert_tick_index(tick_index: i32) -> i32 {
    -tick_index
}

/// Inverts a price through the tick grid, so the result is tick-aligned.
pub fn invert_price(price: f64, decimals_a: u8, decimals_b: u8) -> Result<f64, StateError> {
    let tick_index = price_to_tick_index(price, decimals_a, decimals_b)?;
    tick_index_to_price(invert_tick_index(tick_index), decimals_b, decimals_a)
}

pub fn invert_sqrt_price(sqrt_price: u128) -> Result<u128, StateError> {
    let tick_index = sqrt_price_to_tick_index(sqrt_price)?;
    tick_index_to_sqrt_price(invert_tick_index(tick_index))
}
