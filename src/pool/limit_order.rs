//! Limit orders resting on ticks.
//!
//! An order never holds its own fill state. It remembers the tick `age` at
//! which it joined and resolves against the tick's aggregate counters: the
//! tick age moving on by one means the order's generation is being filled, by
//! two or more that it has been fully filled. Inside a generation fills are
//! shared pro rata by input.

use crate::error::{Error, LimitOrderError, MathError};
use crate::math::limit_order_math::get_limit_order_output_amount;
use crate::math::math_helpers::try_mul_div;
use crate::math::tick_index::check_tick_index;
use crate::math::tick_math::tick_index_to_sqrt_price;
use crate::math::token_math::{TransferFee, apply_optional_transfer_fee, try_reverse_apply_swap_fee};
use crate::pool::amm_pool::Pool;
use crate::pool::tick::Tick;
use crate::pool::tick_array::TickArray;
use crate::{BPS_DENOMINATOR, FEE_RATE_DENOMINATOR};
use alloy_primitives::B256;
use tracing::{debug, warn};

pub const LIMIT_ORDER_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimitOrder {
    pub version: u16,
    pub pool: B256,
    pub limit_order_mint: B256,
    pub tick_index: i32,
    /// Sells token A for token B when set.
    pub a_to_b: bool,
    /// Tick age when the order's input was added.
    pub age: u64,
    /// Input token amount.
    pub amount: u64,
}

/// Where an order stands relative to its tick's fill generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFillStatus {
    Unfilled,
    PartiallyFilled,
    Fulfilled,
}

/// Pool, tick and order after an order changed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOrderUpdate {
    pub pool: Pool,
    pub tick: Tick,
    pub order: LimitOrder,
}

/// What decreasing an order pays out. `amount_out_*` include the rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimitOrderDecreaseQuote {
    pub amount_out_a: u64,
    pub amount_out_b: u64,
    pub reward_a: u64,
    pub reward_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOrderDecrease {
    pub pool: Pool,
    pub tick: Tick,
    pub order: LimitOrder,
    /// Payout before transfer fees.
    pub payout: LimitOrderDecreaseQuote,
}

/// Resting orders matched by a swap at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitOrderFill {
    /// Swap input paid to the orders, fee excluded.
    pub amount_in: u64,
    /// Order input handed to the swapper.
    pub amount_out: u64,
    pub fee_amount: u64,
}

// split of a decrease before it is mapped onto tokens
struct DecreaseSplit {
    status: OrderFillStatus,
    remaining_input: u64,
    output: u64,
    filled: u64,
    reward: u64,
}

/// Rejects orders that would be marketable at the current price. The
/// comparison is on sqrt prices: a price resting exactly on the tick counts
/// as marketable in both directions.
pub fn check_maker_order(pool: &Pool, tick_index: i32, a_to_b: bool) -> Result<(), Error> {
    let sqrt_price = tick_index_to_sqrt_price(tick_index)?;
    let taker = if a_to_b {
        sqrt_price <= pool.sqrt_price
    } else {
        sqrt_price >= pool.sqrt_price
    };
    if taker {
        warn!(tick_index, a_to_b, pool_sqrt_price = %pool.sqrt_price, "taker limit order rejected");
        return Err(LimitOrderError::TakerOrder(tick_index).into());
    }
    Ok(())
}

/// Opens an empty order at `tick_index`.
pub fn open_limit_order(
    pool: &Pool,
    pool_address: B256,
    limit_order_mint: B256,
    tick_index: i32,
    a_to_b: bool,
) -> Result<LimitOrder, Error> {
    check_tick_index(tick_index, pool.tick_spacing)?;
    check_maker_order(pool, tick_index, a_to_b)?;
    Ok(LimitOrder {
        version: LIMIT_ORDER_VERSION,
        pool: pool_address,
        limit_order_mint,
        tick_index,
        a_to_b,
        age: 0,
        amount: 0,
    })
}

/// Only an empty order may be closed.
pub fn close_limit_order(order: &LimitOrder) -> Result<(), LimitOrderError> {
    if order.amount != 0 {
        return Err(LimitOrderError::NotEmpty);
    }
    Ok(())
}

impl LimitOrder {
    /// Input token of the order.
    #[inline]
    pub fn input_is_a(&self) -> bool {
        self.a_to_b
    }

    /// The order's tick inside `tick_array`.
    pub fn tick_in<'a>(&self, tick_array: &'a TickArray, tick_spacing: u16) -> Result<&'a Tick, LimitOrderError> {
        if tick_array.pool != self.pool {
            return Err(LimitOrderError::TickMismatch);
        }
        tick_array
            .tick(self.tick_index, tick_spacing)
            .map_err(|_| LimitOrderError::TickMismatch)
    }

    /// Resolves the order's age against its tick.
    pub fn fill_status(&self, tick: &Tick) -> Result<OrderFillStatus, LimitOrderError> {
        if self.age == tick.age {
            return Ok(OrderFillStatus::Unfilled);
        }
        if self.age.checked_add(1) == Some(tick.age) {
            if tick.part_filled_orders_input == 0 {
                return Err(LimitOrderError::OutOfSync);
            }
            return Ok(OrderFillStatus::PartiallyFilled);
        }
        match self.age.checked_add(2) {
            Some(age) if age <= tick.age => Ok(OrderFillStatus::Fulfilled),
            _ => Err(LimitOrderError::OutOfSync),
        }
    }
}

/// Adds `amount` of input to an unfilled order. The taker rule is checked
/// again since the price may have moved since the order was opened.
pub fn increase_limit_order(
    pool: &Pool,
    order: &LimitOrder,
    tick: &Tick,
    amount: u64,
) -> Result<LimitOrderUpdate, Error> {
    if amount == 0 {
        return Err(LimitOrderError::ZeroAmount.into());
    }
    check_maker_order(pool, order.tick_index, order.a_to_b)?;
    if order.amount > 0 && order.fill_status(tick)? != OrderFillStatus::Unfilled {
        return Err(LimitOrderError::AlreadyFilled.into());
    }

    let mut next_tick = *tick;
    next_tick.initialize(
        order.tick_index,
        pool.tick_current_index,
        pool.fee_growth_global_a,
        pool.fee_growth_global_b,
    );
    next_tick.open_orders_input = tick.open_orders_input.checked_add(amount).ok_or(MathError::Overflow)?;

    let mut next_pool = *pool;
    let total = if order.a_to_b {
        &mut next_pool.orders_total_amount_a
    } else {
        &mut next_pool.orders_total_amount_b
    };
    *total = total.checked_add(amount).ok_or(MathError::Overflow)?;

    let next_order = LimitOrder {
        age: next_tick.age,
        amount: order.amount.checked_add(amount).ok_or(MathError::Overflow)?,
        ..*order
    };
    debug!(tick_index = order.tick_index, a_to_b = order.a_to_b, amount, "limit order increased");

    Ok(LimitOrderUpdate {
        pool: next_pool,
        tick: next_tick,
        order: next_order,
    })
}

fn split_decrease(pool: &Pool, order: &LimitOrder, tick: &Tick, amount: u64) -> Result<DecreaseSplit, Error> {
    if amount > order.amount {
        return Err(LimitOrderError::AmountExceedsOrder.into());
    }
    let status = order.fill_status(tick)?;
    let (remaining_input, output) = match status {
        OrderFillStatus::Unfilled => (amount, 0),
        OrderFillStatus::PartiallyFilled => {
            let sqrt_price = tick_index_to_sqrt_price(order.tick_index)?;
            let remaining_input = try_mul_div(
                amount,
                tick.part_filled_orders_remaining_input as u128,
                tick.part_filled_orders_input as u128,
                false,
            )?;
            let output = get_limit_order_output_amount(amount - remaining_input, order.a_to_b, sqrt_price, false)?;
            (remaining_input, output)
        }
        OrderFillStatus::Fulfilled => {
            let sqrt_price = tick_index_to_sqrt_price(order.tick_index)?;
            (0, get_limit_order_output_amount(amount, order.a_to_b, sqrt_price, false)?)
        }
    };

    let filled = amount - remaining_input;
    let (olp_fee_owed, orders_filled_amount) = if order.a_to_b {
        (pool.olp_fee_owed_b, pool.orders_filled_amount_a)
    } else {
        (pool.olp_fee_owed_a, pool.orders_filled_amount_b)
    };
    let reward = if filled > 0 {
        if orders_filled_amount == 0 {
            return Err(LimitOrderError::OutOfSync.into());
        }
        try_mul_div(olp_fee_owed, filled as u128, orders_filled_amount as u128, false)?
    } else {
        0
    };

    Ok(DecreaseSplit {
        status,
        remaining_input,
        output,
        filled,
        reward,
    })
}

fn payout(order: &LimitOrder, split: &DecreaseSplit) -> Result<LimitOrderDecreaseQuote, MathError> {
    let output = split.output.checked_add(split.reward).ok_or(MathError::Overflow)?;
    Ok(if order.a_to_b {
        LimitOrderDecreaseQuote {
            amount_out_a: split.remaining_input,
            amount_out_b: output,
            reward_a: 0,
            reward_b: split.reward,
        }
    } else {
        LimitOrderDecreaseQuote {
            amount_out_a: output,
            amount_out_b: split.remaining_input,
            reward_a: split.reward,
            reward_b: 0,
        }
    })
}

/// Tokens returned for withdrawing `amount` of an order's input: whatever
/// input is still unfilled, the filled part converted at the tick price and
/// the order's share of provider rewards, net of transfer fees.
pub fn decrease_limit_order_quote(
    pool: &Pool,
    order: &LimitOrder,
    tick: &Tick,
    amount: u64,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<LimitOrderDecreaseQuote, Error> {
    let split = split_decrease(pool, order, tick, amount)?;
    let quote = payout(order, &split)?;
    Ok(LimitOrderDecreaseQuote {
        amount_out_a: apply_optional_transfer_fee(quote.amount_out_a, transfer_fee_a)?,
        amount_out_b: apply_optional_transfer_fee(quote.amount_out_b, transfer_fee_b)?,
        ..quote
    })
}

/// Withdraws `amount` of an order's input and books it out of the tick and
/// the pool aggregates. The tick is uninitialized once nothing references it.
pub fn decrease_limit_order(
    pool: &Pool,
    order: &LimitOrder,
    tick: &Tick,
    amount: u64,
) -> Result<LimitOrderDecrease, Error> {
    let split = split_decrease(pool, order, tick, amount)?;
    let out_of_sync = || LimitOrderError::OutOfSync;

    let mut next_tick = *tick;
    match split.status {
        OrderFillStatus::Unfilled => {
            next_tick.open_orders_input = tick.open_orders_input.checked_sub(amount).ok_or_else(out_of_sync)?;
            // open input is always of the same direction as a generation still parked on the tick
            next_tick.retire_exhausted_generation(order.a_to_b)?;
        }
        OrderFillStatus::PartiallyFilled => {
            next_tick.part_filled_orders_input =
                tick.part_filled_orders_input.checked_sub(amount).ok_or_else(out_of_sync)?;
            next_tick.part_filled_orders_remaining_input = tick
                .part_filled_orders_remaining_input
                .checked_sub(split.remaining_input)
                .ok_or_else(out_of_sync)?;
        }
        OrderFillStatus::Fulfilled => {
            let fulfilled = if order.a_to_b {
                &mut next_tick.fulfilled_a_to_b_orders_input
            } else {
                &mut next_tick.fulfilled_b_to_a_orders_input
            };
            *fulfilled = fulfilled.checked_sub(amount).ok_or_else(out_of_sync)?;
        }
    }

    let mut next_pool = *pool;
    let (total, filled, olp_fee_owed) = if order.a_to_b {
        (
            &mut next_pool.orders_total_amount_a,
            &mut next_pool.orders_filled_amount_a,
            &mut next_pool.olp_fee_owed_b,
        )
    } else {
        (
            &mut next_pool.orders_total_amount_b,
            &mut next_pool.orders_filled_amount_b,
            &mut next_pool.olp_fee_owed_a,
        )
    };
    *total = total.checked_sub(amount).ok_or_else(out_of_sync)?;
    *filled = filled.checked_sub(split.filled).ok_or_else(out_of_sync)?;
    *olp_fee_owed = olp_fee_owed.checked_sub(split.reward).ok_or_else(out_of_sync)?;

    next_tick.try_uninitialize(order.tick_index);

    let next_order = LimitOrder {
        amount: order.amount - amount,
        ..*order
    };
    debug!(
        tick_index = order.tick_index,
        a_to_b = order.a_to_b,
        amount,
        status = ?split.status,
        "limit order decreased"
    );

    Ok(LimitOrderDecrease {
        pool: next_pool,
        tick: next_tick,
        order: next_order,
        payout: payout(order, &split)?,
    })
}

#[inline]
fn bps_rest(amount: u64, rate: u16) -> Result<u64, MathError> {
    try_mul_div(amount, (BPS_DENOMINATOR - rate) as u128, BPS_DENOMINATOR as u128, false)
}

/// Expected output of an order of `amount_in` at `tick_index` once fully
/// filled, including its share of the fill fee.
pub fn limit_order_quote_by_input_token(
    amount_in: u64,
    a_to_b_order: bool,
    tick_index: i32,
    pool: &Pool,
) -> Result<u64, Error> {
    let sqrt_price = tick_index_to_sqrt_price(tick_index)?;
    let amount_out = get_limit_order_output_amount(amount_in, a_to_b_order, sqrt_price, false)?;

    let mut swap_fee = try_reverse_apply_swap_fee(amount_out, pool.fee_rate)? - amount_out;
    swap_fee -= try_mul_div(
        swap_fee,
        pool.order_protocol_fee_rate as u128,
        BPS_DENOMINATOR as u128,
        false,
    )?;
    let reward = swap_fee - bps_rest(swap_fee, pool.clp_to_olp_reward_ratio)?;

    Ok(amount_out.checked_add(reward).ok_or(MathError::AmountExceedsMaxU64)?)
}

/// Order input needed at `tick_index` to receive about `amount_out`, reward
/// included. Inverse of [`limit_order_quote_by_input_token`] up to rounding.
pub fn limit_order_quote_by_output_token(
    amount_out: u64,
    a_to_b_order: bool,
    tick_index: i32,
    pool: &Pool,
) -> Result<u64, Error> {
    let sqrt_price = tick_index_to_sqrt_price(tick_index)?;

    let fee = pool.fee_rate as f64 / FEE_RATE_DENOMINATOR as f64;
    let protocol = pool.order_protocol_fee_rate as f64 / BPS_DENOMINATOR as f64;
    let reward_ratio = pool.clp_to_olp_reward_ratio as f64 / BPS_DENOMINATOR as f64;

    let denominator = 1.0 + fee / (1.0 - fee) * (1.0 - protocol) * reward_ratio;
    let amount_before_reward = amount_out as f64 / denominator;
    if !(0.0..=u64::MAX as f64).contains(&amount_before_reward) {
        return Err(MathError::AmountExceedsMaxU64.into());
    }

    Ok(get_limit_order_output_amount(
        amount_before_reward as u64,
        !a_to_b_order,
        sqrt_price,
        true,
    )?)
}

/// Matches a swap against the orders resting on `tick` at its sqrt price.
/// `a_to_b` is the swap direction, so the orders filled run the other way.
///
/// Exact input pays for all resting input plus fee when it can, otherwise
/// takes the fee off what remains and receives a proportional share. Exact
/// output takes up to `amount_remaining` of order input.
pub fn fill_limit_orders(
    tick: Option<&Tick>,
    sqrt_price: u128,
    a_to_b: bool,
    amount_specified_is_input: bool,
    amount_remaining: u64,
    fee_rate: u16,
) -> Result<LimitOrderFill, MathError> {
    let Some(tick) = tick else {
        return Ok(LimitOrderFill::default());
    };
    let resting_input = tick.unfilled_orders_input();
    if resting_input == 0 {
        return Ok(LimitOrderFill::default());
    }
    let fee_denominator = (FEE_RATE_DENOMINATOR - fee_rate as u32) as u128;

    if amount_specified_is_input {
        let full_in = get_limit_order_output_amount(resting_input, !a_to_b, sqrt_price, true)?;
        let full_fee = try_mul_div(full_in, fee_rate as u128, fee_denominator, true)?;

        if (amount_remaining as u128) < full_in as u128 + full_fee as u128 {
            let fee_amount = try_mul_div(amount_remaining, fee_rate as u128, FEE_RATE_DENOMINATOR as u128, true)?;
            let amount_in = amount_remaining - fee_amount;
            let amount_out = try_mul_div(resting_input, amount_in as u128, full_in as u128, false)?;
            return Ok(LimitOrderFill {
                amount_in,
                amount_out,
                fee_amount,
            });
        }
        Ok(LimitOrderFill {
            amount_in: full_in,
            amount_out: resting_input,
            fee_amount: full_fee,
        })
    } else {
        let amount_out = resting_input.min(amount_remaining);
        let amount_in = get_limit_order_output_amount(amount_out, !a_to_b, sqrt_price, true)?;
        Ok(LimitOrderFill {
            amount_in,
            amount_out,
            fee_amount: try_mul_div(amount_in, fee_rate as u128, fee_denominator, true)?,
        })
    }
}
