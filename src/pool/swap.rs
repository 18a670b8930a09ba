use crate::config::{QuoteConfig, TransferFeeMode};
use crate::error::{Error, MathError, SwapError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::{u256_to_u128, unlikely};
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_index::get_tick_array_start_indexes_for_swap;
use crate::math::tick_math::{
    MAX_SQRT_PRICE, MIN_SQRT_PRICE, sqrt_price_to_tick_index, tick_index_to_sqrt_price,
};
use crate::math::token_math::{
    TransferFee, apply_optional_transfer_fee, reverse_optional_transfer_fee,
    try_get_max_amount_with_slippage_tolerance, try_get_min_amount_with_slippage_tolerance,
};
use crate::pool::amm_pool::Pool;
use crate::pool::fees::{split_amm_fee, split_order_fee};
use crate::pool::limit_order::fill_limit_orders;
use crate::pool::tick_array::{TickArray, TickArraySequence};
use crate::BPS_DENOMINATOR;
use alloy_primitives::{B256, U256};
use tracing::{debug, trace};

/// Computes a sqrt-price limit `slippage_tolerance_bps` away from the current
/// price in the swap direction, clamped to the valid range.
///
/// Handy for user-facing APIs: derive `sqrt_price_limit` from a basis-point
/// tolerance instead of a raw Q64.64 value.
pub fn calculate_sqrt_price_limit(sqrt_price: u128, a_to_b: bool, slippage_tolerance_bps: u16) -> u128 {
    let bps = slippage_tolerance_bps.min(BPS_DENOMINATOR) as u64;
    let factor = if a_to_b {
        BPS_DENOMINATOR as u64 - bps
    } else {
        BPS_DENOMINATOR as u64 + bps
    };
    let scaled = U256::from(sqrt_price) * U256::from(factor) / U256::from(BPS_DENOMINATOR);
    u256_to_u128(scaled)
        .unwrap_or(MAX_SQRT_PRICE)
        .clamp(MIN_SQRT_PRICE, MAX_SQRT_PRICE)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Amount of the specified side: input when `amount_specified_is_input`, output otherwise.
    pub amount: u64,
    /// Minimum output for exact input, maximum input for exact output.
    pub other_amount_threshold: u64,
    /// Q64.64 bound on how far the price may move. 0 means the global bound.
    ///
    /// Use [`calculate_sqrt_price_limit`] to derive this from a slippage tolerance.
    pub sqrt_price_limit: u128,
    pub amount_specified_is_input: bool,
    /// Swap direction: `true` sells token A for token B.
    pub a_to_b: bool,
}

impl SwapParams {
    /// Exact-input swap parameters with no price limit.
    #[inline]
    pub fn exact_input(amount: u64, min_amount_out: u64, a_to_b: bool) -> Self {
        Self {
            amount,
            other_amount_threshold: min_amount_out,
            sqrt_price_limit: 0,
            amount_specified_is_input: true,
            a_to_b,
        }
    }

    /// Exact-output swap parameters with no price limit.
    #[inline]
    pub fn exact_output(amount: u64, max_amount_in: u64, a_to_b: bool) -> Self {
        Self {
            amount,
            other_amount_threshold: max_amount_in,
            sqrt_price_limit: 0,
            amount_specified_is_input: false,
            a_to_b,
        }
    }

    #[inline]
    pub fn with_sqrt_price_limit(mut self, sqrt_price_limit: u128) -> Self {
        self.sqrt_price_limit = sqrt_price_limit;
        self
    }
}

/// Pool after a simulated swap, with the token amounts that moved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapResult {
    pub pool: Pool,
    pub token_a: u64,
    pub token_b: u64,
    pub trade_fee: u64,
}

/// Everything a swap changes: the pool, the tick arrays it walked and the
/// amounts settled.
#[derive(Clone, Debug)]
pub struct SwapUpdate {
    pub pool: Pool,
    pub tick_arrays: Vec<TickArray>,
    pub token_a: u64,
    pub token_b: u64,
    pub trade_fee: u64,
}

// the top level state of the swap, written back to the pool at the end
#[derive(Default)]
struct SwapState {
    // the amount remaining to be swapped in/out of the input/output asset
    amount_remaining: u64,
    // the amount already swapped out/in of the output/input asset
    amount_calculated: u64,
    // current sqrt(price)
    sqrt_price: u128,
    // the tick associated with the current price
    tick_current_index: i32,
    // the current liquidity in range
    liquidity: u128,
    fee_growth_global_a: u128,
    fee_growth_global_b: u128,
    // protocol fees charged in the input token
    protocol_fee: u64,
    // order provider rewards charged in the input token
    olp_fee: u64,
    // order input handed out, in the output token
    orders_filled: u64,
    // accumulated swap and fill fees
    trade_fee: u64,
}

impl SwapState {
    fn settle(&mut self, amount_in: u64, amount_out: u64, fee_amount: u64, specified_input: bool) -> Result<(), MathError> {
        let gross_in = amount_in.checked_add(fee_amount).ok_or(MathError::Overflow)?;
        let (consumed, calculated) = if specified_input {
            (gross_in, amount_out)
        } else {
            (amount_out, gross_in)
        };
        self.amount_remaining = self.amount_remaining.checked_sub(consumed).ok_or(MathError::Underflow)?;
        self.amount_calculated = self.amount_calculated.checked_add(calculated).ok_or(MathError::Overflow)?;
        self.trade_fee = self.trade_fee.checked_add(fee_amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    fn accrue(&mut self, a_to_b: bool, protocol_fee: u64, olp_fee: u64, fee_growth: u128) -> Result<(), MathError> {
        self.protocol_fee = self.protocol_fee.checked_add(protocol_fee).ok_or(MathError::Overflow)?;
        self.olp_fee = self.olp_fee.checked_add(olp_fee).ok_or(MathError::Overflow)?;
        if a_to_b {
            self.fee_growth_global_a = self.fee_growth_global_a.wrapping_add(fee_growth);
        } else {
            self.fee_growth_global_b = self.fee_growth_global_b.wrapping_add(fee_growth);
        }
        Ok(())
    }
}

#[derive(Default)]
struct StepComputations {
    // the price at the beginning of the step
    sqrt_price_start: u128,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // whether tick_next is initialized or just the edge of the loaded window
    initialized: bool,
    // sqrt(price) for the next tick
    sqrt_price_next: u128,
    // how much is being swapped in this step
    amount_in: u64,
    // how much is being swapped out
    amount_out: u64,
    // how much fee is being paid in
    fee_amount: u64,
}

/// Simulates a swap against `pool`, walking the ticks of `tick_sequence` and
/// filling the limit orders resting on them. Ticks touched are updated in
/// place; the returned pool carries the new price, liquidity and fee state.
///
/// A tick is only crossed once no order input is left on it. A swap that runs
/// out of amount while orders remain stops at the tick's price without
/// crossing it.
pub fn compute_swap(
    pool: &Pool,
    tick_sequence: &mut TickArraySequence,
    amount: u64,
    sqrt_price_limit: u128,
    a_to_b: bool,
    amount_specified_is_input: bool,
) -> Result<SwapResult, Error> {
    if unlikely(amount == 0) {
        return Err(SwapError::AmountSpecifiedIsZero.into());
    }
    let sqrt_price_limit = match sqrt_price_limit {
        0 if a_to_b => MIN_SQRT_PRICE,
        0 => MAX_SQRT_PRICE,
        limit => limit,
    };
    if unlikely(!Pool::is_sqrt_price_in_bounds(sqrt_price_limit)) {
        return Err(SwapError::SqrtPriceLimitOutOfBounds.into());
    }
    if unlikely(
        (a_to_b && sqrt_price_limit >= pool.sqrt_price) || (!a_to_b && sqrt_price_limit <= pool.sqrt_price),
    ) {
        return Err(SwapError::InvalidSqrtPriceLimitDirection.into());
    }

    let mut state = SwapState {
        amount_remaining: amount,
        sqrt_price: pool.sqrt_price,
        tick_current_index: pool.tick_current_index,
        liquidity: pool.liquidity,
        fee_growth_global_a: pool.fee_growth_global_a,
        fee_growth_global_b: pool.fee_growth_global_b,
        ..SwapState::default()
    };

    while state.amount_remaining > 0 && state.sqrt_price != sqrt_price_limit {
        let mut step = StepComputations {
            sqrt_price_start: state.sqrt_price,
            ..StepComputations::default()
        };

        let (next_tick, tick_next) = if a_to_b {
            tick_sequence.prev_initialized_tick(state.tick_current_index)?
        } else {
            tick_sequence.next_initialized_tick(state.tick_current_index)?
        };
        let next_tick = next_tick.copied();
        step.tick_next = tick_next;
        step.initialized = next_tick.is_some();
        step.sqrt_price_next = tick_index_to_sqrt_price(step.tick_next)?;

        let target_sqrt_price = if a_to_b {
            step.sqrt_price_next.max(sqrt_price_limit)
        } else {
            step.sqrt_price_next.min(sqrt_price_limit)
        };
        let quote = compute_swap_step(
            state.amount_remaining,
            pool.fee_rate,
            state.liquidity,
            state.sqrt_price,
            target_sqrt_price,
            a_to_b,
            amount_specified_is_input,
        )?;
        step.amount_in = quote.amount_in;
        step.amount_out = quote.amount_out;
        step.fee_amount = quote.fee_amount;

        state.settle(step.amount_in, step.amount_out, step.fee_amount, amount_specified_is_input)?;
        let amm_fee = split_amm_fee(step.fee_amount, pool.protocol_fee_rate, state.liquidity)?;
        state.accrue(a_to_b, amm_fee.protocol_fee, 0, amm_fee.fee_growth)?;

        trace!(
            tick_next = step.tick_next,
            amount_in = step.amount_in,
            amount_out = step.amount_out,
            fee_amount = step.fee_amount,
            next_sqrt_price = %quote.next_sqrt_price,
            "swap step"
        );

        if quote.next_sqrt_price == step.sqrt_price_next {
            let fill = fill_limit_orders(
                next_tick.as_ref(),
                step.sqrt_price_next,
                a_to_b,
                amount_specified_is_input,
                state.amount_remaining,
                pool.fee_rate,
            )?;
            // dust below one unit of order input is still consumed, otherwise the loop stalls
            if fill.amount_in > 0 || fill.amount_out > 0 || fill.fee_amount > 0 {
                state.settle(fill.amount_in, fill.amount_out, fill.fee_amount, amount_specified_is_input)?;
                let order_fee = split_order_fee(
                    fill.fee_amount,
                    pool.order_protocol_fee_rate,
                    pool.clp_to_olp_reward_ratio,
                    state.liquidity,
                )?;
                state.accrue(a_to_b, order_fee.protocol_fee, order_fee.olp_fee, order_fee.fee_growth)?;
                state.orders_filled = state
                    .orders_filled
                    .checked_add(fill.amount_out)
                    .ok_or(MathError::Overflow)?;
                tick_sequence.tick_mut(step.tick_next)?.fill_orders(fill.amount_out, !a_to_b)?;
                trace!(
                    tick_index = step.tick_next,
                    amount_in = fill.amount_in,
                    amount_out = fill.amount_out,
                    fee_amount = fill.fee_amount,
                    "limit orders filled"
                );
            }

            let resting_input = if step.initialized {
                tick_sequence.tick(step.tick_next)?.unfilled_orders_input()
            } else {
                0
            };
            if resting_input == 0 {
                if step.initialized {
                    let tick = tick_sequence.tick_mut(step.tick_next)?;
                    let liquidity_net = tick.cross(state.fee_growth_global_a, state.fee_growth_global_b);
                    let liquidity_delta = if a_to_b {
                        liquidity_net.checked_neg().ok_or(MathError::Overflow)?
                    } else {
                        liquidity_net
                    };
                    state.liquidity = add_delta(state.liquidity, liquidity_delta)?;
                    debug!(tick_index = step.tick_next, liquidity = state.liquidity, "tick crossed");
                }
                state.tick_current_index = if a_to_b {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else {
                // price parks on the tick, which stays uncrossed
                state.tick_current_index = if a_to_b {
                    step.tick_next
                } else {
                    step.tick_next - 1
                };
                debug!(tick_index = step.tick_next, resting_input, "swap stopped on resting orders");
            }
        } else if quote.next_sqrt_price != step.sqrt_price_start {
            state.tick_current_index = sqrt_price_to_tick_index(quote.next_sqrt_price)?;
        }
        state.sqrt_price = quote.next_sqrt_price;
    }

    let amount_swapped = amount - state.amount_remaining;
    let (token_a, token_b) = if a_to_b == amount_specified_is_input {
        (amount_swapped, state.amount_calculated)
    } else {
        (state.amount_calculated, amount_swapped)
    };

    let mut next_pool = *pool;
    next_pool.sqrt_price = state.sqrt_price;
    next_pool.tick_current_index = state.tick_current_index;
    next_pool.liquidity = state.liquidity;
    next_pool.fee_growth_global_a = state.fee_growth_global_a;
    next_pool.fee_growth_global_b = state.fee_growth_global_b;
    let (protocol_fee_owed, olp_fee_owed, orders_filled_amount) = if a_to_b {
        (
            &mut next_pool.protocol_fee_owed_a,
            &mut next_pool.olp_fee_owed_a,
            &mut next_pool.orders_filled_amount_b,
        )
    } else {
        (
            &mut next_pool.protocol_fee_owed_b,
            &mut next_pool.olp_fee_owed_b,
            &mut next_pool.orders_filled_amount_a,
        )
    };
    *protocol_fee_owed = protocol_fee_owed.checked_add(state.protocol_fee).ok_or(MathError::Overflow)?;
    *olp_fee_owed = olp_fee_owed.checked_add(state.olp_fee).ok_or(MathError::Overflow)?;
    *orders_filled_amount = orders_filled_amount
        .checked_add(state.orders_filled)
        .ok_or(MathError::Overflow)?;

    debug!(
        a_to_b,
        token_a,
        token_b,
        trade_fee = state.trade_fee,
        tick_current_index = state.tick_current_index,
        "swap computed"
    );

    Ok(SwapResult {
        pool: next_pool,
        token_a,
        token_b,
        trade_fee: state.trade_fee,
    })
}

/// Exact input must yield at least the threshold; exact output must cost at
/// most the threshold.
pub fn check_slippage(
    amount_specified_is_input: bool,
    other_amount: u64,
    other_amount_threshold: u64,
) -> Result<(), SwapError> {
    let violated = if amount_specified_is_input {
        other_amount < other_amount_threshold
    } else {
        other_amount > other_amount_threshold
    };
    if violated {
        return Err(SwapError::SlippageExceeded {
            actual: other_amount,
            threshold: other_amount_threshold,
        });
    }
    Ok(())
}

/// Executes a swap over `tick_arrays` and returns the new pool and arrays.
pub fn swap(pool: &Pool, tick_arrays: &[TickArray], params: SwapParams) -> Result<SwapUpdate, Error> {
    let mut tick_sequence = TickArraySequence::new(tick_arrays.to_vec(), pool.tick_spacing)?;
    let result = compute_swap(
        pool,
        &mut tick_sequence,
        params.amount,
        params.sqrt_price_limit,
        params.a_to_b,
        params.amount_specified_is_input,
    )?;

    // the side that was not specified
    let other_amount = if params.a_to_b == params.amount_specified_is_input {
        result.token_b
    } else {
        result.token_a
    };
    check_slippage(params.amount_specified_is_input, other_amount, params.other_amount_threshold)?;

    Ok(SwapUpdate {
        pool: result.pool,
        tick_arrays: tick_sequence.into_tick_arrays(),
        token_a: result.token_a,
        token_b: result.token_b,
        trade_fee: result.trade_fee,
    })
}

/// Start indexes of the tick arrays a swap from the current price should
/// load, limited by the config's arrays per side.
pub fn swap_tick_array_start_indexes(pool: &Pool, a_to_b: bool, config: &QuoteConfig) -> Vec<i32> {
    get_tick_array_start_indexes_for_swap(
        pool.tick_current_index,
        pool.tick_spacing,
        a_to_b,
        config.tick_arrays_per_side(),
    )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactInSwapQuote {
    pub token_in: u64,
    pub token_est_out: u64,
    pub token_min_out: u64,
    pub trade_fee: u64,
    pub next_sqrt_price: u128,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactOutSwapQuote {
    pub token_out: u64,
    pub token_est_in: u64,
    pub token_max_in: u64,
    pub trade_fee: u64,
    pub next_sqrt_price: u128,
}

#[inline]
fn quoted_transfer_fees(
    config: &QuoteConfig,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> (Option<TransferFee>, Option<TransferFee>) {
    match config.transfer_fee_mode() {
        TransferFeeMode::Apply => (transfer_fee_a, transfer_fee_b),
        TransferFeeMode::Ignore => (None, None),
    }
}

/// Quotes selling `token_in` of token A (`specified_token_a`) or token B.
/// The input is netted of its transfer fee before it reaches the pool and
/// the output netted of its own on the way out.
pub fn swap_quote_by_input_token(
    token_in: u64,
    specified_token_a: bool,
    config: &QuoteConfig,
    pool: &Pool,
    tick_arrays: &[TickArray],
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<ExactInSwapQuote, Error> {
    let (fee_a, fee_b) = quoted_transfer_fees(config, transfer_fee_a, transfer_fee_b);
    let (fee_in, fee_out) = if specified_token_a { (fee_a, fee_b) } else { (fee_b, fee_a) };

    let token_in_after_fee = apply_optional_transfer_fee(token_in, fee_in)?;
    let mut tick_sequence = TickArraySequence::new(tick_arrays.to_vec(), pool.tick_spacing)?;
    let result = compute_swap(pool, &mut tick_sequence, token_in_after_fee, 0, specified_token_a, true)?;

    let (swapped_in, swapped_out) = if specified_token_a {
        (result.token_a, result.token_b)
    } else {
        (result.token_b, result.token_a)
    };
    let token_est_out = apply_optional_transfer_fee(swapped_out, fee_out)?;

    Ok(ExactInSwapQuote {
        token_in: reverse_optional_transfer_fee(swapped_in, fee_in)?,
        token_est_out,
        token_min_out: try_get_min_amount_with_slippage_tolerance(token_est_out, config.slippage_tolerance_bps())?,
        trade_fee: result.trade_fee,
        next_sqrt_price: result.pool.sqrt_price,
    })
}

/// Quotes buying `token_out` of token A (`specified_token_a`) or token B.
pub fn swap_quote_by_output_token(
    token_out: u64,
    specified_token_a: bool,
    config: &QuoteConfig,
    pool: &Pool,
    tick_arrays: &[TickArray],
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> Result<ExactOutSwapQuote, Error> {
    let (fee_a, fee_b) = quoted_transfer_fees(config, transfer_fee_a, transfer_fee_b);
    let (fee_in, fee_out) = if specified_token_a { (fee_b, fee_a) } else { (fee_a, fee_b) };

    let token_out_before_fee = reverse_optional_transfer_fee(token_out, fee_out)?;
    let mut tick_sequence = TickArraySequence::new(tick_arrays.to_vec(), pool.tick_spacing)?;
    let result = compute_swap(
        pool,
        &mut tick_sequence,
        token_out_before_fee,
        0,
        !specified_token_a,
        false,
    )?;

    let (swapped_out, swapped_in) = if specified_token_a {
        (result.token_a, result.token_b)
    } else {
        (result.token_b, result.token_a)
    };
    let token_est_in = reverse_optional_transfer_fee(swapped_in, fee_in)?;

    Ok(ExactOutSwapQuote {
        token_out: apply_optional_transfer_fee(swapped_out, fee_out)?,
        token_est_in,
        token_max_in: try_get_max_amount_with_slippage_tolerance(token_est_in, config.slippage_tolerance_bps())?,
        trade_fee: result.trade_fee,
        next_sqrt_price: result.pool.sqrt_price,
    })
}

/// One pool of a two-hop route.
#[derive(Copy, Clone, Debug)]
pub struct SwapLeg<'a> {
    pub pool: &'a Pool,
    pub tick_arrays: &'a [TickArray],
    pub a_to_b: bool,
}

impl SwapLeg<'_> {
    #[inline]
    fn input_mint(&self) -> B256 {
        if self.a_to_b {
            self.pool.token_mint_a
        } else {
            self.pool.token_mint_b
        }
    }

    #[inline]
    fn output_mint(&self) -> B256 {
        if self.a_to_b {
            self.pool.token_mint_b
        } else {
            self.pool.token_mint_a
        }
    }

    // (fee_a, fee_b) of this leg's pool
    #[inline]
    fn transfer_fees(&self, fee_in: Option<TransferFee>, fee_out: Option<TransferFee>) -> (Option<TransferFee>, Option<TransferFee>) {
        if self.a_to_b { (fee_in, fee_out) } else { (fee_out, fee_in) }
    }
}

/// Transfer fees of the three mints on a two-hop route.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HopTransferFees {
    pub input: Option<TransferFee>,
    pub intermediate: Option<TransferFee>,
    pub output: Option<TransferFee>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoHopExactInSwapQuote {
    pub token_in: u64,
    pub token_est_intermediate: u64,
    pub token_est_out: u64,
    pub token_min_out: u64,
    pub trade_fee_one: u64,
    pub trade_fee_two: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoHopExactOutSwapQuote {
    pub token_out: u64,
    pub token_est_intermediate: u64,
    pub token_est_in: u64,
    pub token_max_in: u64,
    pub trade_fee_one: u64,
    pub trade_fee_two: u64,
}

fn check_route(leg_one: &SwapLeg<'_>, leg_two: &SwapLeg<'_>) -> Result<(), SwapError> {
    if leg_one.output_mint() != leg_two.input_mint() {
        return Err(SwapError::DisconnectedHops);
    }
    Ok(())
}

/// Routes `token_in` through two pools. The intermediate token pays its
/// transfer fee on both transfers; slippage applies to the final output only.
pub fn two_hop_swap_quote_by_input_token(
    token_in: u64,
    config: &QuoteConfig,
    leg_one: SwapLeg<'_>,
    leg_two: SwapLeg<'_>,
    transfer_fees: HopTransferFees,
) -> Result<TwoHopExactInSwapQuote, Error> {
    check_route(&leg_one, &leg_two)?;

    let (fee_a, fee_b) = leg_one.transfer_fees(transfer_fees.input, transfer_fees.intermediate);
    let quote_one = swap_quote_by_input_token(
        token_in,
        leg_one.a_to_b,
        config,
        leg_one.pool,
        leg_one.tick_arrays,
        fee_a,
        fee_b,
    )?;

    let (fee_a, fee_b) = leg_two.transfer_fees(transfer_fees.intermediate, transfer_fees.output);
    let quote_two = swap_quote_by_input_token(
        quote_one.token_est_out,
        leg_two.a_to_b,
        config,
        leg_two.pool,
        leg_two.tick_arrays,
        fee_a,
        fee_b,
    )?;

    Ok(TwoHopExactInSwapQuote {
        token_in: quote_one.token_in,
        token_est_intermediate: quote_one.token_est_out,
        token_est_out: quote_two.token_est_out,
        token_min_out: quote_two.token_min_out,
        trade_fee_one: quote_one.trade_fee,
        trade_fee_two: quote_two.trade_fee,
    })
}

/// Prices `token_out` of the final token through two pools, working
/// backwards from the second hop.
pub fn two_hop_swap_quote_by_output_token(
    token_out: u64,
    config: &QuoteConfig,
    leg_one: SwapLeg<'_>,
    leg_two: SwapLeg<'_>,
    transfer_fees: HopTransferFees,
) -> Result<TwoHopExactOutSwapQuote, Error> {
    check_route(&leg_one, &leg_two)?;

    let (fee_a, fee_b) = leg_two.transfer_fees(transfer_fees.intermediate, transfer_fees.output);
    let quote_two = swap_quote_by_output_token(
        token_out,
        !leg_two.a_to_b,
        config,
        leg_two.pool,
        leg_two.tick_arrays,
        fee_a,
        fee_b,
    )?;

    let (fee_a, fee_b) = leg_one.transfer_fees(transfer_fees.input, transfer_fees.intermediate);
    let quote_one = swap_quote_by_output_token(
        quote_two.token_est_in,
        !leg_one.a_to_b,
        config,
        leg_one.pool,
        leg_one.tick_arrays,
        fee_a,
        fee_b,
    )?;

    Ok(TwoHopExactOutSwapQuote {
        token_out: quote_two.token_out,
        token_est_intermediate: quote_two.token_est_in,
        token_est_in: quote_one.token_est_in,
        token_max_in: quote_one.token_max_in,
        trade_fee_one: quote_one.trade_fee,
        trade_fee_two: quote_two.trade_fee,
    })
}
