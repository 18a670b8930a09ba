use crate::error::{Error, MathError, RangeError, SwapError};
use crate::math::liquidity_math::add_delta;
use crate::math::tick_index::{check_tick_index, get_full_range_tick_indexes, is_full_range_only};
use crate::pool::amm_pool::Pool;
use crate::pool::fees::{fee_owed_delta, get_fee_growth_inside};
use crate::pool::liquidity_quote::get_token_estimates_from_liquidity;
use crate::pool::tick::{Tick, update_tick};
use alloy_primitives::B256;
use tracing::debug;

pub const POSITION_VERSION: u16 = 1;

/// Liquidity provided over `[tick_lower_index, tick_upper_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub version: u16,
    pub pool: B256,
    pub position_mint: B256,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    /// Fee growth inside the range at the last refresh, Q64.64.
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,
}

/// A position, its pool and both boundary ticks after a liquidity change,
/// with the token amounts moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyLiquidityUpdate {
    pub pool: Pool,
    pub position: Position,
    pub tick_lower: Tick,
    pub tick_upper: Tick,
    /// Deposited on an increase, withdrawn on a decrease.
    pub token_a: u64,
    pub token_b: u64,
}

fn check_position_range(pool: &Pool, tick_lower_index: i32, tick_upper_index: i32) -> Result<(), RangeError> {
    if tick_lower_index >= tick_upper_index {
        return Err(RangeError::InvertedRange {
            lower: tick_lower_index,
            upper: tick_upper_index,
        });
    }
    check_tick_index(tick_lower_index, pool.tick_spacing)?;
    check_tick_index(tick_upper_index, pool.tick_spacing)?;
    if is_full_range_only(pool.tick_spacing)
        && (tick_lower_index, tick_upper_index) != get_full_range_tick_indexes(pool.tick_spacing)
    {
        return Err(RangeError::FullRangeOnly);
    }
    Ok(())
}

/// Opens an empty position on `pool` (identified by `pool_address`).
pub fn open_position(
    pool: &Pool,
    pool_address: B256,
    position_mint: B256,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> Result<Position, Error> {
    check_position_range(pool, tick_lower_index, tick_upper_index)?;
    Ok(Position {
        version: POSITION_VERSION,
        pool: pool_address,
        position_mint,
        tick_lower_index,
        tick_upper_index,
        ..Position::default()
    })
}

impl Position {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.fee_owed_a == 0 && self.fee_owed_b == 0
    }

    /// Moves an empty position to a new range. Owed fees are kept.
    pub fn reset_range(&self, pool: &Pool, tick_lower_index: i32, tick_upper_index: i32) -> Result<Position, Error> {
        if self.liquidity != 0 {
            return Err(RangeError::PositionNotEmpty.into());
        }
        check_position_range(pool, tick_lower_index, tick_upper_index)?;
        Ok(Position {
            tick_lower_index,
            tick_upper_index,
            fee_growth_checkpoint_a: 0,
            fee_growth_checkpoint_b: 0,
            ..*self
        })
    }

    /// Accrues fees earned since the last checkpoint and moves the checkpoint
    /// to `fee_growth_inside_{a,b}`.
    pub fn update_fees(&self, fee_growth_inside_a: u128, fee_growth_inside_b: u128) -> Result<Position, MathError> {
        let owed_a = fee_owed_delta(fee_growth_inside_a, self.fee_growth_checkpoint_a, self.liquidity)?;
        let owed_b = fee_owed_delta(fee_growth_inside_b, self.fee_growth_checkpoint_b, self.liquidity)?;
        Ok(Position {
            fee_growth_checkpoint_a: fee_growth_inside_a,
            fee_growth_checkpoint_b: fee_growth_inside_b,
            fee_owed_a: self.fee_owed_a.checked_add(owed_a).ok_or(MathError::Overflow)?,
            fee_owed_b: self.fee_owed_b.checked_add(owed_b).ok_or(MathError::Overflow)?,
            ..*self
        })
    }

    fn fee_growth_inside(&self, pool: &Pool, tick_lower: &Tick, tick_upper: &Tick) -> (u128, u128) {
        get_fee_growth_inside(
            pool.tick_current_index,
            tick_lower,
            self.tick_lower_index,
            tick_upper,
            self.tick_upper_index,
            pool.fee_growth_global_a,
            pool.fee_growth_global_b,
        )
    }

    /// Refreshes fees, then pays out and zeroes everything owed. Returns the
    /// updated position and `(fee_a, fee_b)`.
    pub fn collect_fees(&self, pool: &Pool, tick_lower: &Tick, tick_upper: &Tick) -> Result<(Position, u64, u64), Error> {
        let mut position = if self.liquidity > 0 {
            let (inside_a, inside_b) = self.fee_growth_inside(pool, tick_lower, tick_upper);
            self.update_fees(inside_a, inside_b)?
        } else {
            *self
        };
        let fee_a = std::mem::take(&mut position.fee_owed_a);
        let fee_b = std::mem::take(&mut position.fee_owed_b);
        debug!(fee_a, fee_b, "position fees collected");
        Ok((position, fee_a, fee_b))
    }
}

/// Applies a signed liquidity change to a position and everything it
/// touches: both boundary ticks, the pool's active liquidity when the range
/// holds the current price, and the position's fee checkpoint.
pub fn modify_liquidity(
    pool: &Pool,
    position: &Position,
    tick_lower: &Tick,
    tick_upper: &Tick,
    liquidity_delta: i128,
) -> Result<ModifyLiquidityUpdate, Error> {
    if liquidity_delta == 0 {
        return Err(RangeError::ZeroLiquidityDelta.into());
    }
    let lower_index = position.tick_lower_index;
    let upper_index = position.tick_upper_index;

    // growth inside is read from the ticks as they were before the change
    let (inside_a, inside_b) = position.fee_growth_inside(pool, tick_lower, tick_upper);
    let mut next_position = position.update_fees(inside_a, inside_b)?;
    next_position.liquidity = add_delta(position.liquidity, liquidity_delta)?;

    let next_lower = update_tick(
        tick_lower,
        lower_index,
        pool.tick_current_index,
        pool.fee_growth_global_a,
        pool.fee_growth_global_b,
        liquidity_delta,
        false,
    )?;
    let next_upper = update_tick(
        tick_upper,
        upper_index,
        pool.tick_current_index,
        pool.fee_growth_global_a,
        pool.fee_growth_global_b,
        liquidity_delta,
        true,
    )?;

    let mut next_pool = *pool;
    if (lower_index..upper_index).contains(&pool.tick_current_index) {
        next_pool.liquidity = add_delta(pool.liquidity, liquidity_delta)?;
    }

    let (token_a, token_b) = get_token_estimates_from_liquidity(
        liquidity_delta.unsigned_abs(),
        pool.sqrt_price,
        lower_index,
        upper_index,
        liquidity_delta > 0,
    )?;

    debug!(
        tick_lower_index = lower_index,
        tick_upper_index = upper_index,
        liquidity_delta,
        token_a,
        token_b,
        "position liquidity modified"
    );

    Ok(ModifyLiquidityUpdate {
        pool: next_pool,
        position: next_position,
        tick_lower: next_lower,
        tick_upper: next_upper,
        token_a,
        token_b,
    })
}

fn check_amount_at_most(actual: u64, threshold: u64) -> Result<(), SwapError> {
    if actual > threshold {
        return Err(SwapError::SlippageExceeded { actual, threshold });
    }
    Ok(())
}

fn check_amount_at_least(actual: u64, threshold: u64) -> Result<(), SwapError> {
    if actual < threshold {
        return Err(SwapError::SlippageExceeded { actual, threshold });
    }
    Ok(())
}

/// Adds `liquidity` to a position, failing if it would cost more than
/// `token_max_a` / `token_max_b`.
pub fn increase_liquidity(
    pool: &Pool,
    position: &Position,
    tick_lower: &Tick,
    tick_upper: &Tick,
    liquidity: u128,
    token_max_a: u64,
    token_max_b: u64,
) -> Result<ModifyLiquidityUpdate, Error> {
    let delta = i128::try_from(liquidity).map_err(|_| MathError::Overflow)?;
    let update = modify_liquidity(pool, position, tick_lower, tick_upper, delta)?;
    check_amount_at_most(update.token_a, token_max_a)?;
    check_amount_at_most(update.token_b, token_max_b)?;
    Ok(update)
}

/// Removes `liquidity` from a position, failing if it would return less
/// than `token_min_a` / `token_min_b`.
pub fn decrease_liquidity(
    pool: &Pool,
    position: &Position,
    tick_lower: &Tick,
    tick_upper: &Tick,
    liquidity: u128,
    token_min_a: u64,
    token_min_b: u64,
) -> Result<ModifyLiquidityUpdate, Error> {
    let delta = i128::try_from(liquidity).map_err(|_| MathError::Overflow)?;
    let update = modify_liquidity(pool, position, tick_lower, tick_upper, -delta)?;
    check_amount_at_least(update.token_a, token_min_a)?;
    check_amount_at_least(update.token_b, token_min_b)?;
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::amm_pool::FeeRates;
    use proptest::prelude::*;

    const POOL: B256 = B256::with_last_byte(9);
    const MINT: B256 = B256::with_last_byte(10);

    fn pool(tick_spacing: u16) -> Pool {
        Pool::new(
            B256::with_last_byte(1),
            B256::with_last_byte(2),
            tick_spacing,
            FeeRates::new(3000),
            1 << 64,
        )
        .unwrap()
    }

    #[test]
    fn open_position_validates_range() {
        let pool = pool(2);
        let position = open_position(&pool, POOL, MINT, -10, 10).unwrap();
        assert_eq!(position.version, POSITION_VERSION);
        assert_eq!(position.liquidity, 0);

        assert!(matches!(
            open_position(&pool, POOL, MINT, 10, -10),
            Err(Error::RangeError(RangeError::InvertedRange { lower: 10, upper: -10 }))
        ));
        assert!(matches!(
            open_position(&pool, POOL, MINT, -9, 10),
            Err(Error::RangeError(RangeError::UnalignedTick { tick: -9, tick_spacing: 2 }))
        ));

        let wide = self::pool(32896);
        let (lower, upper) = get_full_range_tick_indexes(32896);
        assert!(open_position(&wide, POOL, MINT, lower, upper).is_ok());
        assert!(matches!(
            open_position(&wide, POOL, MINT, 0, upper),
            Err(Error::RangeError(RangeError::FullRangeOnly))
        ));
    }

    #[test]
    fn increase_then_decrease_in_range() {
        let pool = pool(2);
        let position = open_position(&pool, POOL, MINT, -10, 10).unwrap();
        let empty = Tick::default();

        let added = increase_liquidity(&pool, &position, &empty, &empty, 1_000_000, 500, 500).unwrap();
        assert_eq!(added.pool.liquidity, 1_000_000);
        assert_eq!(added.position.liquidity, 1_000_000);
        assert_eq!((added.token_a, added.token_b), (500, 500));
        assert!(added.tick_lower.initialized && added.tick_upper.initialized);
        assert_eq!(added.tick_lower.liquidity_net, 1_000_000);
        assert_eq!(added.tick_upper.liquidity_net, -1_000_000);

        let removed = decrease_liquidity(
            &added.pool,
            &added.position,
            &added.tick_lower,
            &added.tick_upper,
            1_000_000,
            499,
            499,
        )
        .unwrap();
        assert_eq!(removed.pool.liquidity, 0);
        assert_eq!(removed.position.liquidity, 0);
        assert_eq!((removed.token_a, removed.token_b), (499, 499));
        assert!(!removed.tick_lower.initialized);
        assert!(!removed.tick_upper.initialized);
    }

    #[test]
    fn slippage_bounds_are_enforced() {
        let pool = pool(2);
        let position = open_position(&pool, POOL, MINT, -10, 10).unwrap();
        let empty = Tick::default();
        assert!(matches!(
            increase_liquidity(&pool, &position, &empty, &empty, 1_000_000, 499, 500),
            Err(Error::SwapError(SwapError::SlippageExceeded { actual: 500, threshold: 499 }))
        ));

        let added = increase_liquidity(&pool, &position, &empty, &empty, 1_000_000, 500, 500).unwrap();
        assert!(matches!(
            decrease_liquidity(&added.pool, &added.position, &added.tick_lower, &added.tick_upper, 1_000_000, 0, 500),
            Err(Error::SwapError(SwapError::SlippageExceeded { actual: 499, threshold: 500 }))
        ));
    }

    #[test]
    fn out_of_range_liquidity_leaves_pool_untouched() {
        let pool = pool(2);
        let position = open_position(&pool, POOL, MINT, 10, 20).unwrap();
        let empty = Tick::default();
        let added = increase_liquidity(&pool, &position, &empty, &empty, 1_000_000, u64::MAX, u64::MAX).unwrap();
        assert_eq!(added.pool.liquidity, 0);
        assert_eq!(added.token_b, 0);
        assert!(added.token_a > 0);
    }

    #[test]
    fn zero_delta_and_overdraw_are_rejected() {
        let pool = pool(2);
        let position = open_position(&pool, POOL, MINT, -10, 10).unwrap();
        let empty = Tick::default();
        assert!(matches!(
            modify_liquidity(&pool, &position, &empty, &empty, 0),
            Err(Error::RangeError(RangeError::ZeroLiquidityDelta))
        ));
        assert!(matches!(
            decrease_liquidity(&pool, &position, &empty, &empty, 1, 0, 0),
            Err(Error::MathError(MathError::Underflow))
        ));
    }

    #[test]
    fn reset_range_requires_no_liquidity() {
        let pool = pool(2);
        let position = open_position(&pool, POOL, MINT, -10, 10).unwrap();
        let moved = position.reset_range(&pool, -20, 20).unwrap();
        assert_eq!((moved.tick_lower_index, moved.tick_upper_index), (-20, 20));

        let funded = Position { liquidity: 1, ..position };
        assert!(matches!(
            funded.reset_range(&pool, -20, 20),
            Err(Error::RangeError(RangeError::PositionNotEmpty))
        ));
    }

    #[test]
    fn fees_accrue_and_collect_once() {
        let mut pool = pool(2);
        let position = open_position(&pool, POOL, MINT, -10, 10).unwrap();
        let empty = Tick::default();
        let added = increase_liquidity(&pool, &position, &empty, &empty, 1_000, u64::MAX, u64::MAX).unwrap();

        pool = added.pool;
        pool.fee_growth_global_a += 3 << 64;
        pool.fee_growth_global_b += 1 << 64;

        let (collected, fee_a, fee_b) = added
            .position
            .collect_fees(&pool, &added.tick_lower, &added.tick_upper)
            .unwrap();
        assert_eq!((fee_a, fee_b), (3_000, 1_000));
        assert_eq!((collected.fee_owed_a, collected.fee_owed_b), (0, 0));

        let (_, again_a, again_b) = collected.collect_fees(&pool, &added.tick_lower, &added.tick_upper).unwrap();
        assert_eq!((again_a, again_b), (0, 0), "fees are paid once");
    }

    proptest! {
        #[test]
        fn prop_liquidity_is_conserved(
            amounts in proptest::collection::vec(1u128..1_000_000_000, 1..6),
            lower in -20i32..0,
            width in 1i32..20,
        ) {
            let pool0 = pool(1);
            let upper = lower + width;
            let mut position = open_position(&pool0, POOL, MINT, lower, upper).unwrap();
            let (mut pool, mut tick_lower, mut tick_upper) = (pool0, Tick::default(), Tick::default());

            for &amount in &amounts {
                let update = increase_liquidity(&pool, &position, &tick_lower, &tick_upper, amount, u64::MAX, u64::MAX).unwrap();
                (pool, position, tick_lower, tick_upper) = (update.pool, update.position, update.tick_lower, update.tick_upper);
            }
            let total: u128 = amounts.iter().sum();
            prop_assert_eq!(position.liquidity, total);
            prop_assert_eq!(tick_lower.liquidity_gross, total);

            for &amount in amounts.iter().rev() {
                let update = decrease_liquidity(&pool, &position, &tick_lower, &tick_upper, amount, 0, 0).unwrap();
                (pool, position, tick_lower, tick_upper) = (update.pool, update.position, update.tick_lower, update.tick_upper);
            }
            prop_assert_eq!(pool.liquidity, pool0.liquidity);
            prop_assert_eq!(position.liquidity, 0);
            prop_assert!(!tick_lower.initialized && !tick_upper.initialized);
        }
    }
}
