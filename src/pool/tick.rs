use crate::error::{Error, LimitOrderError, MathError};
use crate::math::liquidity_math::add_delta;
use tracing::debug;

/// Per-tick liquidity, fee and limit-order state.
///
/// Resting orders are tracked in aggregate only. Input waits in
/// `open_orders_input`; the first fill promotes it into the partially filled
/// generation (`part_filled_orders_input` / `_remaining_input`) and bumps
/// `age`; once that generation is consumed it is moved into the fulfilled
/// counter of its direction and `age` is bumped again. An order joining at age
/// `n` is therefore unfilled while `age == n`, partially filled at `n + 1` and
/// fulfilled from `n + 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick {
    pub initialized: bool,
    /// Liquidity added to the active set when price crosses this tick upwards.
    pub liquidity_net: i128,
    /// Total liquidity of positions using this tick as a boundary.
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub age: u64,
    pub open_orders_input: u64,
    pub part_filled_orders_input: u64,
    pub part_filled_orders_remaining_input: u64,
    pub fulfilled_a_to_b_orders_input: u64,
    pub fulfilled_b_to_a_orders_input: u64,
}

impl Tick {
    /// Whether any limit order still references this tick.
    #[inline]
    pub fn has_orders(&self) -> bool {
        self.open_orders_input != 0
            || self.part_filled_orders_input != 0
            || self.part_filled_orders_remaining_input != 0
            || self.fulfilled_a_to_b_orders_input != 0
            || self.fulfilled_b_to_a_orders_input != 0
    }

    /// A tick may only be cleared when nothing references it: no liquidity and
    /// no order bookkeeping.
    #[inline]
    pub fn can_uninitialize(&self) -> bool {
        self.liquidity_gross == 0 && !self.has_orders()
    }

    /// Order input still waiting to be matched at this tick.
    #[inline]
    pub fn unfilled_orders_input(&self) -> u64 {
        self.open_orders_input
            .saturating_add(self.part_filled_orders_remaining_input)
    }

    /// Marks the tick initialized, snapshotting the outside fee growth: all
    /// growth so far is taken to have happened below the current price.
    pub fn initialize(
        &mut self,
        tick_index: i32,
        tick_current_index: i32,
        fee_growth_global_a: u128,
        fee_growth_global_b: u128,
    ) {
        if self.initialized {
            return;
        }
        if tick_index <= tick_current_index {
            self.fee_growth_outside_a = fee_growth_global_a;
            self.fee_growth_outside_b = fee_growth_global_b;
        } else {
            self.fee_growth_outside_a = 0;
            self.fee_growth_outside_b = 0;
        }
        self.initialized = true;
    }

    /// Clears the tick if the joint predicate holds. `age` survives, so orders
    /// still holding an older age resolve against it correctly.
    pub fn try_uninitialize(&mut self, tick_index: i32) -> bool {
        if !self.initialized || !self.can_uninitialize() {
            return false;
        }
        *self = Tick {
            age: self.age,
            ..Tick::default()
        };
        debug!(tick_index, "tick uninitialized");
        true
    }

    /// Rebases the outside fee growth when price crosses the tick and returns
    /// the liquidity net to apply (negated by the caller for a downward cross).
    pub fn cross(&mut self, fee_growth_global_a: u128, fee_growth_global_b: u128) -> i128 {
        self.fee_growth_outside_a = fee_growth_global_a.wrapping_sub(self.fee_growth_outside_a);
        self.fee_growth_outside_b = fee_growth_global_b.wrapping_sub(self.fee_growth_outside_b);
        self.liquidity_net
    }

    /// Consumes `amount` of resting order input, oldest generation first.
    /// `a_to_b_orders` is the direction of the orders being filled.
    pub fn fill_orders(&mut self, amount: u64, a_to_b_orders: bool) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        if amount > self.unfilled_orders_input() {
            return Err(LimitOrderError::AmountExceedsOrder.into());
        }

        let from_current = amount.min(self.part_filled_orders_remaining_input);
        self.part_filled_orders_remaining_input -= from_current;
        let rest = amount - from_current;

        if rest > 0 {
            self.promote_open_orders(a_to_b_orders)?;
            self.part_filled_orders_remaining_input -= rest;
        }

        self.retire_exhausted_generation(a_to_b_orders)?;
        Ok(())
    }

    /// Moves a fully consumed partially filled generation into the fulfilled
    /// counter of `a_to_b_orders` once no open input waits behind it. Returns
    /// whether a generation was retired.
    ///
    /// Must also run when open input is withdrawn: a generation left behind
    /// would otherwise be booked under the direction of whichever orders are
    /// promoted next.
    pub fn retire_exhausted_generation(&mut self, a_to_b_orders: bool) -> Result<bool, MathError> {
        if self.part_filled_orders_remaining_input != 0
            || self.part_filled_orders_input == 0
            || self.open_orders_input != 0
        {
            return Ok(false);
        }
        self.retire_current_generation(a_to_b_orders)?;
        Ok(true)
    }

    // moves open input into a new partially filled generation
    fn promote_open_orders(&mut self, a_to_b_orders: bool) -> Result<(), MathError> {
        let retired = self.part_filled_orders_input;
        self.add_fulfilled(retired, a_to_b_orders)?;
        self.part_filled_orders_input = self.open_orders_input;
        self.part_filled_orders_remaining_input = self.open_orders_input;
        self.open_orders_input = 0;
        self.age = self.age.checked_add(1).ok_or(MathError::Overflow)?;
        debug!(age = self.age, input = self.part_filled_orders_input, "order generation promoted");
        Ok(())
    }

    fn retire_current_generation(&mut self, a_to_b_orders: bool) -> Result<(), MathError> {
        let retired = std::mem::take(&mut self.part_filled_orders_input);
        self.add_fulfilled(retired, a_to_b_orders)?;
        self.age = self.age.checked_add(1).ok_or(MathError::Overflow)?;
        debug!(age = self.age, input = retired, "order generation fulfilled");
        Ok(())
    }

    fn add_fulfilled(&mut self, amount: u64, a_to_b_orders: bool) -> Result<(), MathError> {
        let counter = if a_to_b_orders {
            &mut self.fulfilled_a_to_b_orders_input
        } else {
            &mut self.fulfilled_b_to_a_orders_input
        };
        *counter = counter.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }
}

/// Applies a position's liquidity change to one of its boundary ticks and
/// returns the updated tick. A zero delta leaves the tick untouched.
pub fn update_tick(
    tick: &Tick,
    tick_index: i32,
    tick_current_index: i32,
    fee_growth_global_a: u128,
    fee_growth_global_b: u128,
    liquidity_delta: i128,
    is_upper_boundary: bool,
) -> Result<Tick, Error> {
    if liquidity_delta == 0 {
        return Ok(*tick);
    }

    let mut next = *tick;
    next.liquidity_gross = add_delta(tick.liquidity_gross, liquidity_delta)?;
    next.liquidity_net = if is_upper_boundary {
        tick.liquidity_net.checked_sub(liquidity_delta)
    } else {
        tick.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(MathError::Overflow)?;

    if next.liquidity_gross > 0 {
        next.initialize(tick_index, tick_current_index, fee_growth_global_a, fee_growth_global_b);
    } else {
        next.try_uninitialize(tick_index);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ----- update_tick -----

    #[test]
    fn update_tick_zero_delta_is_noop() {
        let tick = Tick::default();
        assert_eq!(update_tick(&tick, 10, 0, 5, 5, 0, false).unwrap(), tick);
    }

    #[test]
    fn update_tick_snapshots_growth_on_first_init() {
        let below = update_tick(&Tick::default(), -10, 0, 100, 200, 1_000, false).unwrap();
        assert!(below.initialized);
        assert_eq!((below.fee_growth_outside_a, below.fee_growth_outside_b), (100, 200));
        assert_eq!(below.liquidity_net, 1_000);
        assert_eq!(below.liquidity_gross, 1_000);

        let above = update_tick(&Tick::default(), 10, 0, 100, 200, 1_000, true).unwrap();
        assert_eq!((above.fee_growth_outside_a, above.fee_growth_outside_b), (0, 0));
        assert_eq!(above.liquidity_net, -1_000);

        // a second reference keeps the original snapshot
        let again = update_tick(&below, -10, 0, 999, 999, 500, false).unwrap();
        assert_eq!(again.fee_growth_outside_a, 100);
        assert_eq!(again.liquidity_gross, 1_500);
    }

    #[test]
    fn update_tick_removal_uninitializes_and_keeps_age() {
        let mut tick = update_tick(&Tick::default(), 0, 0, 1, 1, 1_000, false).unwrap();
        tick.age = 4;
        let cleared = update_tick(&tick, 0, 0, 1, 1, -1_000, false).unwrap();
        assert!(!cleared.initialized);
        assert_eq!(cleared.fee_growth_outside_a, 0);
        assert_eq!(cleared.age, 4);
    }

    #[test]
    fn update_tick_keeps_ticks_with_resting_orders() {
        let mut tick = update_tick(&Tick::default(), 0, 0, 1, 1, 1_000, false).unwrap();
        tick.open_orders_input = 10;
        let kept = update_tick(&tick, 0, 0, 1, 1, -1_000, false).unwrap();
        assert!(kept.initialized, "resting orders pin the tick");
        assert_eq!(kept.liquidity_gross, 0);
        assert_eq!(kept.fee_growth_outside_a, 1);
    }

    #[test]
    fn update_tick_checked_arithmetic() {
        assert!(matches!(
            update_tick(&Tick::default(), 0, 0, 0, 0, -1, false),
            Err(Error::MathError(MathError::Underflow))
        ));
        let tick = Tick {
            initialized: true,
            liquidity_net: i128::MIN,
            liquidity_gross: 1,
            ..Tick::default()
        };
        assert!(matches!(
            update_tick(&tick, 0, 0, 0, 0, 1, true),
            Err(Error::MathError(MathError::Overflow))
        ));
    }

    // ----- cross -----

    #[test]
    fn cross_rebases_outside_growth() {
        let mut tick = Tick {
            initialized: true,
            liquidity_net: 42,
            fee_growth_outside_a: 30,
            fee_growth_outside_b: 50,
            ..Tick::default()
        };
        assert_eq!(tick.cross(100, 40), 42);
        assert_eq!(tick.fee_growth_outside_a, 70);
        assert_eq!(tick.fee_growth_outside_b, 40u128.wrapping_sub(50));
        tick.cross(100, 40);
        assert_eq!(tick.fee_growth_outside_a, 30, "crossing back restores the snapshot");
    }

    // ----- order generations -----

    #[test]
    fn fill_promotes_then_fulfills() {
        let mut tick = Tick {
            initialized: true,
            age: 3,
            open_orders_input: 100,
            ..Tick::default()
        };

        tick.fill_orders(40, true).unwrap();
        assert_eq!(tick.age, 4);
        assert_eq!(tick.open_orders_input, 0);
        assert_eq!(tick.part_filled_orders_input, 100);
        assert_eq!(tick.part_filled_orders_remaining_input, 60);

        tick.fill_orders(60, true).unwrap();
        assert_eq!(tick.age, 5);
        assert_eq!(tick.part_filled_orders_input, 0);
        assert_eq!(tick.part_filled_orders_remaining_input, 0);
        assert_eq!(tick.fulfilled_a_to_b_orders_input, 100);
        assert_eq!(tick.fulfilled_b_to_a_orders_input, 0);
    }

    #[test]
    fn fill_consumes_older_generation_first() {
        let mut tick = Tick {
            initialized: true,
            age: 1,
            open_orders_input: 50,
            part_filled_orders_input: 100,
            part_filled_orders_remaining_input: 30,
            ..Tick::default()
        };

        tick.fill_orders(40, false).unwrap();
        // the old generation (30 left) is retired, the open 50 becomes current with 10 consumed
        assert_eq!(tick.age, 2);
        assert_eq!(tick.fulfilled_b_to_a_orders_input, 100);
        assert_eq!(tick.part_filled_orders_input, 50);
        assert_eq!(tick.part_filled_orders_remaining_input, 40);
        assert_eq!(tick.open_orders_input, 0);
    }

    #[test]
    fn fill_exhausting_current_generation_with_open_orders_waiting() {
        let mut tick = Tick {
            initialized: true,
            age: 1,
            open_orders_input: 50,
            part_filled_orders_input: 100,
            part_filled_orders_remaining_input: 30,
            ..Tick::default()
        };
        tick.fill_orders(30, true).unwrap();
        // retirement waits for the next promotion so the open input keeps its age
        assert_eq!(tick.age, 1);
        assert_eq!(tick.part_filled_orders_remaining_input, 0);
        assert_eq!(tick.part_filled_orders_input, 100);
        assert_eq!(tick.open_orders_input, 50);
    }

    #[test]
    fn exhausted_generation_retires_once_open_input_is_gone() {
        let mut tick = Tick {
            initialized: true,
            age: 1,
            open_orders_input: 50,
            part_filled_orders_input: 100,
            part_filled_orders_remaining_input: 0,
            ..Tick::default()
        };
        assert!(!tick.retire_exhausted_generation(true).unwrap());
        assert_eq!(tick.age, 1);

        tick.open_orders_input = 0;
        assert!(tick.retire_exhausted_generation(true).unwrap());
        assert_eq!(tick.age, 2);
        assert_eq!(tick.part_filled_orders_input, 0);
        assert_eq!(tick.fulfilled_a_to_b_orders_input, 100);

        // opposite orders joining now start a generation of their own
        tick.open_orders_input = 30;
        tick.fill_orders(30, false).unwrap();
        assert_eq!(tick.fulfilled_a_to_b_orders_input, 100);
        assert_eq!(tick.fulfilled_b_to_a_orders_input, 30);
        assert_eq!(tick.age, 4);
        assert!(!tick.retire_exhausted_generation(false).unwrap());
    }

    #[test]
    fn fill_beyond_resting_input_errors() {
        let mut tick = Tick {
            initialized: true,
            open_orders_input: 10,
            ..Tick::default()
        };
        assert!(matches!(
            tick.fill_orders(11, true),
            Err(Error::LimitOrderError(LimitOrderError::AmountExceedsOrder))
        ));
    }

    #[test]
    fn try_uninitialize_respects_joint_predicate() {
        let mut tick = Tick {
            initialized: true,
            age: 9,
            fulfilled_a_to_b_orders_input: 1,
            ..Tick::default()
        };
        assert!(!tick.try_uninitialize(0));
        tick.fulfilled_a_to_b_orders_input = 0;
        assert!(tick.try_uninitialize(0));
        assert_eq!(tick, Tick { age: 9, ..Tick::default() });
    }

    proptest! {
        #[test]
        fn prop_uninitialized_only_when_unreferenced(
            liquidity in 1u64..1_000_000,
            removal in 0u64..1_000_000,
            orders in proptest::array::uniform5(0u64..3),
        ) {
            let mut tick = update_tick(&Tick::default(), 0, 0, 0, 0, liquidity as i128, false).unwrap();
            tick.open_orders_input = orders[0];
            tick.part_filled_orders_input = orders[1];
            tick.part_filled_orders_remaining_input = orders[2];
            tick.fulfilled_a_to_b_orders_input = orders[3];
            tick.fulfilled_b_to_a_orders_input = orders[4];

            let removal = removal.min(liquidity);
            let next = update_tick(&tick, 0, 0, 0, 0, -(removal as i128), false).unwrap();
            let referenced = next.liquidity_gross > 0 || orders.iter().any(|&o| o > 0);
            prop_assert_eq!(next.initialized, referenced);
        }

        #[test]
        fn prop_fills_never_exceed_resting_input(
            open in 1u64..1_000_000,
            fills in proptest::collection::vec(1u64..200_000, 1..8),
        ) {
            let mut tick = Tick { initialized: true, open_orders_input: open, ..Tick::default() };
            let mut filled = 0u64;
            for fill in fills {
                let fill = fill.min(tick.unfilled_orders_input());
                tick.fill_orders(fill, true).unwrap();
                filled += fill;
            }
            prop_assert!(filled <= open);
            prop_assert_eq!(
                tick.unfilled_orders_input() + tick.fulfilled_a_to_b_orders_input
                    + (tick.part_filled_orders_input - tick.part_filled_orders_remaining_input),
                open
            );
        }
    }
}
