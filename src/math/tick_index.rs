//! Tick grid helpers: alignment to the pool's tick spacing and tick array
//! addressing.

use crate::error::{RangeError, StateError};
use crate::math::tick_math::{MAX_TICK_INDEX, MIN_TICK_INDEX};

/// Number of ticks stored in one tick array.
pub const TICK_ARRAY_SIZE: usize = 88;

/// Pools with a tick spacing at or above this only allow full range positions.
pub const FULL_RANGE_ONLY_TICK_SPACING_THRESHOLD: u16 = 32768;

#[inline]
fn ticks_in_array(tick_spacing: u16) -> i32 {
    tick_spacing as i32 * TICK_ARRAY_SIZE as i32
}

/// Start index of the tick array containing `tick_index`.
pub fn get_tick_array_start_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let tick_spacing = tick_spacing as i32;
    let real_index = tick_index.div_euclid(tick_spacing);
    real_index.div_euclid(TICK_ARRAY_SIZE as i32) * tick_spacing * TICK_ARRAY_SIZE as i32
}

/// Whether `start_tick_index` is a valid array start for the tick spacing.
pub fn is_valid_tick_array_start_index(start_tick_index: i32, tick_spacing: u16) -> bool {
    start_tick_index.rem_euclid(ticks_in_array(tick_spacing)) == 0
}

/// Position of `tick_index` within the array starting at `start_tick_index`.
pub fn get_tick_index_in_array(
    tick_index: i32,
    start_tick_index: i32,
    tick_spacing: u16,
) -> Result<u32, StateError> {
    if tick_index < start_tick_index || tick_index >= start_tick_index + ticks_in_array(tick_spacing) {
        return Err(StateError::TickNotInArray(tick_index));
    }
    Ok(((tick_index - start_tick_index) / tick_spacing as i32) as u32)
}

/// Aligns `tick_index` to the spacing grid. `Some(false)` rounds down,
/// `Some(true)` rounds up, `None` rounds to the nearest (half up).
pub fn get_initializable_tick_index(tick_index: i32, tick_spacing: u16, round_up: Option<bool>) -> i32 {
    let tick_spacing = tick_spacing as i32;
    let remainder = tick_index.rem_euclid(tick_spacing);
    let result = tick_index - remainder;

    let should_round_up = match round_up {
        Some(round_up) => round_up && remainder > 0,
        None => remainder >= tick_spacing / 2 && remainder > 0,
    };

    if should_round_up {
        result + tick_spacing
    } else {
        result
    }
}

/// Closest initializable tick strictly below `tick_index`.
pub fn get_prev_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let tick_spacing = tick_spacing as i32;
    let remainder = tick_index.rem_euclid(tick_spacing);
    if remainder == 0 {
        tick_index - tick_spacing
    } else {
        tick_index - remainder
    }
}

/// Closest initializable tick strictly above `tick_index`.
pub fn get_next_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let tick_spacing = tick_spacing as i32;
    let remainder = tick_index.rem_euclid(tick_spacing);
    tick_index - remainder + tick_spacing
}

#[inline]
pub fn is_tick_index_in_bounds(tick_index: i32) -> bool {
    (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index)
}

#[inline]
pub fn is_tick_initializable(tick_index: i32, tick_spacing: u16) -> bool {
    tick_spacing != 0 && tick_index % tick_spacing as i32 == 0
}

/// Checks that a tick can carry liquidity or orders in a pool with this spacing.
pub fn check_tick_index(tick_index: i32, tick_spacing: u16) -> Result<(), RangeError> {
    if !is_tick_index_in_bounds(tick_index) || !is_tick_initializable(tick_index, tick_spacing) {
        return Err(RangeError::UnalignedTick {
            tick: tick_index,
            tick_spacing,
        });
    }
    Ok(())
}

/// The widest aligned range the tick spacing allows.
pub fn get_full_range_tick_indexes(tick_spacing: u16) -> (i32, i32) {
    let tick_spacing = tick_spacing as i32;
    (
        (MIN_TICK_INDEX / tick_spacing) * tick_spacing,
        (MAX_TICK_INDEX / tick_spacing) * tick_spacing,
    )
}

/// Returns the two ticks in ascending order.
#[inline]
pub fn order_tick_indexes(tick_index_1: i32, tick_index_2: i32) -> (i32, i32) {
    if tick_index_1 > tick_index_2 {
        (tick_index_2, tick_index_1)
    } else {
        (tick_index_1, tick_index_2)
    }
}

#[inline]
pub fn is_full_range_only(tick_spacing: u16) -> bool {
    tick_spacing >= FULL_RANGE_ONLY_TICK_SPACING_THRESHOLD
}

/// Start indexes of the arrays a swap may walk through: the array holding the
/// current tick, then `arrays_per_side` arrays in the swap direction, clipped
/// at the tick bounds. Ordered in the direction of travel.
pub fn get_tick_array_start_indexes_for_swap(
    tick_current_index: i32,
    tick_spacing: u16,
    a_to_b: bool,
    arrays_per_side: u8,
) -> Vec<i32> {
    let step = ticks_in_array(tick_spacing);
    let first = get_tick_array_start_tick_index(tick_current_index, tick_spacing);
    let min_start = get_tick_array_start_tick_index(MIN_TICK_INDEX, tick_spacing);
    let max_start = get_tick_array_start_tick_index(MAX_TICK_INDEX, tick_spacing);

    let mut starts = vec![first];
    for offset in 1..=arrays_per_side as i32 {
        let start = if a_to_b {
            first - offset * step
        } else {
            first + offset * step
        };
        if start < min_start || start > max_start {
            break;
        }
        starts.push(start);
    }
    starts
}

/// Start indexes of the arrays holding a position's two boundary ticks,
/// deduplicated when both land in the same array.
pub fn get_tick_array_start_indexes_for_position(
    tick_lower_index: i32,
    tick_upper_index: i32,
    tick_spacing: u16,
) -> Vec<i32> {
    let lower = get_tick_array_start_tick_index(tick_lower_index, tick_spacing);
    let upper = get_tick_array_start_tick_index(tick_upper_index, tick_spacing);
    if lower == upper {
        vec![lower]
    } else {
        vec![lower, upper]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ----- tick array addressing -----

    #[test]
    fn test_get_tick_array_start_tick_index() {
        assert_eq!(get_tick_array_start_tick_index(1000, 10), 880);
        assert_eq!(get_tick_array_start_tick_index(100, 10), 0);
        assert_eq!(get_tick_array_start_tick_index(0, 10), 0);
        assert_eq!(get_tick_array_start_tick_index(-100, 10), -880);
        assert_eq!(get_tick_array_start_tick_index(-1000, 10), -1760);
        assert_eq!(get_tick_array_start_tick_index(-1, 2), -176);
    }

    #[test]
    fn test_get_tick_index_in_array() {
        assert_eq!(get_tick_index_in_array(880, 880, 10).unwrap(), 0);
        assert_eq!(get_tick_index_in_array(1750, 880, 10).unwrap(), 87);
        assert_eq!(get_tick_index_in_array(-2, -176, 2).unwrap(), 87);
        assert!(matches!(
            get_tick_index_in_array(1760, 880, 10),
            Err(StateError::TickNotInArray(1760))
        ));
        assert!(matches!(
            get_tick_index_in_array(870, 880, 10),
            Err(StateError::TickNotInArray(870))
        ));
    }

    #[test]
    fn test_is_valid_tick_array_start_index() {
        assert!(is_valid_tick_array_start_index(0, 2));
        assert!(is_valid_tick_array_start_index(-176, 2));
        assert!(!is_valid_tick_array_start_index(2, 2));
    }

    // ----- alignment -----

    #[test]
    fn test_get_initializable_tick_index() {
        assert_eq!(get_initializable_tick_index(-14, 10, None), -10);
        assert_eq!(get_initializable_tick_index(-15, 10, None), -10);
        assert_eq!(get_initializable_tick_index(-16, 10, None), -20);
        assert_eq!(get_initializable_tick_index(14, 10, None), 10);
        assert_eq!(get_initializable_tick_index(15, 10, None), 20);
        assert_eq!(get_initializable_tick_index(15, 10, Some(false)), 10);
        assert_eq!(get_initializable_tick_index(11, 10, Some(true)), 20);
        assert_eq!(get_initializable_tick_index(-11, 10, Some(true)), -10);
        assert_eq!(get_initializable_tick_index(-11, 10, Some(false)), -20);
        assert_eq!(get_initializable_tick_index(20, 10, Some(true)), 20);
    }

    #[test]
    fn test_prev_next_initializable() {
        assert_eq!(get_prev_initializable_tick_index(10, 10), 0);
        assert_eq!(get_prev_initializable_tick_index(5, 10), 0);
        assert_eq!(get_prev_initializable_tick_index(-5, 10), -10);
        assert_eq!(get_next_initializable_tick_index(0, 10), 10);
        assert_eq!(get_next_initializable_tick_index(5, 10), 10);
        assert_eq!(get_next_initializable_tick_index(-5, 10), 0);
        assert_eq!(get_next_initializable_tick_index(-10, 10), 0);
    }

    #[test]
    fn test_bounds_and_alignment() {
        assert!(is_tick_index_in_bounds(MAX_TICK_INDEX));
        assert!(!is_tick_index_in_bounds(MIN_TICK_INDEX - 1));
        assert!(is_tick_initializable(-20, 10));
        assert!(!is_tick_initializable(-25, 10));
        assert!(check_tick_index(64, 64).is_ok());
        assert!(matches!(
            check_tick_index(65, 64),
            Err(RangeError::UnalignedTick { tick: 65, tick_spacing: 64 })
        ));
    }

    #[test]
    fn test_full_range_tick_indexes() {
        assert_eq!(get_full_range_tick_indexes(1), (MIN_TICK_INDEX, MAX_TICK_INDEX));
        assert_eq!(get_full_range_tick_indexes(64), (-443584, 443584));
        assert_eq!(order_tick_indexes(10, -10), (-10, 10));
        assert!(is_full_range_only(32768));
        assert!(!is_full_range_only(128));
    }

    // ----- array windows -----

    #[test]
    fn test_start_indexes_for_swap() {
        assert_eq!(get_tick_array_start_indexes_for_swap(0, 2, true, 2), vec![0, -176, -352]);
        assert_eq!(get_tick_array_start_indexes_for_swap(-1, 2, false, 2), vec![-176, 0, 176]);
        // clipped at the lower bound
        let starts = get_tick_array_start_indexes_for_swap(MIN_TICK_INDEX, 1, true, 2);
        assert_eq!(starts, vec![get_tick_array_start_tick_index(MIN_TICK_INDEX, 1)]);
    }

    #[test]
    fn test_start_indexes_for_position() {
        assert_eq!(get_tick_array_start_indexes_for_position(-10, 10, 2), vec![-176, 0]);
        assert_eq!(get_tick_array_start_indexes_for_position(2, 10, 2), vec![0]);
    }
}
