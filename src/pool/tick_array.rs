use crate::error::StateError;
use crate::math::tick_index::{
    get_tick_index_in_array, is_tick_initializable, is_valid_tick_array_start_index,
};
use crate::math::tick_math::{MAX_TICK_INDEX, MIN_TICK_INDEX};
use crate::pool::tick::Tick;
use alloy_primitives::B256;

pub use crate::math::tick_index::TICK_ARRAY_SIZE;

/// A fixed window of `TICK_ARRAY_SIZE` ticks starting at `start_tick_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: [Tick; TICK_ARRAY_SIZE],
    pub pool: B256,
}

impl TickArray {
    /// Creates an array of uninitialized ticks. `start_tick_index` must be a
    /// multiple of `tick_spacing * TICK_ARRAY_SIZE`.
    pub fn new(pool: B256, start_tick_index: i32, tick_spacing: u16) -> Result<Self, StateError> {
        if tick_spacing == 0 || !is_valid_tick_array_start_index(start_tick_index, tick_spacing) {
            return Err(StateError::InvalidTickArrayStart(start_tick_index));
        }
        Ok(Self {
            start_tick_index,
            ticks: [Tick::default(); TICK_ARRAY_SIZE],
            pool,
        })
    }

    /// Last tick index covered by the array (not necessarily initializable).
    #[inline]
    pub fn end_tick_index(&self, tick_spacing: u16) -> i32 {
        self.start_tick_index + tick_spacing as i32 * TICK_ARRAY_SIZE as i32 - 1
    }

    fn offset(&self, tick_index: i32, tick_spacing: u16) -> Result<usize, StateError> {
        if !is_tick_initializable(tick_index, tick_spacing) {
            return Err(StateError::TickNotInArray(tick_index));
        }
        Ok(get_tick_index_in_array(tick_index, self.start_tick_index, tick_spacing)? as usize)
    }

    pub fn tick(&self, tick_index: i32, tick_spacing: u16) -> Result<&Tick, StateError> {
        let offset = self.offset(tick_index, tick_spacing)?;
        Ok(&self.ticks[offset])
    }

    pub fn tick_mut(&mut self, tick_index: i32, tick_spacing: u16) -> Result<&mut Tick, StateError> {
        let offset = self.offset(tick_index, tick_spacing)?;
        Ok(&mut self.ticks[offset])
    }
}

/// Consecutive tick arrays of one pool, sorted by start index, that a swap
/// can walk through.
#[derive(Debug, Clone)]
pub struct TickArraySequence {
    tick_arrays: Vec<TickArray>,
    tick_spacing: u16,
}

impl TickArraySequence {
    /// Sorts the arrays and checks they are contiguous and share a pool.
    pub fn new(mut tick_arrays: Vec<TickArray>, tick_spacing: u16) -> Result<Self, StateError> {
        let Some(first) = tick_arrays.first() else {
            return Err(StateError::EmptyTickArraySequence);
        };
        if tick_spacing == 0 {
            return Err(StateError::InvalidTickArraySequence);
        }
        let pool = first.pool;
        let span = tick_spacing as i32 * TICK_ARRAY_SIZE as i32;

        tick_arrays.sort_by_key(|array| array.start_tick_index);
        for array in &tick_arrays {
            if array.pool != pool || !is_valid_tick_array_start_index(array.start_tick_index, tick_spacing) {
                return Err(StateError::InvalidTickArraySequence);
            }
        }
        for pair in tick_arrays.windows(2) {
            if pair[1].start_tick_index - pair[0].start_tick_index != span {
                return Err(StateError::InvalidTickArraySequence);
            }
        }

        Ok(Self {
            tick_arrays,
            tick_spacing,
        })
    }

    #[inline]
    pub fn tick_spacing(&self) -> u16 {
        self.tick_spacing
    }

    #[inline]
    pub fn start_index(&self) -> i32 {
        self.tick_arrays[0].start_tick_index
    }

    #[inline]
    pub fn end_index(&self) -> i32 {
        self.tick_arrays[self.tick_arrays.len() - 1].end_tick_index(self.tick_spacing)
    }

    fn array_position(&self, tick_index: i32) -> Result<usize, StateError> {
        if tick_index < self.start_index() || tick_index > self.end_index() {
            return Err(StateError::TickNotInArray(tick_index));
        }
        let span = self.tick_spacing as i32 * TICK_ARRAY_SIZE as i32;
        Ok(((tick_index - self.start_index()) / span) as usize)
    }

    pub fn tick(&self, tick_index: i32) -> Result<&Tick, StateError> {
        let position = self.array_position(tick_index)?;
        self.tick_arrays[position].tick(tick_index, self.tick_spacing)
    }

    pub fn tick_mut(&mut self, tick_index: i32) -> Result<&mut Tick, StateError> {
        let position = self.array_position(tick_index)?;
        let tick_spacing = self.tick_spacing;
        self.tick_arrays[position].tick_mut(tick_index, tick_spacing)
    }

    /// Closest initialized tick strictly above `tick_index`. Reaching the end
    /// of the window yields `(None, end)`, where `end` is the window's last
    /// tick capped at `MAX_TICK_INDEX`; starting at or past it means more
    /// arrays are needed.
    pub fn next_initialized_tick(&self, tick_index: i32) -> Result<(Option<&Tick>, i32), StateError> {
        let end = self.end_index().min(MAX_TICK_INDEX);
        if tick_index >= end {
            return Err(StateError::InsufficientTickArrays);
        }
        let spacing = self.tick_spacing as i32;
        let mut next = tick_index;
        loop {
            next = next.div_euclid(spacing) * spacing + spacing;
            if next > end {
                return Ok((None, end));
            }
            let tick = self.tick(next)?;
            if tick.initialized {
                return Ok((Some(tick), next));
            }
        }
    }

    /// Closest initialized tick at or below `tick_index`. Reaching the start
    /// of the window yields `(None, start)`, with `start` floored at
    /// `MIN_TICK_INDEX`; starting below it means more arrays are needed.
    pub fn prev_initialized_tick(&self, tick_index: i32) -> Result<(Option<&Tick>, i32), StateError> {
        let start = self.start_index().max(MIN_TICK_INDEX);
        if tick_index < start {
            return Err(StateError::InsufficientTickArrays);
        }
        let spacing = self.tick_spacing as i32;
        let mut prev = tick_index.div_euclid(spacing) * spacing;
        loop {
            if prev < start {
                return Ok((None, start));
            }
            let tick = self.tick(prev)?;
            if tick.initialized {
                return Ok((Some(tick), prev));
            }
            prev -= spacing;
        }
    }

    pub fn tick_arrays(&self) -> &[TickArray] {
        &self.tick_arrays
    }

    pub fn into_tick_arrays(self) -> Vec<TickArray> {
        self.tick_arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: B256 = B256::with_last_byte(7);

    fn sequence(starts: &[i32], tick_spacing: u16) -> TickArraySequence {
        let arrays = starts
            .iter()
            .map(|&start| TickArray::new(POOL, start, tick_spacing).unwrap())
            .collect();
        TickArraySequence::new(arrays, tick_spacing).unwrap()
    }

    #[test]
    fn tick_array_new_validates_start() {
        assert!(TickArray::new(POOL, 176, 2).is_ok());
        assert!(matches!(
            TickArray::new(POOL, 2, 2),
            Err(StateError::InvalidTickArrayStart(2))
        ));
        assert!(matches!(
            TickArray::new(POOL, 0, 0),
            Err(StateError::InvalidTickArrayStart(0))
        ));
    }

    #[test]
    fn tick_array_lookup() {
        let mut array = TickArray::new(POOL, -176, 2).unwrap();
        array.tick_mut(-2, 2).unwrap().liquidity_net = 5;
        assert_eq!(array.ticks[87].liquidity_net, 5);
        assert_eq!(array.end_tick_index(2), -1);
        assert!(matches!(array.tick(0, 2), Err(StateError::TickNotInArray(0))));
        assert!(matches!(array.tick(-3, 2), Err(StateError::TickNotInArray(-3))));
    }

    #[test]
    fn sequence_sorts_and_validates() {
        let seq = sequence(&[0, -176, 176], 2);
        assert_eq!(seq.start_index(), -176);
        assert_eq!(seq.end_index(), 351);

        let gap = vec![
            TickArray::new(POOL, 0, 2).unwrap(),
            TickArray::new(POOL, 352, 2).unwrap(),
        ];
        assert!(matches!(
            TickArraySequence::new(gap, 2),
            Err(StateError::InvalidTickArraySequence)
        ));

        let mixed = vec![
            TickArray::new(POOL, 0, 2).unwrap(),
            TickArray::new(B256::with_last_byte(8), 176, 2).unwrap(),
        ];
        assert!(matches!(
            TickArraySequence::new(mixed, 2),
            Err(StateError::InvalidTickArraySequence)
        ));
        assert!(matches!(
            TickArraySequence::new(Vec::new(), 2),
            Err(StateError::EmptyTickArraySequence)
        ));
    }

    #[test]
    fn sequence_rejects_zero_spacing() {
        let arrays = vec![TickArray::new(POOL, 0, 2).unwrap()];
        assert!(matches!(
            TickArraySequence::new(arrays, 0),
            Err(StateError::InvalidTickArraySequence)
        ));
    }

    #[test]
    fn window_edges_stop_at_the_tick_bounds() {
        // [443608, 443696) and [-443696, -443608) reach past the price range
        let upper = sequence(&[443608], 1);
        assert_eq!(upper.end_index(), 443695);
        assert_eq!(upper.next_initialized_tick(443620).unwrap(), (None, MAX_TICK_INDEX));
        assert!(matches!(
            upper.next_initialized_tick(MAX_TICK_INDEX),
            Err(StateError::InsufficientTickArrays)
        ));

        let lower = sequence(&[-443696], 1);
        assert_eq!(lower.start_index(), -443696);
        assert_eq!(lower.prev_initialized_tick(-443620).unwrap(), (None, MIN_TICK_INDEX));
        assert!(matches!(
            lower.prev_initialized_tick(MIN_TICK_INDEX - 1),
            Err(StateError::InsufficientTickArrays)
        ));

        // wide spacing: the last initializable tick sits below the bound
        let wide = sequence(&[439296], 64);
        assert_eq!(wide.next_initialized_tick(443584).unwrap().1, MAX_TICK_INDEX);
    }

    #[test]
    fn next_initialized_tick_search() {
        let mut seq = sequence(&[-176, 0], 2);
        seq.tick_mut(10).unwrap().initialized = true;

        let (tick, index) = seq.next_initialized_tick(0).unwrap();
        assert!(tick.is_some());
        assert_eq!(index, 10);

        let (tick, index) = seq.next_initialized_tick(10).unwrap();
        assert!(tick.is_none());
        assert_eq!(index, 175, "edge of the loaded window");

        assert!(matches!(
            seq.next_initialized_tick(175),
            Err(StateError::InsufficientTickArrays)
        ));
    }

    #[test]
    fn prev_initialized_tick_search() {
        let mut seq = sequence(&[-176, 0], 2);
        seq.tick_mut(-10).unwrap().initialized = true;
        seq.tick_mut(0).unwrap().initialized = true;

        // the current tick itself is included
        assert_eq!(seq.prev_initialized_tick(1).unwrap().1, 0);
        assert_eq!(seq.prev_initialized_tick(-1).unwrap().1, -10);

        let (tick, index) = seq.prev_initialized_tick(-11).unwrap();
        assert!(tick.is_none());
        assert_eq!(index, -176);

        assert!(matches!(
            seq.prev_initialized_tick(-177),
            Err(StateError::InsufficientTickArrays)
        ));
    }
}
