//! Occupancy bitmap of a position bundle. Bit `i` (little-endian over the 32
//! bytes) is set when slot `i` holds a position.

use alloy_primitives::U256;

pub const POSITION_BUNDLE_SIZE: usize = 256;

#[inline]
fn bitmap_to_u256(bitmap: &[u8; 32]) -> U256 {
    U256::from_le_bytes(*bitmap)
}

/// Lowest free slot, or `None` when every slot is taken.
pub fn first_unoccupied_position_in_bundle(bitmap: &[u8; 32]) -> Option<u32> {
    let free = !bitmap_to_u256(bitmap);
    if free.is_zero() {
        return None;
    }
    Some(free.trailing_zeros() as u32)
}

pub fn is_position_bundle_full(bitmap: &[u8; 32]) -> bool {
    bitmap_to_u256(bitmap) == U256::MAX
}

pub fn is_position_bundle_empty(bitmap: &[u8; 32]) -> bool {
    bitmap_to_u256(bitmap).is_zero()
}
