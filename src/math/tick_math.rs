use crate::error::StateError;
use alloy_primitives::U256;

pub const MIN_TICK_INDEX: i32 = -443636;
pub const MAX_TICK_INDEX: i32 = -MIN_TICK_INDEX;

pub const MIN_SQRT_PRICE: u128 = 4295048016;
pub const MAX_SQRT_PRICE: u128 = 79226673515401279992447579055;

const LOG_B_2_X32: i128 = 59543866431248;
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184467440737095516;
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15793534762490258745;

/// Returns the Q64.64 sqrt price `sqrt(1.0001^tick)` for a tick index, or
/// `StateError::TickOutOfBounds` outside `[MIN_TICK_INDEX, MAX_TICK_INDEX]`.
///
/// Positive ticks are evaluated in Q96 and scaled down, negative ticks in Q64,
/// which keeps both halves within one unit of the exact value.
pub fn tick_index_to_sqrt_price(tick: i32) -> Result<u128, StateError> {
    if !(MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick) {
        return Err(StateError::TickOutOfBounds);
    }
    if tick >= 0 {
        Ok(sqrt_price_at_positive_tick(tick as u32))
    } else {
        Ok(sqrt_price_at_negative_tick(tick.unsigned_abs()))
    }
}

fn sqrt_price_at_positive_tick(tick: u32) -> u128 {
    // Q96 multipliers for 1.0001^(2^k / 2)
    let mut ratio = if tick & 1 != 0 {
        U256::from(79232123823359799118286999567u128)
    } else {
        U256::from(1u128 << 96)
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $multiplier:expr) => {
            if tick & $bit != 0 {
                ratio = (ratio * U256::from($multiplier as u128)) >> 96;
            }
        };
    }

    apply_multiplier!(2, 79236085330515764027303304731u128);
    apply_multiplier!(4, 79244008939048815603706035061u128);
    apply_multiplier!(8, 79259858533276714757314932305u128);
    apply_multiplier!(16, 79291567232598584799939703904u128);
    apply_multiplier!(32, 79355022692464371645785046466u128);
    apply_multiplier!(64, 79482085999252804386437311141u128);
    apply_multiplier!(128, 79736823300114093921829183326u128);
    apply_multiplier!(256, 80248749790819932309965073892u128);
    apply_multiplier!(512, 81282483887344747381513967011u128);
    apply_multiplier!(1024, 83390072131320151908154831281u128);
    apply_multiplier!(2048, 87770609709833776024991924138u128);
    apply_multiplier!(4096, 97234110755111693312479820773u128);
    apply_multiplier!(8192, 119332217159966728226237229890u128);
    apply_multiplier!(16384, 179736315981702064433883588727u128);
    apply_multiplier!(32768, 407748233172238350107850275304u128);
    apply_multiplier!(65536, 2098478828474011932436660412517u128);
    apply_multiplier!(131072, 55581415166113811149459800483533u128);
    apply_multiplier!(262144, 38992368544603139932233054999993551u128);

    // ratio < 2^128 for every tick <= MAX_TICK_INDEX
    let shifted: U256 = ratio >> 32;
    let limbs = shifted.as_limbs();
    ((limbs[1] as u128) << 64) | limbs[0] as u128
}

fn sqrt_price_at_negative_tick(tick: u32) -> u128 {
    // Q64 multipliers for 1.0001^(-2^k / 2)
    let mut ratio: u128 = if tick & 1 != 0 {
        18445821805675392311
    } else {
        1u128 << 64
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $multiplier:expr) => {
            if tick & $bit != 0 {
                let product = U256::from(ratio) * U256::from($multiplier as u128);
                ratio = (product >> 64usize).as_limbs()[0] as u128
                    | (((product >> 128usize).as_limbs()[0] as u128) << 64);
            }
        };
    }

    apply_multiplier!(2, 18444899583751176498u128);
    apply_multiplier!(4, 18443055278223354162u128);
    apply_multiplier!(8, 18439367220385604838u128);
    apply_multiplier!(16, 18431993317065449817u128);
    apply_multiplier!(32, 18417254355718160513u128);
    apply_multiplier!(64, 18387811781193591352u128);
    apply_multiplier!(128, 18329067761203520168u128);
    apply_multiplier!(256, 18212142134806087854u128);
    apply_multiplier!(512, 17980523815641551639u128);
    apply_multiplier!(1024, 17526086738831147013u128);
    apply_multiplier!(2048, 16651378430235024244u128);
    apply_multiplier!(4096, 15030750278693429944u128);
    apply_multiplier!(8192, 12247334978882834399u128);
    apply_multiplier!(16384, 8131365268884726200u128);
    apply_multiplier!(32768, 3584323654723342297u128);
    apply_multiplier!(65536, 696457651847595233u128);
    apply_multiplier!(131072, 26294789957452057u128);
    apply_multiplier!(262144, 37481735321082u128);

    ratio
}

/// Computes the tick index whose range contains a Q64.64 sqrt price, i.e. the
/// greatest tick with `tick_index_to_sqrt_price(tick) <= sqrt_price`.
///
/// Uses a 14-bit log2 approximation followed by a one-tick correction against
/// [`tick_index_to_sqrt_price`], so the result is exact over the whole range.
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> Result<i32, StateError> {
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let msb = 127 - sqrt_price.leading_zeros();
    let log2p_integer_x32 = (msb as i128 - 64) << 32;

    let mut r: u128 = if msb >= 64 {
        sqrt_price >> (msb - 63)
    } else {
        sqrt_price << (63 - msb)
    };
    let mut log2p_fraction_x64: i128 = 0;

    macro_rules! log2_step {
        ($shift:expr) => {{
            r *= r;
            let is_r_more_than_two = (r >> 127) as u32;
            r >>= 63 + is_r_more_than_two;
            log2p_fraction_x64 |= (is_r_more_than_two as i128) << $shift;
        }};
    }

    log2_step!(63);
    log2_step!(62);
    log2_step!(61);
    log2_step!(60);
    log2_step!(59);
    log2_step!(58);
    log2_step!(57);
    log2_step!(56);
    log2_step!(55);
    log2_step!(54);
    log2_step!(53);
    log2_step!(52);
    log2_step!(51);
    log2_step!(50);

    let log2p_x32 = log2p_integer_x32 + (log2p_fraction_x64 >> 32);
    let logbp_x64 = log2p_x32 * LOG_B_2_X32;

    let tick_low = ((logbp_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64) as i32;
    let tick_high = ((logbp_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64) as i32;

    Ok(if tick_low == tick_high {
        tick_low
    } else if tick_index_to_sqrt_price(tick_high)? <= sqrt_price {
        tick_high
    } else {
        tick_low
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tick_index_to_sqrt_price_bounds() {
        assert!(matches!(
            tick_index_to_sqrt_price(MIN_TICK_INDEX - 1),
            Err(StateError::TickOutOfBounds)
        ));
        assert!(matches!(
            tick_index_to_sqrt_price(MAX_TICK_INDEX + 1),
            Err(StateError::TickOutOfBounds)
        ));
        assert_eq!(
            tick_index_to_sqrt_price(MIN_TICK_INDEX).unwrap(),
            MIN_SQRT_PRICE,
            "sqrt price at min tick incorrect"
        );
        assert_eq!(
            tick_index_to_sqrt_price(MAX_TICK_INDEX).unwrap(),
            MAX_SQRT_PRICE,
            "sqrt price at max tick incorrect"
        );
    }

    #[test]
    fn test_tick_index_to_sqrt_price_values() {
        assert_eq!(tick_index_to_sqrt_price(0).unwrap(), 1u128 << 64);
        assert_eq!(tick_index_to_sqrt_price(1).unwrap(), 18447666387855959850);
        assert_eq!(tick_index_to_sqrt_price(-1).unwrap(), 18445821805675392311);
        assert_eq!(tick_index_to_sqrt_price(10).unwrap(), 18455969290605290427);
        assert_eq!(tick_index_to_sqrt_price(-10).unwrap(), 18437523468038800957);
        assert_eq!(tick_index_to_sqrt_price(100).unwrap(), 18539204128674405812);
        assert_eq!(tick_index_to_sqrt_price(-100).unwrap(), 18354745142194483561);
        assert_eq!(tick_index_to_sqrt_price(128).unwrap(), 18565175891880433522);
        assert_eq!(tick_index_to_sqrt_price(-128).unwrap(), 18329067761203520168);
        assert_eq!(tick_index_to_sqrt_price(6931).unwrap(), 26086568254500584001);
        assert_eq!(
            tick_index_to_sqrt_price(MAX_TICK_INDEX - 1).unwrap(),
            79222712478800779441888593664,
            "sqrt price at max - 1 incorrect"
        );
        assert_eq!(
            tick_index_to_sqrt_price(MIN_TICK_INDEX + 1).unwrap(),
            4295262763,
            "sqrt price at min + 1 incorrect"
        );
    }

    #[test]
    fn test_sqrt_price_to_tick_index() {
        assert!(matches!(
            sqrt_price_to_tick_index(MIN_SQRT_PRICE - 1),
            Err(StateError::SqrtPriceOutOfBounds)
        ));
        assert!(matches!(
            sqrt_price_to_tick_index(MAX_SQRT_PRICE + 1),
            Err(StateError::SqrtPriceOutOfBounds)
        ));

        assert_eq!(sqrt_price_to_tick_index(MIN_SQRT_PRICE).unwrap(), MIN_TICK_INDEX);
        assert_eq!(sqrt_price_to_tick_index(MAX_SQRT_PRICE).unwrap(), MAX_TICK_INDEX);
        assert_eq!(sqrt_price_to_tick_index(MAX_SQRT_PRICE - 1).unwrap(), MAX_TICK_INDEX - 1);

        // a price one unit below a tick belongs to the tick underneath
        assert_eq!(sqrt_price_to_tick_index(1u128 << 64).unwrap(), 0);
        assert_eq!(sqrt_price_to_tick_index((1u128 << 64) - 1).unwrap(), -1);
        assert_eq!(sqrt_price_to_tick_index((1u128 << 64) + 1).unwrap(), 0);
    }

    #[test]
    fn test_round_trip_around_zero_and_extremes() {
        for tick in (-2_000..=2_000).chain(MIN_TICK_INDEX..MIN_TICK_INDEX + 500).chain(MAX_TICK_INDEX - 500..=MAX_TICK_INDEX) {
            let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
            assert_eq!(sqrt_price_to_tick_index(sqrt_price).unwrap(), tick, "round trip failed at {tick}");
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(tick in MIN_TICK_INDEX..=MAX_TICK_INDEX) {
            let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
            prop_assert_eq!(sqrt_price_to_tick_index(sqrt_price).unwrap(), tick);
        }

        #[test]
        fn prop_monotonic(tick in MIN_TICK_INDEX..MAX_TICK_INDEX) {
            let lower = tick_index_to_sqrt_price(tick).unwrap();
            let upper = tick_index_to_sqrt_price(tick + 1).unwrap();
            prop_assert!(lower < upper);
            // every price strictly inside the tick maps back to it
            prop_assert_eq!(sqrt_price_to_tick_index(upper - 1).unwrap(), tick);
        }
    }
}
