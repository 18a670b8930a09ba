use crate::error::MathError;
use crate::{U64_MAX, U128_MAX, U256_1};
use alloy_primitives::U256;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

#[inline(always)]
#[cold]
fn cold_path() {}

#[inline(always)]
pub(crate) fn likely(b: bool) -> bool {
    if !b {
        cold_path();
    }
    b
}

#[inline(always)]
pub(crate) fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
    }
    b
}

/// Computes `a * b / denominator` with a full 512-bit intermediate product,
/// returning a `MathError` on overflow or division by zero.
#[inline(always)]
pub fn mul_div(a: U256, b: U256, mut denominator: U256) -> Result<U256, MathError> {
    if unlikely(denominator.is_zero()) {
        return Err(MathError::DivisionByZero);
    }

    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);

    let (mut prod1, borrow1) = mm.overflowing_sub(prod0);
    if borrow1 {
        prod1 = prod1.wrapping_sub(U256_1);
    }

    if likely(prod1.is_zero()) {
        return Ok(prod0.wrapping_div(denominator));
    }

    if unlikely(denominator <= prod1) {
        return Err(MathError::Overflow);
    }

    let remainder = a.mul_mod(b, denominator);
    let (prod0_new, borrow2) = prod0.overflowing_sub(remainder);
    prod0 = prod0_new;
    if borrow2 {
        prod1 = prod1.wrapping_sub(U256_1);
    }

    let twos = denominator & denominator.wrapping_neg();
    denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);

    let twos_adj = twos.wrapping_neg().wrapping_div(twos).wrapping_add(U256_1);
    prod0 |= prod1.wrapping_mul(twos_adj);

    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;

    macro_rules! newton_iteration {
        () => {
            inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)))
        };
    }

    newton_iteration!();
    newton_iteration!();
    newton_iteration!();
    newton_iteration!();
    newton_iteration!();
    newton_iteration!();

    Ok(prod0.wrapping_mul(inv))
}

/// Like [`mul_div`], but rounds the result up when there is a non-zero remainder.
#[inline(always)]
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let mut result = mul_div(a, b, denominator)?;

    if a.mul_mod(b, denominator) > U256::ZERO {
        if result >= U256::MAX {
            return Err(MathError::Overflow);
        }
        result += U256_1;
    }
    Ok(result)
}

/// Divides `a` by `b`, rounding up on a non-zero remainder.
#[inline(always)]
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if unlikely(b.is_zero()) {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256_1)
    }
}

/// `amount * numerator / denominator` for token amounts, returning 0 if any
/// operand is 0 and `AmountExceedsMaxU64` if the result does not fit.
pub fn try_mul_div(
    amount: u64,
    numerator: u128,
    denominator: u128,
    round_up: bool,
) -> Result<u64, MathError> {
    if amount == 0 || numerator == 0 || denominator == 0 {
        return Ok(0);
    }

    let product = U256::from(amount) * U256::from(numerator);
    let denominator = U256::from(denominator);
    let quotient = if round_up {
        div_rounding_up(product, denominator)?
    } else {
        product / denominator
    };

    u256_to_u64(quotient)
}

#[inline]
pub fn u256_to_u64(value: U256) -> Result<u64, MathError> {
    if value > U64_MAX {
        return Err(MathError::AmountExceedsMaxU64);
    }
    Ok(value.as_limbs()[0])
}

#[inline]
pub fn u256_to_u128(value: U256) -> Result<u128, MathError> {
    if value > U128_MAX {
        return Err(MathError::Overflow);
    }
    let limbs = value.as_limbs();
    Ok(((limbs[1] as u128) << 64) | limbs[0] as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------- mul_div tests -------------------------

    #[test]
    fn mul_div_division_by_zero() {
        let result = mul_div(U256::from(10u8), U256::from(20u8), U256::ZERO);
        assert!(matches!(result, Err(MathError::DivisionByZero)));
    }

    #[test]
    fn mul_div_keeps_precision_past_256_bits() {
        // liquidity * sqrt_price * sqrt_price does not fit in 256 bits but the quotient does
        let a = U256::from(u128::MAX) * U256::from(u64::MAX);
        let b = U256::from(u128::MAX);
        let result = mul_div(a, b, U256::from(u128::MAX)).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn mul_div_result_overflow() {
        let result = mul_div(U256::MAX, U256::from(2u8), U256::ONE);
        assert!(matches!(result, Err(MathError::Overflow)));
    }

    #[test]
    fn mul_div_rounds_down() {
        // 7 * 10 / 8 = 8.75
        let result = mul_div(U256::from(7u8), U256::from(10u8), U256::from(8u8)).unwrap();
        assert_eq!(result, U256::from(8u8));
    }

    // ------------------------- rounding up tests -------------------------

    #[test]
    fn mul_div_rounding_up_exact_and_inexact() {
        let exact = mul_div_rounding_up(U256::from(20u8), U256::from(10u8), U256::from(5u8));
        assert_eq!(exact.unwrap(), U256::from(40u8));

        let inexact = mul_div_rounding_up(U256::from(7u8), U256::from(10u8), U256::from(3u8));
        assert_eq!(inexact.unwrap(), U256::from(24u8));
    }

    #[test]
    fn div_rounding_up_reports_division_by_zero() {
        assert!(matches!(
            div_rounding_up(U256::from(10u8), U256::ZERO),
            Err(MathError::DivisionByZero)
        ));
        assert_eq!(div_rounding_up(U256::from(10u8), U256::from(3u8)).unwrap(), U256::from(4u8));
        assert_eq!(div_rounding_up(U256::MAX, U256::MAX - U256_1).unwrap(), U256::from(2u8));
    }

    // ------------------------- try_mul_div tests -------------------------

    #[test]
    fn try_mul_div_zero_operands_short_circuit() {
        assert_eq!(try_mul_div(0, 5, 7, true).unwrap(), 0);
        assert_eq!(try_mul_div(5, 0, 7, true).unwrap(), 0);
        assert_eq!(try_mul_div(5, 7, 0, true).unwrap(), 0);
    }

    #[test]
    fn try_mul_div_rounding() {
        assert_eq!(try_mul_div(1_000, 3_000, 1_000_000, false).unwrap(), 3);
        assert_eq!(try_mul_div(1_001, 3_000, 1_000_000, true).unwrap(), 4);
    }

    #[test]
    fn try_mul_div_rejects_results_beyond_u64() {
        let result = try_mul_div(u64::MAX, 2, 1, false);
        assert!(matches!(result, Err(MathError::AmountExceedsMaxU64)));
    }

    #[test]
    fn narrowing_conversions() {
        assert_eq!(u256_to_u64(U256::from(u64::MAX)).unwrap(), u64::MAX);
        assert!(u256_to_u64(U256::from(u64::MAX) + U256_1).is_err());
        assert_eq!(u256_to_u128(U256::from(u128::MAX)).unwrap(), u128::MAX);
        assert!(matches!(
            u256_to_u128(U256::from(u128::MAX) + U256_1),
            Err(MathError::Overflow)
        ));
    }
}
