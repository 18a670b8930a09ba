use crate::error::{Error, PoolError};
use crate::math::tick_math::{MAX_SQRT_PRICE, MIN_SQRT_PRICE, sqrt_price_to_tick_index};
use crate::{
    MAX_CLP_REWARD_RATE, MAX_FEE_RATE, MAX_ORDER_PROTOCOL_FEE_RATE, MAX_PROTOCOL_FEE_RATE,
};
use alloy_primitives::B256;
use tracing::debug;

pub const POOL_VERSION: u16 = 1;

/// Returns the mint pair in canonical `(a, b)` order, by byte value.
pub fn sort_mints(mint_1: B256, mint_2: B256) -> (B256, B256) {
    if mint_1 < mint_2 {
        (mint_1, mint_2)
    } else {
        (mint_2, mint_1)
    }
}

/// The four fee knobs of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeRates {
    /// Trade fee in hundredths of a basis point.
    pub fee_rate: u16,
    /// Protocol share of AMM trade fees, in basis points.
    pub protocol_fee_rate: u16,
    /// Share of the non-protocol order-fill fee paid to order providers, in basis points.
    pub clp_to_olp_reward_ratio: u16,
    /// Protocol share of order-fill fees, in basis points.
    pub order_protocol_fee_rate: u16,
}

impl FeeRates {
    #[inline]
    pub fn new(fee_rate: u16) -> Self {
        Self {
            fee_rate,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_protocol_fee_rate(mut self, rate: u16) -> Self {
        self.protocol_fee_rate = rate;
        self
    }

    #[inline]
    pub fn with_clp_to_olp_reward_ratio(mut self, ratio: u16) -> Self {
        self.clp_to_olp_reward_ratio = ratio;
        self
    }

    #[inline]
    pub fn with_order_protocol_fee_rate(mut self, rate: u16) -> Self {
        self.order_protocol_fee_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.fee_rate > MAX_FEE_RATE {
            return Err(PoolError::FeeRateExceedsMax(self.fee_rate));
        }
        if self.protocol_fee_rate > MAX_PROTOCOL_FEE_RATE {
            return Err(PoolError::ProtocolFeeRateExceedsMax(self.protocol_fee_rate));
        }
        if self.order_protocol_fee_rate > MAX_ORDER_PROTOCOL_FEE_RATE {
            return Err(PoolError::OrderProtocolFeeRateExceedsMax(self.order_protocol_fee_rate));
        }
        if self.clp_to_olp_reward_ratio > MAX_CLP_REWARD_RATE {
            return Err(PoolError::RewardRatioExceedsMax(self.clp_to_olp_reward_ratio));
        }
        Ok(())
    }
}

/// Market state for one mint pair and tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pool {
    pub bump: u8,
    pub version: u16,
    pub token_mint_a: B256,
    pub token_mint_b: B256,
    pub token_vault_a: B256,
    pub token_vault_b: B256,

    pub tick_spacing: u16,
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub clp_to_olp_reward_ratio: u16,
    pub order_protocol_fee_rate: u16,

    /// Active liquidity at the current price.
    pub liquidity: u128,
    /// Q64.64
    pub sqrt_price: u128,
    pub tick_current_index: i32,

    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    /// Q64.64 fee per unit of liquidity, accumulated since creation.
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,

    // limit order aggregates, keyed by the order's input token
    pub orders_total_amount_a: u64,
    pub orders_total_amount_b: u64,
    pub orders_filled_amount_a: u64,
    pub orders_filled_amount_b: u64,
    // rewards owed to order providers, keyed by the reward token
    pub olp_fee_owed_a: u64,
    pub olp_fee_owed_b: u64,
}

impl Pool {
    /// Creates a pool at `sqrt_price`. Mints must already be in canonical order
    /// (see [`sort_mints`]).
    pub fn new(
        token_mint_a: B256,
        token_mint_b: B256,
        tick_spacing: u16,
        fee_rates: FeeRates,
        sqrt_price: u128,
    ) -> Result<Self, Error> {
        if token_mint_a >= token_mint_b {
            return Err(PoolError::InvalidMintOrder.into());
        }
        if tick_spacing == 0 {
            return Err(PoolError::ZeroTickSpacing.into());
        }
        fee_rates.validate()?;
        let tick_current_index = sqrt_price_to_tick_index(sqrt_price)?;

        debug!(tick_spacing, tick_current_index, fee_rate = fee_rates.fee_rate, "pool initialized");

        Ok(Self {
            version: POOL_VERSION,
            token_mint_a,
            token_mint_b,
            tick_spacing,
            fee_rate: fee_rates.fee_rate,
            protocol_fee_rate: fee_rates.protocol_fee_rate,
            clp_to_olp_reward_ratio: fee_rates.clp_to_olp_reward_ratio,
            order_protocol_fee_rate: fee_rates.order_protocol_fee_rate,
            sqrt_price,
            tick_current_index,
            ..Self::default()
        })
    }

    #[inline]
    pub fn fee_rates(&self) -> FeeRates {
        FeeRates {
            fee_rate: self.fee_rate,
            protocol_fee_rate: self.protocol_fee_rate,
            clp_to_olp_reward_ratio: self.clp_to_olp_reward_ratio,
            order_protocol_fee_rate: self.order_protocol_fee_rate,
        }
    }

    /// Little-endian tick spacing, as used when deriving the pool's address.
    #[inline]
    pub fn tick_spacing_seed(&self) -> [u8; 2] {
        self.tick_spacing.to_le_bytes()
    }

    /// Replaces the fee configuration after validating it.
    pub fn set_fee_rates(&mut self, fee_rates: FeeRates) -> Result<(), PoolError> {
        fee_rates.validate()?;
        self.fee_rate = fee_rates.fee_rate;
        self.protocol_fee_rate = fee_rates.protocol_fee_rate;
        self.clp_to_olp_reward_ratio = fee_rates.clp_to_olp_reward_ratio;
        self.order_protocol_fee_rate = fee_rates.order_protocol_fee_rate;
        Ok(())
    }

    /// Pays out and zeroes the protocol fees owed, returning `(fee_a, fee_b)`.
    ///
    /// Takes the pool exclusively: the amounts returned are exactly the ones
    /// cleared on this value, so a caller persisting `self` afterwards cannot
    /// pay the same fees twice.
    pub fn collect_protocol_fees(&mut self) -> (u64, u64) {
        let collected = (
            std::mem::take(&mut self.protocol_fee_owed_a),
            std::mem::take(&mut self.protocol_fee_owed_b),
        );
        debug!(fee_a = collected.0, fee_b = collected.1, "protocol fees collected");
        collected
    }

    #[inline]
    pub fn is_sqrt_price_in_bounds(sqrt_price: u128) -> bool {
        (MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;

    fn mints() -> (B256, B256) {
        (B256::with_last_byte(1), B256::with_last_byte(2))
    }

    #[test]
    fn sort_mints_is_canonical() {
        let (a, b) = mints();
        assert_eq!(sort_mints(b, a), (a, b));
        assert_eq!(sort_mints(a, b), (a, b));
    }

    #[test]
    fn new_pool_derives_current_tick() {
        let (a, b) = mints();
        let pool = Pool::new(a, b, 64, FeeRates::new(3000), 1u128 << 64).unwrap();
        assert_eq!(pool.tick_current_index, 0);
        assert_eq!(pool.liquidity, 0);
        assert_eq!(pool.version, POOL_VERSION);
        assert_eq!(pool.tick_spacing_seed(), [64, 0]);
        assert_eq!(pool.fee_rates(), FeeRates::new(3000));
    }

    #[test]
    fn new_pool_validation() {
        let (a, b) = mints();
        assert!(matches!(
            Pool::new(b, a, 64, FeeRates::new(3000), 1u128 << 64),
            Err(Error::PoolError(PoolError::InvalidMintOrder))
        ));
        assert!(matches!(
            Pool::new(a, a, 64, FeeRates::new(3000), 1u128 << 64),
            Err(Error::PoolError(PoolError::InvalidMintOrder))
        ));
        assert!(matches!(
            Pool::new(a, b, 0, FeeRates::new(3000), 1u128 << 64),
            Err(Error::PoolError(PoolError::ZeroTickSpacing))
        ));
        assert!(matches!(
            Pool::new(a, b, 64, FeeRates::new(MAX_FEE_RATE + 1), 1u128 << 64),
            Err(Error::PoolError(PoolError::FeeRateExceedsMax(_)))
        ));
        assert!(matches!(
            Pool::new(a, b, 64, FeeRates::new(3000).with_protocol_fee_rate(2_501), 1u128 << 64),
            Err(Error::PoolError(PoolError::ProtocolFeeRateExceedsMax(2_501)))
        ));
        assert!(matches!(
            Pool::new(a, b, 64, FeeRates::new(3000).with_clp_to_olp_reward_ratio(10_001), 1u128 << 64),
            Err(Error::PoolError(PoolError::RewardRatioExceedsMax(10_001)))
        ));
        assert!(matches!(
            Pool::new(a, b, 64, FeeRates::new(3000), MIN_SQRT_PRICE - 1),
            Err(Error::StateError(StateError::SqrtPriceOutOfBounds))
        ));
    }

    #[test]
    fn collect_protocol_fees_clears_owed() {
        let (a, b) = mints();
        let mut pool = Pool::new(a, b, 64, FeeRates::new(3000), 1u128 << 64).unwrap();
        pool.protocol_fee_owed_a = 120;
        pool.protocol_fee_owed_b = 7;

        assert_eq!(pool.collect_protocol_fees(), (120, 7));
        assert_eq!(pool.protocol_fee_owed_a, 0);
        assert_eq!(pool.protocol_fee_owed_b, 0);
        assert_eq!(pool.collect_protocol_fees(), (0, 0), "second collection pays nothing");
    }

    #[test]
    fn set_fee_rates_validates() {
        let (a, b) = mints();
        let mut pool = Pool::new(a, b, 64, FeeRates::new(3000), 1u128 << 64).unwrap();
        assert!(pool.set_fee_rates(FeeRates::new(3000).with_order_protocol_fee_rate(10_001)).is_err());
        pool.set_fee_rates(FeeRates::new(500).with_order_protocol_fee_rate(2_000)).unwrap();
        assert_eq!(pool.fee_rate, 500);
        assert_eq!(pool.order_protocol_fee_rate, 2_000);
    }
}
