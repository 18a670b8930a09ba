//! Caller-owned quoting configuration.
//!
//! There is no process-wide default: a `QuoteConfig` is built once by the caller and passed by
//! reference into every quote that needs a slippage tolerance, a transfer-fee policy or a
//! tick-array window.

use crate::BPS_DENOMINATOR;
use crate::error::QuoteError;

/// How quotes treat transfer fees configured on a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferFeeMode {
    /// Gross up inputs and net down outputs by the mint's transfer fee.
    #[default]
    Apply,
    /// Quote raw pool amounts, ignoring any transfer fee.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawQuoteConfig"))]
pub struct QuoteConfig {
    slippage_tolerance_bps: u16,
    transfer_fee_mode: TransferFeeMode,
    tick_arrays_per_side: u8,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            slippage_tolerance_bps: 100,
            transfer_fee_mode: TransferFeeMode::Apply,
            tick_arrays_per_side: 2,
        }
    }
}

impl QuoteConfig {
    /// Creates a config with the given slippage tolerance and default everything else.
    pub fn new(slippage_tolerance_bps: u16) -> Result<Self, QuoteError> {
        if slippage_tolerance_bps > BPS_DENOMINATOR {
            return Err(QuoteError::InvalidSlippageTolerance(slippage_tolerance_bps));
        }
        Ok(Self {
            slippage_tolerance_bps,
            ..Self::default()
        })
    }

    #[inline]
    pub fn with_transfer_fee_mode(mut self, mode: TransferFeeMode) -> Self {
        self.transfer_fee_mode = mode;
        self
    }

    #[inline]
    pub fn with_tick_arrays_per_side(mut self, count: u8) -> Self {
        self.tick_arrays_per_side = count;
        self
    }

    /// Slippage tolerance applied to estimated amounts, in basis points. Never above 100%.
    #[inline]
    pub fn slippage_tolerance_bps(&self) -> u16 {
        self.slippage_tolerance_bps
    }

    #[inline]
    pub fn transfer_fee_mode(&self) -> TransferFeeMode {
        self.transfer_fee_mode
    }

    /// Tick arrays loaded on each side of the current one when preparing a swap.
    #[inline]
    pub fn tick_arrays_per_side(&self) -> u8 {
        self.tick_arrays_per_side
    }
}

// deserialized configs go through the same validation as `QuoteConfig::new`
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawQuoteConfig {
    slippage_tolerance_bps: u16,
    transfer_fee_mode: TransferFeeMode,
    tick_arrays_per_side: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<RawQuoteConfig> for QuoteConfig {
    type Error = QuoteError;

    fn try_from(raw: RawQuoteConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.slippage_tolerance_bps)?
            .with_transfer_fee_mode(raw.transfer_fee_mode)
            .with_tick_arrays_per_side(raw.tick_arrays_per_side))
    }
}
