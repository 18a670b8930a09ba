//! Token mint metadata the quotes need: decimals and transfer behaviour.
//!
//! Mint capabilities are resolved once by the caller (from whatever account data it loads) and
//! cached in a [`MintRegistry`]; quotes then take the resolved `Option<TransferFee>` per side.

use crate::BPS_DENOMINATOR;
use crate::error::QuoteError;
use crate::hash::FastMap;
use crate::math::token_math::TransferFee;
use crate::pool::Pool;
use alloy_primitives::B256;
use tracing::debug;

/// How a token behaves when it is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenCapability {
    #[default]
    Standard,
    /// The mint withholds a share of every transfer.
    TransferFee(TransferFee),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MintInfo {
    pub decimals: u8,
    pub capability: TokenCapability,
}

impl MintInfo {
    #[inline]
    pub fn standard(decimals: u8) -> Self {
        Self {
            decimals,
            capability: TokenCapability::Standard,
        }
    }

    /// A mint charging `transfer_fee` on transfers. The rate may not exceed 100%.
    pub fn with_transfer_fee(decimals: u8, transfer_fee: TransferFee) -> Result<Self, QuoteError> {
        if transfer_fee.fee_bps > BPS_DENOMINATOR {
            return Err(QuoteError::InvalidTransferFee(transfer_fee.fee_bps));
        }
        Ok(Self {
            decimals,
            capability: TokenCapability::TransferFee(transfer_fee),
        })
    }

    #[inline]
    pub fn transfer_fee(&self) -> Option<TransferFee> {
        match self.capability {
            TokenCapability::Standard => None,
            TokenCapability::TransferFee(fee) => Some(fee),
        }
    }
}

/// Cache of resolved mint metadata keyed by mint identity.
#[derive(Debug, Clone, Default)]
pub struct MintRegistry {
    mints: FastMap<B256, MintInfo>,
}

impl MintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the metadata of `mint`, returning the previous entry.
    pub fn insert(&mut self, mint: B256, info: MintInfo) -> Option<MintInfo> {
        debug!(%mint, decimals = info.decimals, transfer_fee = info.transfer_fee().is_some(), "mint registered");
        self.mints.insert(mint, info)
    }

    #[inline]
    pub fn get(&self, mint: &B256) -> Option<&MintInfo> {
        self.mints.get(mint)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mints.is_empty()
    }

    /// Transfer fee of `mint`; unknown mints are treated as standard tokens.
    #[inline]
    pub fn transfer_fee(&self, mint: &B256) -> Option<TransferFee> {
        self.get(mint).and_then(MintInfo::transfer_fee)
    }

    /// Transfer fees of the pool's `(a, b)` tokens, in the shape the quotes take them.
    pub fn pool_transfer_fees(&self, pool: &Pool) -> (Option<TransferFee>, Option<TransferFee>) {
        (self.transfer_fee(&pool.token_mint_a), self.transfer_fee(&pool.token_mint_b))
    }

    /// Decimals of the pool's `(a, b)` tokens, if both are registered.
    pub fn pool_decimals(&self, pool: &Pool) -> Option<(u8, u8)> {
        Some((self.get(&pool.token_mint_a)?.decimals, self.get(&pool.token_mint_b)?.decimals))
    }
}

impl FromIterator<(B256, MintInfo)> for MintRegistry {
    fn from_iter<I: IntoIterator<Item = (B256, MintInfo)>>(iter: I) -> Self {
        Self {
            mints: iter.into_iter().collect(),
        }
    }
}
