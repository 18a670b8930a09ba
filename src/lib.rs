//! Concentrated-liquidity AMM math with tick-resident limit orders, in pure Rust.
//!
//! This crate exposes:
//! - Low-level fixed-point primitives (`math::*`) for ticks, Q64.64 prices, token deltas and fees.
//! - Pool state (`pool::*`): ticks and tick arrays, positions, limit orders, liquidity quotes and
//!   the swap engine that walks ticks and fills resting orders.
//! - Bit-exact record layouts (`codec`) for whatever persists the state.
//!
//! Every entry point is a pure function over an explicit snapshot. Quotes borrow their inputs,
//! state-producing operations return the new pool/tick/position/order values to the caller.
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use clmm_orderbook_math::math::tick_math::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};
//!
//! let sqrt_price = tick_index_to_sqrt_price(0).unwrap();
//! assert_eq!(sqrt_price, 1u128 << 64);
//! assert_eq!(sqrt_price_to_tick_index(sqrt_price).unwrap(), 0);
//! ```
//!
//! ## Quoting a swap against loaded tick arrays
//! ```no_run
//! use clmm_orderbook_math::{
//!     pool::{swap::swap_quote_by_input_token, FeeRates, Pool, TickArray},
//!     QuoteConfig, B256,
//! };
//!
//! # let (mint_a, mint_b) = (B256::with_last_byte(1), B256::with_last_byte(2));
//! let mut pool = Pool::new(mint_a, mint_b, 2, FeeRates::new(3000), 1u128 << 64).unwrap();
//! pool.liquidity = 100_000_000;
//!
//! let pool_address = B256::with_last_byte(9);
//! let tick_arrays: Vec<TickArray> = [-176, 0]
//!     .into_iter()
//!     .map(|start| TickArray::new(pool_address, start, pool.tick_spacing).unwrap())
//!     .collect();
//!
//! let config = QuoteConfig::new(100).unwrap(); // 1% slippage
//! let quote = swap_quote_by_input_token(1_000, true, &config, &pool, &tick_arrays, None, None).unwrap();
//! println!("out: {} (min {}), fee {}", quote.token_est_out, quote.token_min_out, quote.trade_fee);
//! ```

pub use alloy_primitives::{B256, U256};

pub mod codec;
pub mod config;
pub mod error;
mod hash;
pub mod math;
pub mod mint;
pub mod pool;

pub use config::QuoteConfig;
pub use error::Error;
pub use hash::FastMap;
pub use pool::{LimitOrder, Pool, Position, Tick, TickArray};

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
const U64_MAX: U256 = U256::from_limbs([u64::MAX, 0, 0, 0]);
const U128_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);

pub const RESOLUTION: u8 = 64;
pub const Q64: U256 = U256::from_limbs([0, 1, 0, 0]);

/// Denominator of `fee_rate` (hundredths of a basis point).
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;
/// Denominator of every basis-point quantity: slippage, transfer fees, protocol rates.
pub const BPS_DENOMINATOR: u16 = 10_000;

pub const MAX_FEE_RATE: u16 = 60_000;
pub const MAX_PROTOCOL_FEE_RATE: u16 = 2_500;
pub const MAX_ORDER_PROTOCOL_FEE_RATE: u16 = 10_000;
pub const MAX_CLP_REWARD_RATE: u16 = 10_000;
