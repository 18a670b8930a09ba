//! Byte layouts of the persisted records.
//!
//! Every record is borsh encoded (little-endian, packed) behind an 8-byte discriminator. Ticks are
//! only ever stored inside a tick array and carry no discriminator of their own. Decoding rejects
//! a wrong discriminator and any length other than the exact record size.

use crate::error::CodecError;
use crate::pool::tick_array::TICK_ARRAY_SIZE;
use crate::pool::{LimitOrder, Pool, Position, Tick, TickArray};
use alloy_primitives::B256;
use borsh::{BorshDeserialize, BorshSerialize};

pub const POOL_DISCRIMINATOR: [u8; 8] = [254, 204, 207, 98, 25, 181, 29, 67];
pub const TICK_ARRAY_DISCRIMINATOR: [u8; 8] = [69, 97, 189, 190, 110, 7, 66, 187];
pub const LIMIT_ORDER_DISCRIMINATOR: [u8; 8] = [137, 183, 212, 91, 115, 29, 141, 227];
pub const POSITION_DISCRIMINATOR: [u8; 8] = [170, 188, 143, 228, 122, 64, 247, 208];

pub const TICK_LEN: usize = 113;
pub const POOL_LEN: usize = 411;
pub const TICK_ARRAY_LEN: usize = 8 + 4 + TICK_LEN * TICK_ARRAY_SIZE + 32;
pub const LIMIT_ORDER_LEN: usize = 127;
pub const POSITION_LEN: usize = 178;

/// A state value with a persisted, discriminated record layout.
pub trait Record: Sized {
    const NAME: &'static str;
    const DISCRIMINATOR: [u8; 8];
    /// Total encoded size, discriminator included.
    const LEN: usize;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError>;
    fn from_bytes(data: &[u8]) -> Result<Self, CodecError>;
}

fn encode<R: BorshSerialize>(discriminator: [u8; 8], len: usize, body: &R) -> Result<Vec<u8>, CodecError> {
    let mut data = Vec::with_capacity(len);
    data.extend_from_slice(&discriminator);
    body.serialize(&mut data)?;
    debug_assert_eq!(data.len(), len);
    Ok(data)
}

fn decode<R: BorshDeserialize, T: Record>(data: &[u8]) -> Result<R, CodecError> {
    if data.len() != T::LEN {
        return Err(CodecError::InvalidLength {
            expected: T::LEN,
            actual: data.len(),
        });
    }
    if data[..8] != T::DISCRIMINATOR {
        return Err(CodecError::InvalidDiscriminator(T::NAME));
    }
    Ok(borsh::from_slice(&data[8..])?)
}

#[derive(BorshSerialize, BorshDeserialize)]
struct PoolRecord {
    bump: u8,
    version: u16,
    token_mint_a: [u8; 32],
    token_mint_b: [u8; 32],
    token_vault_a: [u8; 32],
    token_vault_b: [u8; 32],
    tick_spacing: u16,
    tick_spacing_seed: [u8; 2],
    fee_rate: u16,
    protocol_fee_rate: u16,
    clp_to_olp_reward_ratio: u16,
    order_protocol_fee_rate: u16,
    liquidity: u128,
    sqrt_price: u128,
    tick_current_index: i32,
    protocol_fee_owed_a: u64,
    protocol_fee_owed_b: u64,
    fee_growth_global_a: u128,
    fee_growth_global_b: u128,
    orders_total_amount_a: u64,
    orders_total_amount_b: u64,
    orders_filled_amount_a: u64,
    orders_filled_amount_b: u64,
    olp_fee_owed_a: u64,
    olp_fee_owed_b: u64,
    reserved: [u8; 128],
}

impl Record for Pool {
    const NAME: &'static str = "Pool";
    const DISCRIMINATOR: [u8; 8] = POOL_DISCRIMINATOR;
    const LEN: usize = POOL_LEN;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let record = PoolRecord {
            bump: self.bump,
            version: self.version,
            token_mint_a: self.token_mint_a.0,
            token_mint_b: self.token_mint_b.0,
            token_vault_a: self.token_vault_a.0,
            token_vault_b: self.token_vault_b.0,
            tick_spacing: self.tick_spacing,
            tick_spacing_seed: self.tick_spacing_seed(),
            fee_rate: self.fee_rate,
            protocol_fee_rate: self.protocol_fee_rate,
            clp_to_olp_reward_ratio: self.clp_to_olp_reward_ratio,
            order_protocol_fee_rate: self.order_protocol_fee_rate,
            liquidity: self.liquidity,
            sqrt_price: self.sqrt_price,
            tick_current_index: self.tick_current_index,
            protocol_fee_owed_a: self.protocol_fee_owed_a,
            protocol_fee_owed_b: self.protocol_fee_owed_b,
            fee_growth_global_a: self.fee_growth_global_a,
            fee_growth_global_b: self.fee_growth_global_b,
            orders_total_amount_a: self.orders_total_amount_a,
            orders_total_amount_b: self.orders_total_amount_b,
            orders_filled_amount_a: self.orders_filled_amount_a,
            orders_filled_amount_b: self.orders_filled_amount_b,
            olp_fee_owed_a: self.olp_fee_owed_a,
            olp_fee_owed_b: self.olp_fee_owed_b,
            reserved: [0; 128],
        };
        encode(Self::DISCRIMINATOR, Self::LEN, &record)
    }

    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let record: PoolRecord = decode::<_, Self>(data)?;
        // The spacing seed is derived from tick_spacing and not kept separately.
        Ok(Self {
            bump: record.bump,
            version: record.version,
            token_mint_a: B256::from(record.token_mint_a),
            token_mint_b: B256::from(record.token_mint_b),
            token_vault_a: B256::from(record.token_vault_a),
            token_vault_b: B256::from(record.token_vault_b),
            tick_spacing: record.tick_spacing,
            fee_rate: record.fee_rate,
            protocol_fee_rate: record.protocol_fee_rate,
            clp_to_olp_reward_ratio: record.clp_to_olp_reward_ratio,
            order_protocol_fee_rate: record.order_protocol_fee_rate,
            liquidity: record.liquidity,
            sqrt_price: record.sqrt_price,
            tick_current_index: record.tick_current_index,
            protocol_fee_owed_a: record.protocol_fee_owed_a,
            protocol_fee_owed_b: record.protocol_fee_owed_b,
            fee_growth_global_a: record.fee_growth_global_a,
            fee_growth_global_b: record.fee_growth_global_b,
            orders_total_amount_a: record.orders_total_amount_a,
            orders_total_amount_b: record.orders_total_amount_b,
            orders_filled_amount_a: record.orders_filled_amount_a,
            orders_filled_amount_b: record.orders_filled_amount_b,
            olp_fee_owed_a: record.olp_fee_owed_a,
            olp_fee_owed_b: record.olp_fee_owed_b,
        })
    }
}

#[derive(Clone, Copy, BorshSerialize, BorshDeserialize)]
struct TickRecord {
    initialized: bool,
    liquidity_net: i128,
    liquidity_gross: u128,
    fee_growth_outside_a: u128,
    fee_growth_outside_b: u128,
    age: u64,
    open_orders_input: u64,
    part_filled_orders_input: u64,
    part_filled_orders_remaining_input: u64,
    fulfilled_a_to_b_orders_input: u64,
    fulfilled_b_to_a_orders_input: u64,
}

impl From<Tick> for TickRecord {
    fn from(tick: Tick) -> Self {
        Self {
            initialized: tick.initialized,
            liquidity_net: tick.liquidity_net,
            liquidity_gross: tick.liquidity_gross,
            fee_growth_outside_a: tick.fee_growth_outside_a,
            fee_growth_outside_b: tick.fee_growth_outside_b,
            age: tick.age,
            open_orders_input: tick.open_orders_input,
            part_filled_orders_input: tick.part_filled_orders_input,
            part_filled_orders_remaining_input: tick.part_filled_orders_remaining_input,
            fulfilled_a_to_b_orders_input: tick.fulfilled_a_to_b_orders_input,
            fulfilled_b_to_a_orders_input: tick.fulfilled_b_to_a_orders_input,
        }
    }
}

impl From<TickRecord> for Tick {
    fn from(record: TickRecord) -> Self {
        Self {
            initialized: record.initialized,
            liquidity_net: record.liquidity_net,
            liquidity_gross: record.liquidity_gross,
            fee_growth_outside_a: record.fee_growth_outside_a,
            fee_growth_outside_b: record.fee_growth_outside_b,
            age: record.age,
            open_orders_input: record.open_orders_input,
            part_filled_orders_input: record.part_filled_orders_input,
            part_filled_orders_remaining_input: record.part_filled_orders_remaining_input,
            fulfilled_a_to_b_orders_input: record.fulfilled_a_to_b_orders_input,
            fulfilled_b_to_a_orders_input: record.fulfilled_b_to_a_orders_input,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct TickArrayRecord {
    start_tick_index: i32,
    ticks: [TickRecord; TICK_ARRAY_SIZE],
    pool: [u8; 32],
}

impl Record for TickArray {
    const NAME: &'static str = "TickArray";
    const DISCRIMINATOR: [u8; 8] = TICK_ARRAY_DISCRIMINATOR;
    const LEN: usize = TICK_ARRAY_LEN;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let record = TickArrayRecord {
            start_tick_index: self.start_tick_index,
            ticks: self.ticks.map(TickRecord::from),
            pool: self.pool.0,
        };
        encode(Self::DISCRIMINATOR, Self::LEN, &record)
    }

    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let record: TickArrayRecord = decode::<_, Self>(data)?;
        Ok(Self {
            start_tick_index: record.start_tick_index,
            ticks: record.ticks.map(Tick::from),
            pool: B256::from(record.pool),
        })
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct LimitOrderRecord {
    version: u16,
    pool: [u8; 32],
    limit_order_mint: [u8; 32],
    tick_index: i32,
    a_to_b: bool,
    age: u64,
    amount: u64,
    reserved: [u8; 32],
}

impl Record for LimitOrder {
    const NAME: &'static str = "LimitOrder";
    const DISCRIMINATOR: [u8; 8] = LIMIT_ORDER_DISCRIMINATOR;
    const LEN: usize = LIMIT_ORDER_LEN;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let record = LimitOrderRecord {
            version: self.version,
            pool: self.pool.0,
            limit_order_mint: self.limit_order_mint.0,
            tick_index: self.tick_index,
            a_to_b: self.a_to_b,
            age: self.age,
            amount: self.amount,
            reserved: [0; 32],
        };
        encode(Self::DISCRIMINATOR, Self::LEN, &record)
    }

    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let record: LimitOrderRecord = decode::<_, Self>(data)?;
        Ok(Self {
            version: record.version,
            pool: B256::from(record.pool),
            limit_order_mint: B256::from(record.limit_order_mint),
            tick_index: record.tick_index,
            a_to_b: record.a_to_b,
            age: record.age,
            amount: record.amount,
        })
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct PositionRecord {
    version: u16,
    pool: [u8; 32],
    position_mint: [u8; 32],
    liquidity: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    fee_growth_checkpoint_a: u128,
    fee_owed_a: u64,
    fee_growth_checkpoint_b: u128,
    fee_owed_b: u64,
    reserved: [u8; 32],
}

impl Record for Position {
    const NAME: &'static str = "Position";
    const DISCRIMINATOR: [u8; 8] = POSITION_DISCRIMINATOR;
    const LEN: usize = POSITION_LEN;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let record = PositionRecord {
            version: self.version,
            pool: self.pool.0,
            position_mint: self.position_mint.0,
            liquidity: self.liquidity,
            tick_lower_index: self.tick_lower_index,
            tick_upper_index: self.tick_upper_index,
            fee_growth_checkpoint_a: self.fee_growth_checkpoint_a,
            fee_owed_a: self.fee_owed_a,
            fee_growth_checkpoint_b: self.fee_growth_checkpoint_b,
            fee_owed_b: self.fee_owed_b,
            reserved: [0; 32],
        };
        encode(Self::DISCRIMINATOR, Self::LEN, &record)
    }

    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let record: PositionRecord = decode::<_, Self>(data)?;
        Ok(Self {
            version: record.version,
            pool: B256::from(record.pool),
            position_mint: B256::from(record.position_mint),
            liquidity: record.liquidity,
            tick_lower_index: record.tick_lower_index,
            tick_upper_index: record.tick_upper_index,
            fee_growth_checkpoint_a: record.fee_growth_checkpoint_a,
            fee_owed_a: record.fee_owed_a,
            fee_growth_checkpoint_b: record.fee_growth_checkpoint_b,
            fee_owed_b: record.fee_owed_b,
        })
    }
}
