#![allow(dead_code)]

use std::hint::black_box;

use alloy_primitives::{B256, U256};
use clmm_orderbook_math::{
    Pool, QuoteConfig, Tick, TickArray,
    math::{
        math_helpers::{mul_div, mul_div_rounding_up},
        swap_math::compute_swap_step,
        tick_math::{MAX_SQRT_PRICE, MIN_SQRT_PRICE, sqrt_price_to_tick_index, tick_index_to_sqrt_price},
        token_math::{try_get_amount_delta_a, try_get_amount_delta_b},
    },
    pool::{FeeRates, swap::swap_quote_by_input_token},
};
use criterion::Criterion;

pub const ONE: u128 = 1 << 64;
pub const POOL_ADDRESS: B256 = B256::with_last_byte(9);
pub const TICK_SPACING: u16 = 2;

pub fn pool(fee_rates: FeeRates, liquidity: u128) -> Pool {
    let mut pool = Pool::new(B256::with_last_byte(1), B256::with_last_byte(2), TICK_SPACING, fee_rates, ONE)
        .expect("valid pool");
    pool.liquidity = liquidity;
    pool
}

pub fn tick_arrays(tick: impl Fn(i32) -> Tick) -> Vec<TickArray> {
    [0, 176, 352, -176, -352]
        .into_iter()
        .map(|start| {
            let mut array = TickArray::new(POOL_ADDRESS, start, TICK_SPACING).expect("aligned start");
            array.ticks = [tick(start); 88];
            array
        })
        .collect()
}

pub fn amm_tick_arrays() -> Vec<TickArray> {
    tick_arrays(|start| Tick {
        initialized: true,
        liquidity_net: if start < 0 { 1_000 } else { -1_000 },
        liquidity_gross: 1_000,
        ..Tick::default()
    })
}

pub fn order_book_tick_arrays() -> Vec<TickArray> {
    tick_arrays(|_| Tick {
        initialized: true,
        age: 1,
        part_filled_orders_input: 10_000,
        part_filled_orders_remaining_input: 10_000,
        ..Tick::default()
    })
}

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");

    group.bench_function("tick_index_to_sqrt_price", |b| {
        b.iter(|| {
            for tick in [-443_636, -50_000, -1, 0, 1, 50_000, 443_636] {
                black_box(tick_index_to_sqrt_price(black_box(tick)).unwrap());
            }
        })
    });

    group.bench_function("sqrt_price_to_tick_index", |b| {
        b.iter(|| {
            for sqrt_price in [MIN_SQRT_PRICE, ONE >> 7, ONE, ONE << 7, MAX_SQRT_PRICE] {
                black_box(sqrt_price_to_tick_index(black_box(sqrt_price)).unwrap());
            }
        })
    });

    group.finish();
}

pub fn bench_token_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_math");
    let lower = tick_index_to_sqrt_price(-1_000).unwrap();
    let upper = tick_index_to_sqrt_price(1_000).unwrap();

    group.bench_function("amount_delta_a", |b| {
        b.iter(|| try_get_amount_delta_a(black_box(lower), black_box(upper), black_box(1_000_000_000), true))
    });
    group.bench_function("amount_delta_b", |b| {
        b.iter(|| try_get_amount_delta_b(black_box(lower), black_box(upper), black_box(1_000_000_000), true))
    });

    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_math");
    let target = tick_index_to_sqrt_price(-64).unwrap();

    group.bench_function("compute_swap_step exact in", |b| {
        b.iter(|| {
            compute_swap_step(
                black_box(1_000_000),
                black_box(3000),
                black_box(1_000_000_000),
                black_box(ONE),
                black_box(target),
                true,
                true,
            )
        })
    });
    group.bench_function("compute_swap_step exact out", |b| {
        b.iter(|| {
            compute_swap_step(
                black_box(1_000_000),
                black_box(3000),
                black_box(1_000_000_000),
                black_box(ONE),
                black_box(target),
                true,
                false,
            )
        })
    });

    group.finish();
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let mut group = c.benchmark_group("math_helpers");
    let a = U256::from(u128::MAX);
    let b = U256::from(1_000_000_007u64);
    let denominator = U256::from(u64::MAX);

    group.bench_function("mul_div", |bench| {
        bench.iter(|| mul_div(black_box(a), black_box(b), black_box(denominator)))
    });
    group.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| mul_div_rounding_up(black_box(a), black_box(b), black_box(denominator)))
    });

    group.finish();
}

pub fn bench_swap_quotes(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_quote");
    let config = QuoteConfig::default();

    let amm_pool = pool(FeeRates::new(3000), 100_000_000);
    let amm_arrays = amm_tick_arrays();
    group.bench_function("amm exact in", |b| {
        b.iter(|| {
            swap_quote_by_input_token(black_box(3_000), true, &config, &amm_pool, &amm_arrays, None, None)
        })
    });

    let order_book_pool = pool(
        FeeRates::new(10_000)
            .with_protocol_fee_rate(1_000)
            .with_order_protocol_fee_rate(10_000),
        0,
    );
    let order_book_arrays = order_book_tick_arrays();
    group.bench_function("order book exact in", |b| {
        b.iter(|| {
            swap_quote_by_input_token(black_box(50_000), false, &config, &order_book_pool, &order_book_arrays, None, None)
        })
    });

    group.finish();
}
