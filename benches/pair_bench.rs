use alloy_primitives::{Address, U256};
use criterion::{Criterion, criterion_group, criterion_main};
use lazy_static::lazy_static;
use pair_exchange::constants::DEFAULT_FACTORY_ADDRESS;
use pair_exchange::logic::{PairKey, default_pair_code_hash, get_amount_in, get_amount_out, sqrt};
use std::hint::black_box;

lazy_static! {
    static ref RESERVE_IN: U256 = U256::from(999_000u64) * U256::from(10).pow(U256::from(18));
    static ref RESERVE_OUT: U256 = U256::from(998_003u64) * U256::from(10).pow(U256::from(18));
}

fn benchmark_amounts(c: &mut Criterion) {
    let amount = U256::from(1_000u64) * U256::from(10).pow(U256::from(18));
    c.bench_function("get_amount_out", |b| b.iter(|| get_amount_out(black_box(amount), *RESERVE_IN, *RESERVE_OUT)));
    c.bench_function("get_amount_in", |b| b.iter(|| get_amount_in(black_box(amount), *RESERVE_IN, *RESERVE_OUT)));
    c.bench_function("sqrt", |b| b.iter(|| sqrt(black_box(*RESERVE_IN * *RESERVE_OUT))));
}

fn benchmark_pair_address(c: &mut Criterion) {
    let code_hash = default_pair_code_hash();
    c.bench_function("pair_address", |b| {
        b.iter(|| {
            let key = PairKey::new(black_box(Address::repeat_byte(0x22)), Address::repeat_byte(0x11)).unwrap();
            key.pair_address(DEFAULT_FACTORY_ADDRESS, code_hash)
        })
    });
}

criterion_group!(benches, benchmark_amounts, benchmark_pair_address);
criterion_main!(benches);
