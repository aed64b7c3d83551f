//! Benchmarks for the settlement hot path.
//!
//! Every ledger operation settles before it mutates, so `accrued_balance`
//! runs at least once per mint/burn/transfer. It should stay in the
//! low-nanosecond range — it's four u128 operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meridian_ledger::accrual::accrued_balance;
use meridian_ledger::{AccountId, Ledger, Rate};

const RATE: Rate = 50_000_000_000;

fn bench_accrued_balance(c: &mut Criterion) {
    c.bench_function("accrued_balance", |b| {
        b.iter(|| {
            accrued_balance(black_box(100_000), black_box(RATE), black_box(3_600)).unwrap()
        })
    });
}

fn bench_transfer_settles_both_sides(c: &mut Criterion) {
    c.bench_function("transfer_with_settlement", |b| {
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice, 1_000_000_000, 0).unwrap();
        ledger.mint(&bob, 1_000_000_000, 0).unwrap();

        let mut now = 0u64;
        b.iter(|| {
            now += 1;
            ledger.transfer(&alice, &bob, black_box(1), now).unwrap();
            ledger.transfer(&bob, &alice, black_box(1), now).unwrap();
        })
    });
}

criterion_group!(benches, bench_accrued_balance, bench_transfer_settles_both_sides);
criterion_main!(benches);
