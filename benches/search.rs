//! Benchmarks for table construction, the chain search, and expansion.

use std::ops::ControlFlow;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use superchain::expand::materialize;
use superchain::search::{ChainSearch, SearchOptions, SeedScope, SolutionSink};
use superchain::{PermIndex, Tables};

/// Stops the search after a fixed number of steps.
struct StepBudget(u64);

impl SolutionSink for StepBudget {
    fn emit(&mut self, _solution: &[PermIndex]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn should_stop(&mut self) -> bool {
        self.0 = self.0.saturating_sub(1);
        self.0 == 0
    }
}

/// Benchmark building the six-symbol tables from scratch.
fn bench_tables(c: &mut Criterion) {
    c.bench_function("tables_6", |b| b.iter(|| Tables::new(black_box(6))));
}

/// Benchmark the exhaustive five-symbol search over every seed.
fn bench_solve_five(c: &mut Criterion) {
    let tables = Tables::new(5).unwrap();
    let options = SearchOptions {
        seeds: SeedScope::All,
    };

    c.bench_function("solve_5_all_seeds", |b| {
        b.iter(|| ChainSearch::new(black_box(&tables), options.clone()).collect(None))
    });
}

/// Benchmark one million steps of the canonical six-symbol search.
fn bench_steps_six(c: &mut Criterion) {
    let tables = Tables::new(6).unwrap();
    let mut group = c.benchmark_group("six");
    group.sample_size(10);
    group.bench_function("steps_1m", |b| {
        b.iter(|| {
            let mut search = ChainSearch::new(black_box(&tables), SearchOptions::default());
            search.run(&mut StepBudget(1_000_000))
        })
    });
    group.finish();
}

/// Benchmark expanding a six-symbol cover into its superpermutation.
fn bench_expand(c: &mut Criterion) {
    let tables = Tables::new(6).unwrap();
    let cover = [
        118, 595, 597, 591, 568, 354, 716, 334, 338, 445, 210, 580, 372, 481, 553, 364, 370, 240,
        631, 248, 180, 156, 132, 609, 188,
    ];

    c.bench_function("expand_6", |b| {
        b.iter(|| materialize(&tables.universe, black_box(&cover)))
    });
}

criterion_group!(
    benches,
    bench_tables,
    bench_solve_five,
    bench_steps_six,
    bench_expand
);
criterion_main!(benches);
