use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nfl_probability::league_rates::league_conversion_rates;
use nfl_probability::output::OutputDocument;
use nfl_probability::pipeline::{Execution, compute_rate_sets};
use nfl_probability::play::PlayTable;
use nfl_probability::player_rates::player_success_rates;
use nfl_probability::synthetic_pbp::synthetic_table;

const SEASON_ROWS: usize = 45_000;

fn season() -> PlayTable {
    synthetic_table(2024, 42, SEASON_ROWS)
}

fn bench_league_rates(c: &mut Criterion) {
    let table = season();
    c.bench_function("league_rates", |b| {
        b.iter(|| {
            let rates = league_conversion_rates(black_box(&table.plays));
            black_box(rates.len());
        })
    });
}

fn bench_player_rates(c: &mut Criterion) {
    let table = season();
    c.bench_function("player_rates", |b| {
        b.iter(|| {
            let rates = player_success_rates(black_box(&table));
            black_box(rates.len());
        })
    });
}

fn bench_rate_sets(c: &mut Criterion) {
    let table = season();
    c.bench_function("rate_sets_sequential", |b| {
        b.iter(|| black_box(compute_rate_sets(black_box(&table), Execution::Sequential)))
    });
    c.bench_function("rate_sets_parallel", |b| {
        b.iter(|| black_box(compute_rate_sets(black_box(&table), Execution::Parallel)))
    });
}

fn bench_document_render(c: &mut Criterion) {
    let table = season();
    let rates = compute_rate_sets(&table, Execution::Parallel);
    let doc = OutputDocument::assemble(2024, &table, rates, "2024-11-03T18:00:00+00:00");
    c.bench_function("document_render", |b| {
        b.iter(|| {
            let json = black_box(&doc).to_json().expect("render");
            black_box(json.len());
        })
    });
}

criterion_group!(
    perf,
    bench_league_rates,
    bench_player_rates,
    bench_rate_sets,
    bench_document_render
);
criterion_main!(perf);
