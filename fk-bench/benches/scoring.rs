use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fk_core::{scoring_indices, score_subset, validate_selection, RollResult};

fn gen_rolls(n: usize) -> Vec<Vec<u8>> {
    // Simple deterministic xorshift64, no rand dependency.
    let mut x: u64 = 0x1234_5678_9ABC_DEF0;
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let len = 1 + k % 6;
        let mut d = Vec::with_capacity(len);
        for _ in 0..len {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            d.push((x % 6) as u8 + 1);
        }
        out.push(d);
    }
    out
}

fn bench_score_subset(c: &mut Criterion) {
    let mut g = c.benchmark_group("fk_core_scoring");
    for &n in &[256usize, 4096usize] {
        let samples = gen_rolls(n);
        g.bench_with_input(BenchmarkId::new("score_subset_batch", n), &samples, |b, s| {
            b.iter(|| {
                for r in s.iter() {
                    black_box(score_subset(black_box(r)));
                }
            })
        });
    }
    g.finish();
}

fn bench_validate_selection(c: &mut Criterion) {
    let rolls: Vec<(RollResult, Vec<usize>)> = gen_rolls(4096)
        .into_iter()
        .map(|r| {
            let picked = scoring_indices(&r);
            (RollResult::new(r), picked)
        })
        .collect();
    c.bench_function("validate_selection_4096", |b| {
        b.iter(|| {
            for (roll, picked) in rolls.iter() {
                let _ = black_box(validate_selection(roll, black_box(picked), &[]));
            }
        })
    });
}

criterion_group!(benches, bench_score_subset, bench_validate_selection);
criterion_main!(benches);
