use chart_axis::ordinal::{self, OrdinalOptions};
use chart_axis::AxisExtremes;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, black_box};

const DAY: f64 = 86_400_000.0;

fn gen_weekdays(n: usize) -> Vec<f64> {
    (0..n * 7 / 5 + 7).filter(|d| d % 7 < 5).take(n).map(|d| d as f64 * DAY).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordinal_build");
    for &n in &[10_000usize, 100_000usize] {
        let xs = gen_weekdays(n);
        let ext = AxisExtremes::from_data(xs[0], xs[xs.len() - 1]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &xs, |b, xs| {
            b.iter(|| black_box(ordinal::build(xs, &ext, &OrdinalOptions::default())));
        });
    }
    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordinal_to_linear");
    for &n in &[10_000usize, 100_000usize] {
        let xs = gen_weekdays(n);
        let ext = AxisExtremes::from_data(xs[0], xs[xs.len() - 1]);
        let table = ordinal::build(&xs, &ext, &OrdinalOptions::default());
        let probes: Vec<f64> = (0..1_000).map(|i| xs[0] + i as f64 * (ext.max - ext.min) / 1_000.0).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &probes, |b, probes| {
            b.iter(|| {
                let mut acc = 0.0;
                for &v in probes {
                    acc += table.from_linear(table.to_linear(v));
                }
                black_box(acc)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_translate);
criterion_main!(benches);
