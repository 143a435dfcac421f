use chart_axis::{Chart, Series, SeriesType};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, black_box};

const DAY: f64 = 86_400_000.0;

fn gen_chart(days: usize) -> Chart {
    let data = (0..days)
        .filter(|d| d % 7 < 5)
        .map(|d| (d as f64 * DAY, Some((d as f64 * 0.05).sin() * 20.0 + 100.0)))
        .collect();
    let mut chart = Chart::new();
    chart.x_axis.set_geometry(0.0, 1_200.0).expect("valid geometry");
    chart.add_series(Series::with_data(SeriesType::Line, data));
    chart
}

fn bench_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw");
    for &days in &[2_000usize, 20_000usize] {
        let chart = gen_chart(days);
        group.bench_with_input(BenchmarkId::from_parameter(format!("cold_d{days}")), &chart, |b, chart| {
            b.iter_batched(
                || chart.clone(),
                |mut ch| { let _ = black_box(ch.redraw()); },
                BatchSize::SmallInput,
            );
        });
        let mut warm = gen_chart(days);
        warm.redraw();
        group.bench_function(BenchmarkId::from_parameter(format!("warm_d{days}")), |b| {
            b.iter(|| black_box(warm.redraw()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_redraw);
criterion_main!(benches);
