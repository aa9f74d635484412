//! Benchmarks for candlestick signal analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use candle_signals::prelude::*;

/// Generate realistic bars from a deterministic walk
fn generate_bars(n: usize) -> Vec<Bar> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0;
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    bars.push(Bar::new(o, h, l, c).with_volume(1000.0).with_timestamp(i as i64 * 60_000));
    price = c;
  }

  bars
}

fn bench_evaluate(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let analyzer = SignalAnalyzer::new();

  c.bench_function("evaluate_latest_window", |b| {
    b.iter(|| {
      let _ = black_box(analyzer.evaluate(black_box(&bars)));
    })
  });
}

fn bench_single_rule(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let analyzer =
    AnalyzerBuilder::new().add(BuiltinRule::Doji(DojiRule::with_defaults())).build().unwrap();

  c.bench_function("scan_doji_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(analyzer.scan(black_box(&bars)));
    })
  });
}

fn bench_all_rules(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let analyzer = SignalAnalyzer::new();

  c.bench_function("scan_all_rules_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(analyzer.scan(black_box(&bars)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let analyzer = SignalAnalyzer::new();

  let mut group = c.benchmark_group("scaling");

  for size in [100, 500, 1000, 5000, 10000].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(analyzer.scan(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_parallel(c: &mut Criterion) {
  let series: Vec<Vec<Bar>> = (0..4).map(|i| generate_bars(1000 + i * 10)).collect();
  let pairs = ["SYM1", "SYM2", "SYM3", "SYM4"];

  let analyzer = SignalAnalyzer::new();

  let instruments: Vec<(&str, &[Bar])> =
    pairs.iter().zip(&series).map(|(p, bars)| (*p, bars.as_slice())).collect();

  c.bench_function("analyze_parallel_4_instruments", |b| {
    b.iter(|| {
      let _ = black_box(analyze_parallel(black_box(&analyzer), black_box(instruments.clone())));
    })
  });
}

fn bench_analyze_with_history(c: &mut Criterion) {
  let bars = generate_bars(1000);

  c.bench_function("analyze_rolling_1000_bars", |b| {
    b.iter(|| {
      let mut analyzer = SignalAnalyzer::new();
      for i in 1..=bars.len() {
        analyzer.analyze(black_box(&bars[..i]));
      }
      black_box(analyzer.history().len())
    })
  });
}

criterion_group!(
  benches,
  bench_evaluate,
  bench_single_rule,
  bench_all_rules,
  bench_scaling,
  bench_parallel,
  bench_analyze_with_history,
);

criterion_main!(benches);
