//! Benchmarks for filter parsing and per-row evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use csv_stream_analysis::filter::{FilterExpr, FilterSet};

fn header() -> Vec<String> {
    ["Symbol", "Price", "Volume", "Exchange"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

const EXPRESSIONS: [(&str, &str); 4] = [
    ("single_condition", "Price > 100"),
    ("and_chain", "Price > 100 AND Volume > 1000 AND Exchange = 'NASDAQ'"),
    ("mixed_precedence", "Price > 100 AND Volume > 1000 OR Exchange = 'NYSE'"),
    (
        "nested_parens",
        "((Price > 100 OR Volume > 5000) AND Exchange = 'NASDAQ') OR Symbol = 'MSFT'",
    ),
];

fn bench_parse(c: &mut Criterion) {
    let h = header();
    let mut group = c.benchmark_group("filter_parse");
    for (name, expr) in EXPRESSIONS {
        group.bench_function(name, |b| {
            b.iter(|| {
                let parsed = FilterExpr::parse(black_box(expr), Some(h.as_slice()));
                assert!(parsed.is_ok());
            })
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let h = header();
    let records: Vec<Vec<String>> = (0..1000)
        .map(|i| {
            vec![
                if i % 3 == 0 { "AAPL" } else { "MSFT" }.to_string(),
                format!("{}.50", 50 + (i % 200)),
                format!("{}", 500 + (i % 3000)),
                if i % 2 == 0 { "NASDAQ" } else { "NYSE" }.to_string(),
            ]
        })
        .collect();

    let mut group = c.benchmark_group("filter_evaluate_1k_rows");
    for (name, expr) in EXPRESSIONS {
        let parsed = match FilterExpr::parse(expr, Some(h.as_slice())) {
            Ok(parsed) => parsed,
            Err(err) => panic!("bench expression {expr:?} failed to parse: {err}"),
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut matched = 0usize;
                for record in &records {
                    if parsed.evaluate(black_box(record.as_slice())).is_ok_and(|m| m) {
                        matched += 1;
                    }
                }
                black_box(matched)
            })
        });
    }
    group.finish();
}

fn bench_filter_set_from_list(c: &mut Criterion) {
    let h = header();
    c.bench_function("filter_set_from_exprs", |b| {
        b.iter(|| {
            let fs = FilterSet::from_exprs(
                black_box(&["Price > 100", "Volume > 1000", "Symbol = 'AAPL'"]),
                Some(h.as_slice()),
            );
            assert!(fs.is_ok());
        })
    });
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_filter_set_from_list);
criterion_main!(benches);
