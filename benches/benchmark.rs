use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rift::Parser;

fn program(rifts: usize) -> String {
    (0..rifts)
        .map(|i| {
            format!(
                "r{i} => {{\n  a = [1, 2.5, \"s\\n\", {{k: true}}]\n  f = (x, y) -> x * y + {i}\n  f(a, r{i}:b)\n  if a {{ b = 1 }} else {{ b = 2 }}\n}}\n"
            )
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let parser = Parser::default();
    let source = program(200);
    c.bench_function("parse 200 rifts", |b| {
        b.iter(|| parser.parse(black_box(&source)))
    });
    c.bench_function("recognize 200 rifts", |b| {
        b.iter(|| parser.recognize(black_box(&source)))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
