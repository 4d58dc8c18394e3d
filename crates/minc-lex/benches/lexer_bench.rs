//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package minc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use minc_lex::lex_string;

fn lexer_token_count(source: &str) -> usize {
    lex_string(source, "bench.c").expect("benchmark source lexes").len()
}

fn bench_lexer_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let declaration = "int a = 50 + 10 * 20;";
    group.throughput(Throughput::Bytes(declaration.len() as u64));
    group.bench_function("declaration", |b| b.iter(|| lexer_token_count(black_box(declaration))));

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    let source = r#"
        struct point {
            int x;
            int y;
        };

        int manhattan(int x1, int y1, int x2, int y2) {
            int dx = x1 - x2;
            int dy = y1 - y2;
            if (dx < 0) { dx = 0 - dx; }
            if (dy < 0) { dy = 0 - dy; }
            return dx + dy;
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("struct_and_function", |b| b.iter(|| lexer_token_count(black_box(source))));

    group.finish();
}

criterion_group!(benches, bench_lexer_simple, bench_lexer_complex);
criterion_main!(benches);
