use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lisplet::{Environment, evaluate, parse_str, run, validate};

// A representative input exercising every operator family
const BENCH_INPUT: &str = "(if (> 2 3) (* 5 6) (let ((a 3) (c 5)) (quote (a b c))))";

fn nested_addition(depth: usize) -> String {
    let mut text = String::from("1");
    for _ in 0..depth {
        text = format!("(+ 1 {})", text);
    }
    text
}

fn bench_validate(c: &mut Criterion) {
    c.bench_function("validate", |b| b.iter(|| validate(black_box(BENCH_INPUT))));
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| {
        b.iter(|| {
            let env = Environment::new();
            parse_str(black_box(BENCH_INPUT), &env)
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let env = Environment::new();
    let node = parse_str(BENCH_INPUT, &env).expect("bench input parses");
    c.bench_function("evaluate", |b| b.iter(|| evaluate(black_box(&node))));
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for depth in [8usize, 64, 256] {
        let input = nested_addition(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &input, |b, input| {
            b.iter(|| run(black_box(input)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_validate,
    bench_parse,
    bench_evaluate,
    bench_pipeline
);
criterion_main!(benches);
