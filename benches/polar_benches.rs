use RustedPolar::polar::expression_builder::IntegralForm;
use RustedPolar::polar::pipeline::{ComputeOptions, compute};
use RustedPolar::polar::session::Example;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_circle(c: &mut Criterion) {
    let form = IntegralForm::circle_example();
    let options = ComputeOptions::default();
    c.bench_function("circle, symbolic", |b| {
        b.iter(|| compute(black_box(&form), &options))
    });
}

fn bench_gaussian(c: &mut Criterion) {
    let form = Example::GaussianBell.form();
    let options = ComputeOptions::default();
    c.bench_function("gaussian bell, quadrature fallback", |b| {
        b.iter(|| compute(black_box(&form), &options))
    });
}

criterion_group!(benches, bench_circle, bench_gaussian);
criterion_main!(benches);
