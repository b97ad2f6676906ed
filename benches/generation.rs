use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use doekit::design::{
    box_behnken, central_composite, full_factorial, plackett_burman, simplex_lattice, Alpha,
};
use doekit::DesignBuilder;

fn bench_full_factorial(c: &mut Criterion) {
    let mut group = c.benchmark_group("FullFactorial");

    for k in [3, 5, 7] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            let levels = vec![3u32; k];
            b.iter(|| full_factorial(&levels).unwrap());
        });
    }
    group.finish();
}

fn bench_plackett_burman(c: &mut Criterion) {
    let mut group = c.benchmark_group("PlackettBurman");

    // Sylvester (16), Paley I (20, 44), Paley II (36)
    for factors in [15, 19, 35, 43] {
        group.bench_with_input(BenchmarkId::from_parameter(factors), &factors, |b, &f| {
            b.iter(|| plackett_burman(f).unwrap());
        });
    }
    group.finish();
}

fn bench_response_surface(c: &mut Criterion) {
    let mut group = c.benchmark_group("ResponseSurface");

    for n in [3, 5, 7] {
        group.bench_with_input(BenchmarkId::new("BoxBehnken", n), &n, |b, &n| {
            b.iter(|| box_behnken(n, 3).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("CCD", n), &n, |b, &n| {
            b.iter(|| central_composite(n, (4, 4), Alpha::Orthogonal).unwrap());
        });
    }
    group.finish();
}

fn bench_mixture(c: &mut Criterion) {
    let mut group = c.benchmark_group("SimplexLattice");

    for (q, m) in [(3, 4), (5, 4), (6, 6)] {
        let id = format!("{{{q},{m}}}");
        group.bench_function(id, |b| b.iter(|| simplex_lattice(q, m, &[]).unwrap()));
    }
    group.finish();
}

fn bench_builder_postprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("Builder_Postprocess");

    group.bench_function("3^5_randomized_x3", |b| {
        b.iter(|| {
            DesignBuilder::new()
                .full_factorial(vec![3; 5])
                .randomize(Some(42))
                .replicates(3)
                .build()
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_full_factorial,
    bench_plackett_burman,
    bench_response_surface,
    bench_mixture,
    bench_builder_postprocess
);
criterion_main!(benches);
