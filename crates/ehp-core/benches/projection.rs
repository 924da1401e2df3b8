use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ehp_core::{
    Category, Dataset, Differential, Generator, Truncation, ViewParameters, infer_differentials,
    project,
};

/// Rows of classes with a d1 and a τ-twisted d2 out of every other class.
fn build_dataset(stems: i32, rows: i32) -> Dataset {
    let mut generators = Vec::new();
    let mut differentials = Vec::new();

    for x in 0..stems {
        for y in 1..=rows {
            generators.push(Generator::new(format!("{x}[{y}]"), x, y, (x + y) % 7));
        }
    }
    for x in 1..stems {
        for y in 3..=rows {
            if (x + y) % 2 == 0 {
                differentials.push(Differential::new(
                    format!("{x}[{y}]"),
                    format!("{}[{}]", x - 1, y - 1),
                    0,
                    1,
                ));
            } else {
                differentials.push(Differential::new(
                    format!("{x}[{y}]"),
                    format!("{}[{}]", x - 1, y - 2),
                    (x % 3) + 1,
                    2,
                ));
            }
        }
    }

    Dataset::from_parts(generators, differentials)
}

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    for stems in [10, 35, 70] {
        let data = build_dataset(stems, 20);
        for category in Category::ALL {
            group.bench_with_input(
                BenchmarkId::new(category.as_str(), stems),
                &data,
                |b, data| {
                    let view = ViewParameters::limit(category);
                    b.iter(|| project(black_box(data), black_box(&view)))
                },
            );
        }
    }
    group.finish();
}

fn bench_infer(c: &mut Criterion) {
    let data = build_dataset(35, 20);
    c.bench_function("infer_differentials", |b| {
        b.iter(|| infer_differentials(black_box(&data), Truncation::default()))
    });
}

criterion_group!(benches, bench_project, bench_infer);
criterion_main!(benches);
