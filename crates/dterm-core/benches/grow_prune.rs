use criterion::{criterion_group, criterion_main, Criterion};
use dterm_core::{PageList, PageListConfig};

fn grow_under_budget(c: &mut Criterion) {
    c.bench_function("grow_no_prune", |b| {
        b.iter_batched(
            || PageList::init(PageListConfig::new(80, 24)).unwrap(),
            |mut list| {
                for _ in 0..1000 {
                    list.grow().unwrap();
                }
                list
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn grow_with_prune(c: &mut Criterion) {
    c.bench_function("grow_with_prune", |b| {
        b.iter_batched(
            || PageList::init(PageListConfig::new(80, 24).with_max_size(1)).unwrap(),
            |mut list| {
                for _ in 0..2000 {
                    list.grow().unwrap();
                }
                list
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, grow_under_budget, grow_with_prune);
criterion_main!(benches);
