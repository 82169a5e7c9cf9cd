use criterion::{criterion_group, criterion_main, Criterion};
use dterm_core::{PageList, PageListConfig};

fn reflow_widen(c: &mut Criterion) {
    c.bench_function("reflow_widen", |b| {
        b.iter_batched(
            || {
                let mut list = PageList::init(PageListConfig::new(80, 200)).unwrap();
                for _ in 0..200 {
                    list.grow().unwrap();
                }
                list
            },
            |mut list| {
                list.reflow(120, None).unwrap();
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn reflow_narrow(c: &mut Criterion) {
    c.bench_function("reflow_narrow", |b| {
        b.iter_batched(
            || {
                let mut list = PageList::init(PageListConfig::new(120, 200)).unwrap();
                for _ in 0..200 {
                    list.grow().unwrap();
                }
                list
            },
            |mut list| {
                list.reflow(40, None).unwrap();
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, reflow_widen, reflow_narrow);
criterion_main!(benches);
