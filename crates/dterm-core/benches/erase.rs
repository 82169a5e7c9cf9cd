use criterion::{criterion_group, criterion_main, Criterion};
use dterm_core::{PageList, PageListConfig};

fn erase_row(c: &mut Criterion) {
    c.bench_function("erase_row", |b| {
        b.iter_batched(
            || {
                let mut list = PageList::init(PageListConfig::new(80, 200)).unwrap();
                for _ in 0..200 {
                    list.grow().unwrap();
                }
                list
            },
            |mut list| {
                let top = list.get_top_left(dterm_core::PointTag::Active);
                list.erase_row(top).unwrap();
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn erase_rows_region(c: &mut Criterion) {
    c.bench_function("erase_rows_region", |b| {
        b.iter_batched(
            || {
                let mut list = PageList::init(PageListConfig::new(80, 500)).unwrap();
                for _ in 0..500 {
                    list.grow().unwrap();
                }
                list
            },
            |mut list| {
                let top = list.get_top_left(dterm_core::PointTag::Active);
                list.erase_rows(top, None).unwrap();
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, erase_row, erase_rows_region);
criterion_main!(benches);
