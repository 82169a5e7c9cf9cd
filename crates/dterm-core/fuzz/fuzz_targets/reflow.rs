#![no_main]

use arbitrary::Arbitrary;
use dterm_core::{PageList, PageListConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    cols: u8,
    rows: u8,
    grow_by: u8,
    new_cols: u8,
    with_cursor: bool,
}

fuzz_target!(|input: Input| {
    let cols = (input.cols as u16).clamp(1, 100);
    let rows = (input.rows as u16).clamp(1, 50);
    let new_cols = (input.new_cols as u16).clamp(1, 100);

    let Ok(mut list) = PageList::init(PageListConfig::new(cols, rows)) else {
        return;
    };
    for _ in 0..(input.grow_by % 100) {
        let _ = list.grow();
    }

    let cursor = if input.with_cursor {
        Some(list.get_top_left(dterm_core::PointTag::Active))
    } else {
        None
    };

    let _ = list.reflow(new_cols, cursor);
    debug_assert!(list.total_rows() >= list.rows() as usize);
    debug_assert_eq!(list.cols(), new_cols);
});
