#![no_main]

use arbitrary::Arbitrary;
use dterm_core::{PageList, PageListConfig, ScrollTo};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Grow,
    EraseRow,
    EraseRowBounded(u16),
    ScrollDeltaRow(i8),
    ScrollTop,
    ScrollActive,
    ScrollClear,
    TrackAndUntrackActiveTopLeft,
}

#[derive(Debug, Arbitrary)]
struct Input {
    cols: u8,
    rows: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let cols = (input.cols as u16).clamp(1, 200);
    let rows = (input.rows as u16).clamp(1, 100);
    let Ok(mut list) = PageList::init(PageListConfig::new(cols, rows)) else {
        return;
    };

    for op in input.ops.into_iter().take(500) {
        match op {
            Op::Grow => {
                let _ = list.grow();
            }
            Op::EraseRow => {
                let top = list.get_top_left(dterm_core::PointTag::Active);
                let _ = list.erase_row(top);
            }
            Op::EraseRowBounded(limit) => {
                let top = list.get_top_left(dterm_core::PointTag::Active);
                let _ = list.erase_row_bounded(top, limit % 32);
            }
            Op::ScrollDeltaRow(n) => {
                let _ = list.scroll(ScrollTo::DeltaRow(n as i64));
            }
            Op::ScrollTop => {
                let _ = list.scroll(ScrollTo::Top);
            }
            Op::ScrollActive => {
                let _ = list.scroll(ScrollTo::Active);
            }
            Op::ScrollClear => {
                let _ = list.scroll_clear();
            }
            Op::TrackAndUntrackActiveTopLeft => {
                let top = list.get_top_left(dterm_core::PointTag::Active);
                let id = list.track_pin(top);
                list.untrack_pin(id);
            }
        }
        debug_assert!(list.total_rows() >= list.rows() as usize);
    }
});
