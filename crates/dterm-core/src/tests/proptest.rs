//! Property-based tests over randomized operation sequences (spec §8).

use proptest::prelude::*;

use super::init;
use crate::{PointTag, ScrollTo};

#[derive(Debug, Clone, Copy)]
enum Op {
    Grow,
    EraseRow,
    ScrollDeltaRow(i8),
    ScrollTop,
    ScrollActive,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Grow),
        Just(Op::EraseRow),
        any::<i8>().prop_map(Op::ScrollDeltaRow),
        Just(Op::ScrollTop),
        Just(Op::ScrollActive),
    ]
}

proptest! {
    /// Invariant 2: total rows never drops below the configured active
    /// area, no matter what sequence of grow/erase/scroll runs.
    #[test]
    fn total_rows_always_covers_active_area(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut list = init(20, 10);
        for op in ops {
            match op {
                Op::Grow => { let _ = list.grow(); }
                Op::EraseRow => {
                    let top = list.get_top_left(PointTag::Active);
                    let _ = list.erase_row(top);
                }
                Op::ScrollDeltaRow(n) => { let _ = list.scroll(ScrollTo::DeltaRow(n as i64)); }
                Op::ScrollTop => { let _ = list.scroll(ScrollTo::Top); }
                Op::ScrollActive => { let _ = list.scroll(ScrollTo::Active); }
            }
            prop_assert!(list.total_rows() >= list.rows() as usize);
        }
    }

    /// Invariant 6: `page_size` always equals the sum of live pages'
    /// buffer lengths.
    #[test]
    fn page_size_tracks_live_pages(grows in 0usize..100) {
        let mut list = init(20, 10);
        for _ in 0..grows {
            let _ = list.grow();
        }
        let mut total = 0usize;
        for chunk in list.page_iterator(crate::Direction::RightDown, crate::Pin { node: list.first_node(), y: 0, x: 0 }, None) {
            total += list.page(chunk.node).memory_len();
        }
        prop_assert_eq!(total, list.page_size());
    }

    /// Invariant 9: delta_row(+n) then delta_row(-n) with no intervening
    /// mutation returns the viewport to its prior state.
    #[test]
    fn delta_row_round_trip(n in 1i64..20) {
        let mut list = init(20, 10);
        for _ in 0..30 {
            let _ = list.grow();
        }
        let before = list.viewport_top_left();
        list.scroll(ScrollTo::DeltaRow(-n)).unwrap();
        list.scroll(ScrollTo::DeltaRow(n)).unwrap();
        let after = list.viewport_top_left();
        prop_assert_eq!(before, after);
    }
}
