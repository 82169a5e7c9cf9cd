//! Literal end-to-end scenarios from the design notes (S1-S7).

use super::{init, poke, read};
use crate::{Point, PointTag};

#[test]
fn s1_grow_fits_in_capacity() {
    let mut list = init(80, 24);
    let before = list.page_size();
    let created = list.grow().unwrap();
    assert!(created.is_none());
    assert_eq!(list.total_rows(), 25);
    assert_eq!(list.page_size(), before);
}

#[test]
fn s2_prune_on_budget() {
    let mut list = crate::PageList::init(crate::PageListConfig::new(80, 24).with_max_size(0)).unwrap();
    let page1 = list.first_node();
    let id = list.track_pin(crate::Pin { node: page1, y: 0, x: 0 });

    // Grow until the tail page fills and a second page is allocated.
    loop {
        if list.grow().unwrap().is_some() {
            break;
        }
    }
    // Grow until the second page fills; the next grow must prune page1
    // (recycle it as the new tail) instead of allocating a third page.
    loop {
        let before = list.page_size();
        if let Some(_new_tail) = list.grow().unwrap() {
            assert_eq!(list.page_size(), before, "prune recycles a buffer, it doesn't allocate");
            break;
        }
    }

    let new_first = list.first_node();
    assert_ne!(new_first, page1);
    let pv = list.pin_value(id);
    assert_eq!(pv.node, new_first);
    assert_eq!(pv.y, 0);
    assert_eq!(pv.x, 0);
}

#[test]
fn s3_erase_rows_shifts_pins() {
    let mut list = init(80, 24);
    let target = list.pin(Point { tag: PointTag::Active, y: 4, x: 2 }).unwrap();
    let id = list.track_pin(target);
    let tl = list.get_top_left(PointTag::Active);
    let bl = list.pin(Point { tag: PointTag::Active, y: 3, x: 0 }).unwrap();

    list.erase_rows(tl, Some(bl)).unwrap();

    let pv = list.pin_value(id);
    assert_eq!(pv.node, list.first_node());
    assert_eq!(pv.y, 0);
    assert_eq!(pv.x, 2);
    assert_eq!(list.total_rows(), 24);
}

#[test]
fn s4_reflow_more_cols_unwraps() {
    let mut list = init(2, 4);
    let node = list.first_node();
    for y in 0..4u16 {
        poke(&mut list, crate::Pin { node, y, x: 0 }, 'A');
    }
    list.page_mut(node).row_mut(0).set_wrap(true);
    list.page_mut(node).row_mut(1).set_wrap_continuation(true);
    list.page_mut(node).row_mut(2).set_wrap(true);
    list.page_mut(node).row_mut(3).set_wrap_continuation(true);

    list.reflow(4, None).unwrap();

    assert_eq!(list.cols(), 4);
    assert_eq!(list.total_rows(), 4);
    let dst = list.first_node();
    assert_eq!(read(&list, crate::Pin { node: dst, y: 0, x: 0 }), 'A');
    assert_eq!(read(&list, crate::Pin { node: dst, y: 0, x: 2 }), 'A');
    assert!(!list.page(dst).row(0).wrap());
}

#[test]
fn s5_reflow_fewer_cols_wraps() {
    let mut list = init(4, 2);
    let node = list.first_node();
    for y in 0..2u16 {
        for (x, ch) in ['0', '1', '2', '3'].into_iter().enumerate() {
            poke(&mut list, crate::Pin { node, y, x: x as u16 }, ch);
        }
    }

    list.reflow(2, None).unwrap();

    assert_eq!(list.total_rows(), 4);
    let dst = list.first_node();
    let expect = [
        (0, ['0', '1'], true),
        (1, ['2', '3'], false),
        (2, ['0', '1'], true),
        (3, ['2', '3'], false),
    ];
    for (y, chars, wrap) in expect {
        assert_eq!(read(&list, crate::Pin { node: dst, y, x: 0 }), chars[0]);
        assert_eq!(read(&list, crate::Pin { node: dst, y, x: 1 }), chars[1]);
        assert_eq!(list.page(dst).row(y).wrap(), wrap);
    }
}

#[test]
fn s6_reflow_preserves_cursor_row() {
    let mut list = init(5, 5);
    let node = list.first_node();
    for y in 0..5u16 {
        for x in 0..5u16 {
            poke(&mut list, crate::Pin { node, y, x }, 'x');
        }
    }
    for _ in 0..5 {
        list.grow().unwrap();
    }

    let cursor_pt = list.pin(Point { tag: PointTag::Active, y: 1, x: 1 }).unwrap();
    let cursor_id = list.track_pin(cursor_pt);

    let cursor_value = list.pin_value(cursor_id);
    list.reflow(4, Some(cursor_value)).unwrap();

    let expect = list.pin(Point { tag: PointTag::Active, y: 0, x: 0 }).unwrap();
    let actual = list.pin_value(cursor_id);
    assert_eq!(actual.node, expect.node);
    assert_eq!(actual.y, expect.y);
}

/// `scrollClear` pushes exactly one row per non-blank row strictly above
/// the bottom row of the active area; the bottom row itself is always
/// kept visible.
#[test]
fn s7_scroll_clear_promotes_non_blank_rows_above_bottom() {
    let mut list = init(80, 24);
    let node = list.first_node();
    poke(&mut list, crate::Pin { node, y: 0, x: 0 }, 'A');
    poke(&mut list, crate::Pin { node, y: 0, x: 1 }, 'A');

    let before = list.total_rows();
    list.scroll_clear().unwrap();
    let grows = list.total_rows() - before;

    assert_eq!(grows, 1, "exactly one non-blank row sits above the bottom row");
    assert_eq!(list.total_rows(), 24 + grows);
}
