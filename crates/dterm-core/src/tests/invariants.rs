//! Invariants that must hold after arbitrary sequences of mutations
//! (spec §8, quantified invariants 1-6, 8).

use super::init;
use crate::{Direction, Point, PointTag};

#[test]
fn page_size_matches_sum_of_pages() {
    let mut list = init(80, 24);
    for _ in 0..50 {
        list.grow().unwrap();
    }
    let mut total = 0usize;
    let mut seen = std::collections::HashSet::new();
    for chunk in list.page_iterator(crate::Direction::RightDown, crate::Pin { node: list.first_node(), y: 0, x: 0 }, None) {
        if seen.insert(format!("{:?}", chunk.node)) {
            total += list.page(chunk.node).memory_len();
        }
    }
    assert_eq!(total, list.page_size());
}

#[test]
fn total_rows_never_drops_below_active_area() {
    let mut list = init(80, 24);
    for _ in 0..300 {
        list.grow().unwrap();
        assert!(list.total_rows() >= list.rows() as usize);
    }
    let top = list.get_top_left(PointTag::Active);
    list.erase_row(top).unwrap();
    assert!(list.total_rows() >= list.rows() as usize);
}

#[test]
fn reset_is_idempotent() {
    let mut list = init(80, 24);
    for _ in 0..10 {
        list.grow().unwrap();
    }
    list.reset().unwrap();
    let after_one = list.total_rows();
    let pin_after_one = list.pin_value(list.viewport_pin_id());

    list.reset().unwrap();
    let after_two = list.total_rows();
    let pin_after_two = list.pin_value(list.viewport_pin_id());

    assert_eq!(after_one, after_two);
    assert_eq!(pin_after_one, pin_after_two);
    assert_eq!(pin_after_two.node, list.first_node());
    assert_eq!(pin_after_two.y, 0);
    assert_eq!(pin_after_two.x, 0);
}

#[test]
fn pin_on_fully_erased_page_collapses_to_top_left() {
    let mut list = init(80, 24);
    let pt = list.pin(Point { tag: PointTag::Active, y: 5, x: 10 }).unwrap();
    let id = list.track_pin(pt);

    // Erase the whole list (single page at this size) through erase_rows
    // with no upper bound, which special-cases emptying the list.
    let tl = crate::Pin { node: list.first_node(), y: 0, x: 0 };
    list.erase_rows(tl, None).unwrap();

    let pv = list.pin_value(id);
    assert_eq!(pv.node, list.first_node());
    assert_eq!(pv.y, 0);
    assert_eq!(pv.x, 0);
    assert_eq!(list.total_rows(), 24);
}

#[test]
fn left_up_iteration_mirrors_right_down_reversed() {
    let mut list = init(80, 24);
    for _ in 0..40 {
        list.grow().unwrap();
    }
    let top = crate::Pin { node: list.first_node(), y: 0, x: 0 };
    let forward: Vec<crate::Pin> = list.row_iterator(Direction::RightDown, top, None).collect();
    let bottom = *forward.last().unwrap();

    let mut backward: Vec<crate::Pin> = list.row_iterator(Direction::LeftUp, bottom, None).collect();
    backward.reverse();

    assert_eq!(forward, backward);
}

#[test]
fn wide_character_followed_by_spacer_tail() {
    let mut list = init(10, 2);
    let node = list.first_node();
    list.page_mut(node).cell_mut(0, 0).content = crate::CellContent::Codepoint('\u{4e2d}');
    list.page_mut(node).cell_mut(0, 0).wide = crate::Wide::Wide;
    list.page_mut(node).cell_mut(0, 1).wide = crate::Wide::SpacerTail;

    assert_eq!(list.page(node).cell(0, 0).wide, crate::Wide::Wide);
    assert_eq!(list.page(node).cell(0, 1).wide, crate::Wide::SpacerTail);
}
