//! Test modules for dterm-core.
//!
//! - `scenarios`: the literal end-to-end cases from the design notes (S1-S7).
//! - `invariants`: pin stability, wide-character, and accounting invariants
//!   that must hold after arbitrary sequences of operations.
//! - `proptest`: property-based checks over randomized operation sequences.

mod invariants;
mod proptest;
mod scenarios;

use crate::{PageList, PageListConfig, Pin};

/// Writes `ch` into the narrow cell at `(y, x)` of the tail's active page,
/// the minimal cell mutation the test suite needs since per-cell writes
/// are the screen layer's job, not this crate's.
pub(crate) fn poke(list: &mut PageList, pt: Pin, ch: char) {
    list.page_mut(pt.node).cell_mut(pt.y, pt.x).content = crate::CellContent::Codepoint(ch);
}

pub(crate) fn read(list: &PageList, pt: Pin) -> char {
    match list.page(pt.node).cell(pt.y, pt.x).content {
        crate::CellContent::Codepoint(c) => c,
        crate::CellContent::CodepointGrapheme(c, _) => c,
        _ => '\0',
    }
}

pub(crate) fn init(cols: u16, rows: u16) -> PageList {
    PageList::init(PageListConfig::new(cols, rows)).unwrap()
}
