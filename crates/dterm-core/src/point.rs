//! Tag-relative points (spec §6 `pin(pt)`, `pointFromPin`, `getTopLeft`,
//! `getBottomRight`).
//!
//! A [`Point`] is a row/column offset relative to one of the list's named
//! regions rather than an absolute `{node, y, x}` — what the screen layer
//! hands across the API boundary before the page list resolves it to a
//! concrete [`Pin`].

use crate::page_list::PageList;
use crate::pin::Pin;

/// The named region a [`Point`] is relative to. The spec only
/// distinguishes the visible active area from the whole screen
/// (scrollback included); both end at the same bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTag {
    Active,
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub tag: PointTag,
    pub y: u16,
    pub x: u16,
}

impl PageList {
    pub fn get_top_left(&self, tag: PointTag) -> Pin {
        match tag {
            PointTag::Active => self.active_top(),
            PointTag::Screen => Pin { node: self.first_node(), y: 0, x: 0 },
        }
    }

    pub fn get_bottom_right(&self, _tag: PointTag) -> Pin {
        let node = self.last_node();
        let y = self.page(node).size.rows.saturating_sub(1);
        let cols = self.page(node).size.cols;
        Pin { node, y, x: cols.saturating_sub(1) }
    }

    /// Resolves a region-relative point to an absolute pin, or `None` if
    /// `pt.y`/`pt.x` fall outside the region.
    pub fn pin(&self, pt: Point) -> Option<Pin> {
        let top = self.get_top_left(pt.tag);
        let mut pos = (top.node, top.y);
        for _ in 0..pt.y {
            pos = PageList::step(&self.nodes, pos.0, pos.1)?;
        }
        let cols = self.page(pos.0).size.cols;
        if pt.x >= cols {
            return None;
        }
        Some(Pin { node: pos.0, y: pos.1, x: pt.x })
    }

    /// Inverse of [`PageList::pin`]: the offset of `p` from `tag`'s
    /// top-left, or `None` if `p` lies outside the region (above it, for
    /// `Active`).
    pub fn point_from_pin(&self, tag: PointTag, p: Pin) -> Option<Point> {
        let top = self.get_top_left(tag);
        let mut pos = (top.node, top.y);
        let mut y = 0u16;
        loop {
            if pos.0 == p.node && pos.1 == p.y {
                return Some(Point { tag, y, x: p.x });
            }
            match PageList::step(&self.nodes, pos.0, pos.1) {
                Some(next) => {
                    pos = next;
                    y += 1;
                }
                None => return None,
            }
        }
    }
}
