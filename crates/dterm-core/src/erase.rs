//! Erase engine (spec §4.5): `eraseRow`, `eraseRowBounded`, `eraseRows`.

use tracing::trace;

use crate::error::Result;
use crate::node::NodeId;
use crate::page::SemanticPrompt;
use crate::page_list::PageList;
use crate::pin::Pin;

impl PageList {
    /// The row-order position immediately after `(node, y)`, or `None` if
    /// `(node, y)` is the last row of the last page.
    pub(crate) fn next_position(&self, node: NodeId, y: u16) -> Option<(NodeId, u16)> {
        let rows = self.page(node).size.rows;
        if y + 1 < rows {
            return Some((node, y + 1));
        }
        self.nodes.next(node).map(|n| (n, 0))
    }

    /// Copies row content from `(src_node, src_y)` into `(dst_node, dst_y)`,
    /// remapping side-table ids across a page boundary when the two
    /// differ.
    pub(crate) fn copy_row(
        &mut self,
        dst: (NodeId, u16),
        src: (NodeId, u16),
    ) -> Result<()> {
        if dst.0 == src.0 {
            self.page_mut(dst.0).swap_rows(dst.1, src.1);
            Ok(())
        } else {
            let (dst_node, src_node) = self.nodes.get_pair_mut(dst.0, src.0);
            dst_node.page.clone_row_from(&src_node.page, dst.1, src.1)
        }
    }

    pub(crate) fn clear_row_at(&mut self, node: NodeId, y: u16) {
        let page = self.page_mut(node);
        let cols = page.capacity.cols;
        page.clear_cells(y, 0, cols);
        let row = page.row_mut(y);
        row.set_wrap(false);
        row.set_wrap_continuation(false);
        row.semantic_prompt = SemanticPrompt::Unknown;
        page.mark_dirty(y);
    }

    /// Core of `eraseRow`/`eraseRowBounded`: shifts rows up by one,
    /// starting at `pt`, for up to `limit` rows (or to the end of the
    /// list when `limit` is `None`). When unbounded, the final vacated
    /// slot is cleared; when bounded, the row at `pt + limit` is left
    /// untouched (spec §4.5).
    fn shift_rows_up(&mut self, pt: Pin, limit: Option<u16>) -> Result<()> {
        let mut pos = (pt.node, pt.y);
        let mut count = 0u16;
        loop {
            if let Some(l) = limit {
                if count >= l {
                    break;
                }
            }
            match self.next_position(pos.0, pos.1) {
                Some(next_pos) => {
                    self.copy_row(pos, next_pos)?;
                    self.page_mut(pos.0).mark_dirty(pos.1);
                    count += 1;
                    pos = next_pos;
                }
                None => {
                    if limit.is_none() {
                        self.clear_row_at(pos.0, pos.1);
                    }
                    break;
                }
            }
        }
        self.retarget_pins_for_row_shift(pt, pos, count, limit);
        Ok(())
    }

    /// Retargets tracked pins after `shift_rows_up`: pins strictly above
    /// `pt` are unaffected; a pin exactly at `pt` had its cell destroyed
    /// and collapses to `{first_node, 0, 0}`; every pin strictly below
    /// `pt` (and at or above the final vacated slot) moves up by one row
    /// in row order.
    fn retarget_pins_for_row_shift(
        &mut self,
        pt: Pin,
        final_pos: (NodeId, u16),
        shifted: u16,
        limit: Option<u16>,
    ) {
        let _ = final_pos;
        let first = self.first_node();
        let nodes = &self.nodes;
        // Unbounded erase overwrites (or clears) `shifted + 1` positions:
        // pt..pos_{shifted-1} by copy, and the final vacated slot by clear.
        // Bounded erase only overwrites the first `shifted` positions —
        // the boundary row at `pt + limit` is explicitly left untouched.
        let window = if limit.is_none() { shifted + 1 } else { shifted };
        let in_range = |p: Pin| -> bool {
            if window == 0 {
                return false;
            }
            let mut cur = (pt.node, pt.y);
            if cur.0 == p.node && cur.1 == p.y {
                return true;
            }
            for _ in 1..window {
                match PageList::step(nodes, cur.0, cur.1) {
                    Some(next) => {
                        cur = next;
                        if cur.0 == p.node && cur.1 == p.y {
                            return true;
                        }
                    }
                    None => return false,
                }
            }
            false
        };
        self.pins.for_each_mut(|_, p| {
            if p.node == pt.node && p.y < pt.y {
                return p;
            }
            if in_range(p) {
                if p.node == pt.node && p.y == pt.y {
                    return Pin { node: first, y: 0, x: 0 };
                }
                return match PageList::step_back(nodes, p.node, p.y) {
                    Some((n, y)) => Pin { node: n, y, x: p.x },
                    None => Pin { node: first, y: 0, x: 0 },
                };
            }
            p
        });
    }

    pub(crate) fn step(nodes: &crate::node::NodeList, node: NodeId, y: u16) -> Option<(NodeId, u16)> {
        let rows = nodes.get(node).page.size.rows;
        if y + 1 < rows {
            return Some((node, y + 1));
        }
        nodes.next(node).map(|n| (n, 0))
    }

    pub(crate) fn step_back(nodes: &crate::node::NodeList, node: NodeId, y: u16) -> Option<(NodeId, u16)> {
        if y > 0 {
            return Some((node, y - 1));
        }
        nodes
            .prev(node)
            .map(|p| (p, nodes.get(p).page.size.rows.saturating_sub(1)))
    }

    /// Removes a single row by rotating it to the end of the list (spec
    /// §4.5 `eraseRow`).
    pub fn erase_row(&mut self, pt: Pin) -> Result<()> {
        trace!(y = pt.y, "erase_row");
        self.shift_rows_up(pt, None)
    }

    /// `eraseRow`, but the upward shift touches at most `limit` rows
    /// beyond `pt` (spec §4.5 `eraseRowBounded`).
    pub fn erase_row_bounded(&mut self, pt: Pin, limit: u16) -> Result<()> {
        trace!(y = pt.y, limit, "erase_row_bounded");
        self.shift_rows_up(pt, Some(limit))
    }

    /// Special-cases emptying the whole list: reinitializes the sole
    /// remaining node to zero rows instead of removing it (spec §4.5).
    fn erase_page(&mut self, node: NodeId) -> Result<()> {
        if self.nodes.len() == 1 {
            let page = self.page_mut(node);
            self.page_size -= page.memory_len();
            page.reinit();
            self.page_size += page.memory_len();
            let first = self.first_node();
            self.pins.for_each_mut(|_, _| Pin { node: first, y: 0, x: 0 });
            return Ok(());
        }
        let fallback = self.nodes.next(node).or_else(|| self.nodes.prev(node)).unwrap();
        self.pins.for_each_mut(|_, p| {
            if p.node == node {
                Pin { node: fallback, y: 0, x: 0 }
            } else {
                p
            }
        });
        let page = self.nodes.remove(node);
        self.page_size -= page.memory_len();
        self.pool.free_page(page);
        Ok(())
    }

    /// Erases a rectangular range of whole rows from `tl` through `bl`
    /// inclusive, or through the end of the list if `bl` is `None` (spec
    /// §4.5 `eraseRows`).
    pub fn erase_rows(&mut self, tl: Pin, bl: Option<Pin>) -> Result<()> {
        trace!("erase_rows");
        // Build the chunk list up front (node, start, end) before any
        // mutation, since erasing full pages changes the chain.
        let mut chunks = Vec::new();
        let mut node = tl.node;
        let mut start = tl.y;
        loop {
            let rows = self.page(node).size.rows;
            let end = if Some(node) == bl.map(|b| b.node) {
                bl.unwrap().y + 1
            } else {
                rows
            };
            chunks.push((node, start, end));
            if Some(node) == bl.map(|b| b.node) {
                break;
            }
            match self.nodes.next(node) {
                Some(next) => {
                    node = next;
                    start = 0;
                }
                None => break,
            }
        }

        let intersects_active = chunks.iter().any(|(n, s, e)| {
            let top = self.active_top();
            // crude but sufficient: a chunk intersects the active area if
            // its node is the active-top node or comes after it.
            *n == top.node && *e > top.y || self.node_after(top.node, *n)
        });

        let first = self.first_node();
        for (node, start, end) in chunks {
            let rows = self.page(node).size.rows;
            let is_full_page = start == 0 && end == rows;
            if is_full_page {
                self.erase_page(node)?;
                continue;
            }
            let chunk_len = end - start;
            // Slide rows [end, rows) down to start..
            for i in 0..(rows - end) {
                self.page_mut(node).swap_rows(start + i, end + i);
            }
            let new_rows = rows - chunk_len;
            for y in new_rows..rows {
                self.clear_row_at(node, y);
            }
            self.page_mut(node).size.rows = new_rows;

            self.pins.for_each_mut(|_, p| {
                if p.node != node {
                    return p;
                }
                if p.y >= start && p.y < end {
                    Pin { node, y: start, x: 0 }
                } else if p.y >= end {
                    Pin { node, y: p.y - chunk_len, x: p.x }
                } else {
                    p
                }
            });
            let _ = first;
        }

        while self.total_rows() < self.rows as usize {
            self.grow()?;
        }

        if intersects_active && self.viewport == crate::pin::Viewport::Pin {
            self.viewport = crate::pin::Viewport::Active;
        }
        Ok(())
    }

    pub(crate) fn node_after(&self, start: NodeId, target: NodeId) -> bool {
        let mut n = start;
        while let Some(next) = self.nodes.next(n) {
            if next == target {
                return true;
            }
            n = next;
        }
        false
    }
}
