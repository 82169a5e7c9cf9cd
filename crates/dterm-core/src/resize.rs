//! Resize without reflow (spec §4.8) and side-table capacity growth
//! (spec §4.9).

use tracing::trace;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::node::{NodeId, NodeList};
use crate::page::Capacity;
use crate::page_list::{standard_capacity, PageList};
use crate::pin::Pin;

/// Caller-facing resize request (spec §6 `resize({...})`).
#[derive(Debug, Clone, Copy)]
pub struct ResizeRequest {
    pub cols: Option<u16>,
    pub rows: Option<u16>,
    pub reflow: bool,
    pub cursor: Option<Pin>,
}

impl PageList {
    /// Dispatches a resize request: column changes go through [`PageList::reflow`]
    /// when `reflow` is set, otherwise (or for row-only changes) through the
    /// no-reflow paths below.
    pub fn resize(&mut self, req: ResizeRequest) -> Result<()> {
        let new_cols = req.cols.unwrap_or(self.cols);
        let new_rows = req.rows.unwrap_or(self.rows);

        if new_cols != self.cols {
            if req.reflow {
                self.reflow(new_cols, req.cursor)?;
            } else {
                self.resize_cols_no_reflow(new_cols)?;
            }
        }
        if new_rows != self.rows {
            self.resize_rows_no_reflow(new_rows, req.cursor)?;
        }
        Ok(())
    }

    /// Row-only resize (spec §4.8 "Row changes"). Shrinking first trims
    /// trailing blank rows from the active area; growing extends the
    /// active area. If `cursor` is at the bottom of the list (or absent),
    /// growth pulls scrollback down when there's enough of it, falling
    /// back to fresh blank rows only when forced. Otherwise growth always
    /// appends fresh blank rows at the tail so the cursor's distance from
    /// the active top is preserved rather than shifting as scrollback is
    /// revealed above it.
    fn resize_rows_no_reflow(&mut self, new_rows: u16, cursor: Option<Pin>) -> Result<()> {
        trace!(old_rows = self.rows, new_rows, "resize: rows (no reflow)");
        if new_rows < self.rows {
            self.trim_trailing_blank_rows(self.rows - new_rows);
            self.rows = new_rows;
            self.min_max_size = crate::page_list::min_max_size(self.cols, self.rows);
            while self.total_rows() < self.rows as usize {
                self.grow()?;
            }
            return Ok(());
        }

        let delta = new_rows - self.rows;
        let cursor_at_bottom = cursor.map_or(true, |p| self.pin_at_list_bottom(p));
        self.rows = new_rows;
        self.min_max_size = crate::page_list::min_max_size(self.cols, self.rows);
        if cursor_at_bottom {
            while self.total_rows() < self.rows as usize {
                self.grow()?;
            }
        } else {
            for _ in 0..delta {
                self.grow()?;
            }
        }
        Ok(())
    }

    /// True if `p` sits on the last row of the last page, i.e. at the very
    /// bottom of the whole list (spec §4.8 "cursor is at the bottom").
    fn pin_at_list_bottom(&self, p: Pin) -> bool {
        let last = self.last_node();
        p.node == last && p.y + 1 == self.page(last).size.rows
    }

    /// Trims up to `limit` trailing blank rows from the active area,
    /// refusing to trim any row that holds a tracked pin. Returns the
    /// number of rows actually trimmed.
    fn trim_trailing_blank_rows(&mut self, limit: u16) -> u16 {
        let mut trimmed = 0u16;
        while trimmed < limit {
            let last = self.last_node();
            let page = self.page(last);
            if page.size.rows == 0 {
                break;
            }
            let y = page.size.rows - 1;
            if !page.row(y).is_blank() {
                break;
            }
            let has_pin = self.pins.occupied_ids().any(|id| {
                let p = self.pins.get(id);
                p.node == last && p.y == y
            });
            if has_pin {
                break;
            }
            self.page_mut(last).size.rows -= 1;
            trimmed += 1;
        }
        trimmed
    }

    /// Column-only resize without reflow (spec §4.8 "Column changes
    /// without reflow"): shrinking clips in place, growing either widens
    /// pages in place or reallocates into fresh pages at the new
    /// capacity.
    fn resize_cols_no_reflow(&mut self, new_cols: u16) -> Result<()> {
        trace!(old_cols = self.cols, new_cols, "resize: cols (no reflow)");
        if new_cols < self.cols {
            self.shrink_cols_in_place(new_cols);
        } else {
            self.grow_cols(new_cols)?;
        }
        self.cols = new_cols;
        self.pool.set_std_capacity(standard_capacity(new_cols));
        self.min_max_size = crate::page_list::min_max_size(self.cols, self.rows);
        Ok(())
    }

    fn shrink_cols_in_place(&mut self, new_cols: u16) {
        let nodes: Vec<NodeId> = self.nodes.iter_forward().collect();
        for id in nodes {
            let page = self.page_mut(id);
            let rows = page.size.rows;
            for y in 0..rows {
                page.clear_cells(y, new_cols, page.capacity.cols.min(page.size.cols));
            }
            page.size.cols = new_cols;
        }
        let clamp = new_cols.saturating_sub(1);
        self.pins.for_each_mut(|_, p| {
            if p.x > clamp {
                Pin { x: clamp, ..p }
            } else {
                p
            }
        });
    }

    /// Widens every page's `size.cols` in place when its capacity already
    /// covers `new_cols`; otherwise copies rows into freshly allocated
    /// pages at an adjusted capacity, topping off the tail of the
    /// previous destination page before opening a new one.
    fn grow_cols(&mut self, new_cols: u16) -> Result<()> {
        let all_fit = self
            .nodes
            .iter_forward()
            .all(|id| self.page(id).capacity.cols >= new_cols);
        if all_fit {
            let nodes: Vec<NodeId> = self.nodes.iter_forward().collect();
            for id in nodes {
                self.page_mut(id).size.cols = new_cols;
            }
            return Ok(());
        }

        let old_nodes = std::mem::replace(&mut self.nodes, NodeList::new());
        let mut pin_map = FxHashMap::default();
        let mut dst: Option<NodeId> = None;

        let ids: Vec<NodeId> = old_nodes.iter_forward().collect();
        for id in ids {
            let src_page = &old_nodes.get(id).page;
            let mut src_y = 0u16;
            while src_y < src_page.size.rows {
                let cur = match dst {
                    Some(d) if self.page(d).size.rows < self.page(d).capacity.rows => d,
                    _ => {
                        let cap = Capacity { cols: new_cols, ..self.pool.std_capacity() };
                        let page = self.pool.alloc_page(cap)?;
                        self.page_size += page.memory_len();
                        let new_id = self.nodes.push_back(page);
                        dst = Some(new_id);
                        new_id
                    }
                };
                let dst_row = self.page(cur).size.rows;
                self.page_mut(cur).clone_row_from(src_page, dst_row, src_y)?;
                self.page_mut(cur).size.rows += 1;
                for pin_id in self.pins.occupied_ids() {
                    let p = self.pins.get(pin_id);
                    if p.node == id && p.y == src_y {
                        pin_map.insert(pin_id, Pin { node: cur, y: dst_row, x: p.x.min(new_cols - 1) });
                    }
                }
                src_y += 1;
            }
        }

        self.reclaim(old_nodes);

        let first = self.nodes.first().expect("resize always produces at least one page");
        self.pins.for_each_mut(|id, _| {
            pin_map.get(&id).copied().unwrap_or(Pin { node: first, y: 0, x: 0 })
        });
        Ok(())
    }

    /// Creates a new page at a larger, monotonically non-decreasing
    /// capacity, clones every row, and splices it in place of `node`
    /// (spec §4.9 `adjustCapacity`).
    pub fn adjust_capacity(&mut self, node: NodeId, at_least: Capacity) -> Result<()> {
        let old_cap = self.page(node).capacity;
        let new_cap = old_cap.grow_rounded(at_least);
        trace!(?node, "adjust_capacity");
        let mut new_page = self.pool.alloc_page(new_cap)?;
        let old_rows = self.page(node).size.rows;
        new_page.size.rows = 0;
        new_page.clone_from(self.page(node), 0, old_rows)?;

        let prev = self.nodes.prev(node);
        let next = self.nodes.next(node);
        let old_page = self.nodes.remove(node);
        self.page_size -= old_page.memory_len();
        self.pool.free_page(old_page);

        let new_id = match prev {
            Some(p) => self.nodes.insert_after(p, new_page),
            None => self.nodes.push_front(new_page),
        };
        self.page_size += self.page(new_id).memory_len();
        let _ = next;

        self.pins.for_each_mut(|_, p| if p.node == node { Pin { node: new_id, ..p } } else { p });
        Ok(())
    }
}
