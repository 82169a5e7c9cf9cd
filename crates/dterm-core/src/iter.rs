//! Page/row/cell iterators, both directions, inclusive endpoints (spec
//! §4.10).
//!
//! Three iterators compose: [`PageIter`] yields [`Chunk`]s (a contiguous
//! run of rows within one page), [`RowIter`] expands each chunk into one
//! pin per row, and [`CellIter`] expands each row into one pin per cell
//! in reading order (always ascending `x`, regardless of row direction).

use crate::node::NodeId;
use crate::page_list::PageList;
use crate::pin::Pin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    RightDown,
    LeftUp,
}

/// A contiguous run of rows in a single page, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub node: NodeId,
    pub start: u16,
    pub end: u16,
}

impl PageList {
    /// Resolves `br`, defaulting to the far end of the list in `dir`.
    fn default_bound(&self, dir: Direction) -> Pin {
        match dir {
            Direction::RightDown => {
                let node = self.last_node();
                Pin { node, y: self.page(node).size.rows.saturating_sub(1), x: 0 }
            }
            Direction::LeftUp => Pin { node: self.first_node(), y: 0, x: 0 },
        }
    }

    pub fn page_iterator(&self, dir: Direction, tl: Pin, br: Option<Pin>) -> PageIter<'_> {
        let (from, to) = match dir {
            Direction::RightDown => (tl, br.unwrap_or_else(|| self.default_bound(dir))),
            Direction::LeftUp => (br.unwrap_or_else(|| self.default_bound(dir)), tl),
        };
        PageIter { list: self, dir, cur: Some(if dir == Direction::RightDown { from.node } else { to.node }), from, to, done: false }
    }

    pub fn row_iterator(&self, dir: Direction, tl: Pin, br: Option<Pin>) -> RowIter<'_> {
        RowIter { pages: self.page_iterator(dir, tl, br), dir, cur: None }
    }

    pub fn cell_iterator(&self, dir: Direction, tl: Pin, br: Option<Pin>) -> CellIter<'_> {
        CellIter { list: self, rows: self.row_iterator(dir, tl, br), cur: None, x: 0, cols: 0 }
    }
}

/// Walks pages start-to-end (`from` is the earlier bound in screen order,
/// `to` the later one); `dir` only controls emission order, not which
/// rows are visited.
pub struct PageIter<'p> {
    list: &'p PageList,
    dir: Direction,
    cur: Option<NodeId>,
    from: Pin,
    to: Pin,
    done: bool,
}

impl<'p> Iterator for PageIter<'p> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }
        let node = self.cur?;
        let rows = self.list.page(node).size.rows;
        let start = if node == self.from.node { self.from.y } else { 0 };
        let end = if node == self.to.node { self.to.y + 1 } else { rows };

        self.cur = match self.dir {
            Direction::RightDown => {
                if node == self.to.node {
                    self.done = true;
                    None
                } else {
                    self.list.nodes.next(node)
                }
            }
            Direction::LeftUp => {
                if node == self.from.node {
                    self.done = true;
                    None
                } else {
                    self.list.nodes.prev(node)
                }
            }
        };
        Some(Chunk { node, start, end })
    }
}

pub struct RowIter<'p> {
    pages: PageIter<'p>,
    dir: Direction,
    cur: Option<(NodeId, i32, i32)>, // (node, next_y, end_exclusive_as_i32)
}

impl<'p> Iterator for RowIter<'p> {
    type Item = Pin;

    fn next(&mut self) -> Option<Pin> {
        loop {
            if let Some((node, y, bound)) = self.cur {
                let in_range = match self.dir {
                    Direction::RightDown => y < bound,
                    Direction::LeftUp => y >= bound,
                };
                if in_range {
                    let out = Pin { node, y: y as u16, x: 0 };
                    self.cur = Some((node, if self.dir == Direction::RightDown { y + 1 } else { y - 1 }, bound));
                    return Some(out);
                }
                self.cur = None;
            }
            let chunk = self.pages.next()?;
            self.cur = Some(match self.dir {
                Direction::RightDown => (chunk.node, chunk.start as i32, chunk.end as i32),
                Direction::LeftUp => (chunk.node, chunk.end as i32 - 1, chunk.start as i32),
            });
        }
    }
}

pub struct CellIter<'p> {
    list: &'p PageList,
    rows: RowIter<'p>,
    cur: Option<Pin>,
    x: u16,
    cols: u16,
}

impl<'p> Iterator for CellIter<'p> {
    type Item = Pin;

    fn next(&mut self) -> Option<Pin> {
        loop {
            if let Some(row) = self.cur {
                if self.x < self.cols {
                    let out = Pin { node: row.node, y: row.y, x: self.x };
                    self.x += 1;
                    return Some(out);
                }
                self.cur = None;
            }
            let row = self.rows.next()?;
            self.cols = self.list.page(row.node).size.cols;
            self.x = 0;
            self.cur = Some(row);
        }
    }
}
