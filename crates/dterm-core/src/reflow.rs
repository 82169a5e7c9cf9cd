//! Reflow engine (spec §4.7): column-change resize with soft-wrap
//! reconstruction. The hardest subsystem in the list.
//!
//! Implemented as a single-pass writer (`Writer`) that owns exactly one
//! "current" destination page at a time, per the design notes' "reflow
//! writer" pattern. The only way the writer moves to a new page mid-row
//! is [`Writer::move_last_row_to_new_page`], which keeps that invariant
//! even when a side table overflows partway through a row.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::Result;
use crate::node::{NodeId, NodeList};
use crate::page::{Capacity, Cell, CellContent, Page, SemanticPrompt, Wide};
use crate::page_list::{standard_capacity, PageList};
use crate::pin::{Pin, PinId};

impl PageList {
    /// Re-lays every logical line out at `new_cols`, preserving wide
    /// characters, graphemes, hyperlinks, styles, and semantic markers
    /// (spec §4.7). `cursor`, if given, is the caller's cursor pin; its
    /// screen-relative position is preserved by the heuristic in
    /// [`PageList::apply_cursor_preservation`].
    pub fn reflow(&mut self, new_cols: u16, cursor: Option<Pin>) -> Result<()> {
        if new_cols == self.cols {
            return Ok(());
        }
        trace!(old_cols = self.cols, new_cols, "reflow: begin");

        let cursor_state = cursor.map(|c| self.capture_cursor_state(c));

        let pins_by_row = self.pins_by_row();
        let old_cols = self.cols;
        let (new_nodes, bytes_added, pin_map) = {
            let mut writer = Writer::new(&mut self.pool, new_cols)?;
            writer.run(&self.nodes, old_cols, &pins_by_row)?;
            (writer.nodes, writer.bytes_added, writer.pin_map)
        };

        let old_nodes = std::mem::replace(&mut self.nodes, new_nodes);
        self.reclaim(old_nodes);
        self.page_size += bytes_added;
        self.cols = new_cols;
        self.pool.set_std_capacity(standard_capacity(new_cols));

        let first = self.first_node();
        self.pins.for_each_mut(|id, _| {
            pin_map.get(&id).copied().unwrap_or(Pin { node: first, y: 0, x: 0 })
        });

        if let Some(cs) = cursor_state {
            self.apply_cursor_preservation(cs)?;
        }

        while self.total_rows() < self.rows as usize {
            self.grow()?;
        }
        Ok(())
    }

    fn pins_by_row(&self) -> FxHashMap<(NodeId, u16), Vec<(u16, PinId)>> {
        let mut map: FxHashMap<(NodeId, u16), Vec<(u16, PinId)>> = FxHashMap::default();
        for id in self.pins.occupied_ids() {
            let p = self.pins.get(id);
            map.entry((p.node, p.y)).or_default().push((p.x, id));
        }
        map
    }

    pub(crate) fn reclaim(&mut self, mut old: NodeList) {
        while let Some(first) = old.first() {
            let page = old.remove(first);
            self.page_size -= page.memory_len();
            self.pool.free_page(page);
        }
    }

    /// Distance (in rows) from `cursor` up to and including the bottom
    /// row of the list, captured before reflow reshuffles everything.
    fn capture_cursor_state(&self, cursor: Pin) -> CursorState {
        let mut distance = 0u32;
        let mut n = self.last_node();
        loop {
            if n == cursor.node {
                distance += (self.page(n).size.rows.saturating_sub(1) - cursor.y) as u32;
                break;
            }
            distance += self.page(n).size.rows as u32;
            match self.nodes.prev(n) {
                Some(p) => n = p,
                None => break,
            }
        }
        CursorState { distance_from_bottom: distance }
    }

    /// Appends blank rows to the active tail so the cursor's distance
    /// from the bottom of the list is restored to what it was before
    /// reflow, modulo any change in wrap-continuation count on its
    /// logical line (spec §4.7 "preserved-cursor heuristic").
    fn apply_cursor_preservation(&mut self, state: CursorState) -> Result<()> {
        while self.total_rows() < state.distance_from_bottom as usize + self.rows as usize {
            self.grow()?;
        }
        Ok(())
    }
}

struct CursorState {
    distance_from_bottom: u32,
}

struct Writer<'p> {
    pool: &'p mut crate::pool::MemoryPool,
    nodes: NodeList,
    cur: NodeId,
    cap: Capacity,
    y: u16,
    x: u16,
    new_cols: u16,
    bytes_added: usize,
    pin_map: FxHashMap<PinId, Pin>,
}

impl<'p> Writer<'p> {
    fn new(pool: &'p mut crate::pool::MemoryPool, new_cols: u16) -> Result<Self> {
        let cap = standard_capacity(new_cols);
        let mut page = pool.alloc_page(cap)?;
        page.size.rows = 0;
        let bytes_added = page.memory_len();
        let mut nodes = NodeList::new();
        let cur = nodes.push_back(page);
        Ok(Writer {
            pool,
            nodes,
            cur,
            cap,
            y: 0,
            x: 0,
            new_cols,
            bytes_added,
            pin_map: FxHashMap::default(),
        })
    }

    fn run(
        &mut self,
        old: &NodeList,
        old_cols: u16,
        pins_by_row: &FxHashMap<(NodeId, u16), Vec<(u16, PinId)>>,
    ) -> Result<()> {
        let mut needs_new_row = true;
        let mut new_rows = 0u16;
        let mut old_node = old.first();
        while let Some(node) = old_node {
            let page = &old.get(node).page;
            for y in 0..page.size.rows {
                let row = page.row(y);
                let empty_gap = needs_new_row && row.is_blank();
                if empty_gap {
                    new_rows += 1;
                } else {
                    if needs_new_row {
                        for _ in 0..new_rows {
                            self.open_row(SemanticPrompt::Unknown, false)?;
                        }
                        new_rows = 0;
                        self.open_row(row.semantic_prompt, false)?;
                    }
                    if let Some(pins) = pins_by_row.get(&(node, y)) {
                        let dest = self.dest_pin();
                        for &(x, id) in pins {
                            if x == 0 {
                                self.pin_map.insert(id, dest);
                            }
                        }
                    }
                    for x in 0..old_cols {
                        let cell = *row.cells().get(x as usize).unwrap_or(&Cell::default());
                        self.write_cell(page, cell, row.semantic_prompt)?;
                        if let Some(pins) = pins_by_row.get(&(node, y)) {
                            let dest = self.dest_pin();
                            for &(px, id) in pins {
                                if px == x + 1 {
                                    self.pin_map.insert(id, dest);
                                }
                            }
                        }
                    }
                    needs_new_row = !row.wrap();
                }
            }
            old_node = old.next(node);
        }
        Ok(())
    }

    fn dest_pin(&self) -> Pin {
        Pin { node: self.cur, y: self.y, x: self.x.min(self.new_cols.saturating_sub(1)) }
    }

    fn cur_page(&mut self) -> &mut Page {
        &mut self.nodes.get_mut(self.cur).page
    }

    fn open_row(&mut self, prompt: SemanticPrompt, continuation: bool) -> Result<()> {
        let cap_rows = self.cur_page().capacity.rows;
        let size_rows = self.cur_page().size.rows;
        if size_rows < cap_rows {
            self.cur_page().size.rows += 1;
            self.y = size_rows;
        } else {
            let cap = self.cap;
            self.open_new_page(cap)?;
        }
        self.x = 0;
        let y = self.y;
        let row = self.cur_page().row_mut(y);
        row.set_wrap(false);
        row.set_wrap_continuation(continuation);
        row.semantic_prompt = prompt;
        Ok(())
    }

    fn open_new_page(&mut self, cap: Capacity) -> Result<()> {
        let mut page = self.pool.alloc_page(cap)?;
        page.size.rows = 1;
        self.bytes_added += page.memory_len();
        self.cur = self.nodes.push_back(page);
        self.cap = cap;
        self.y = 0;
        Ok(())
    }

    fn wrap_to_next_row(&mut self, prompt: SemanticPrompt) -> Result<()> {
        let y = self.y;
        self.cur_page().row_mut(y).set_wrap(true);
        self.open_row(prompt, true)
    }

    /// Copies one source cell, handling destination-width wrapping, wide
    /// characters at the new boundary, and the width-1 collapse rules
    /// (spec §4.7 "Copy the cell").
    fn write_cell(&mut self, src: &Page, cell: Cell, prompt: SemanticPrompt) -> Result<()> {
        loop {
            if self.x >= self.new_cols {
                self.wrap_to_next_row(prompt)?;
            }
            match cell.wide {
                Wide::Wide if self.new_cols >= 2 && self.x == self.new_cols - 1 => {
                    self.put_spacer_head()?;
                    self.wrap_to_next_row(prompt)?;
                    continue;
                }
                Wide::Wide if self.new_cols == 1 => {
                    self.put_blank();
                    return Ok(());
                }
                Wide::SpacerHead => return Ok(()),
                Wide::SpacerTail if self.new_cols == 1 => return Ok(()),
                _ => {
                    self.put_cell(src, cell)?;
                    return Ok(());
                }
            }
        }
    }

    fn put_blank(&mut self) {
        let y = self.y;
        let x = self.x;
        *self.cur_page().cell_mut(y, x) = Cell::default();
        self.x += 1;
    }

    fn put_spacer_head(&mut self) -> Result<()> {
        let y = self.y;
        let x = self.x;
        let mut c = Cell::default();
        c.wide = Wide::SpacerHead;
        *self.cur_page().cell_mut(y, x) = c;
        Ok(())
    }

    /// Copies `cell` into the current destination slot, dedup-remapping
    /// its grapheme/style/hyperlink ids into the destination page's side
    /// tables, widening (and moving the row to a new page) on overflow.
    fn put_cell(&mut self, src: &Page, cell: Cell) -> Result<()> {
        let mut attempts = 0;
        loop {
            match self.try_put_cell(src, cell) {
                Ok(()) => return Ok(()),
                Err(_overflow) if attempts < 4 => {
                    attempts += 1;
                    let widen = Capacity {
                        cols: self.cap.cols,
                        rows: self.cap.rows,
                        styles: self.cap.styles + 1,
                        grapheme_bytes: self.cap.grapheme_bytes + 1,
                        hyperlink_bytes: self.cap.hyperlink_bytes + 1,
                        string_bytes: self.cap.string_bytes,
                    };
                    self.move_last_row_to_new_page(self.cap.grow_rounded(widen))?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn try_put_cell(&mut self, src: &Page, cell: Cell) -> Result<()> {
        let mut new_cell = cell;
        if let CellContent::CodepointGrapheme(cp, gid) = cell.content {
            if let Some(chars) = src.graphemes.lookup(gid) {
                let owned: Vec<char> = chars.to_vec();
                let page = self.cur_page();
                let new_gid = page.graphemes.append(&owned)?;
                new_cell.content = CellContent::CodepointGrapheme(cp, new_gid);
            }
        }
        if let Some(style_id) = cell.style_id {
            if let Some(style) = src.styles.get(style_id).cloned() {
                let y = self.y;
                let page = self.cur_page();
                let new_id = page.find_or_add_style(style)?;
                new_cell.style_id = Some(new_id);
                page.row_mut(y).flags.insert(crate::page::RowFlags::STYLED);
            }
        }
        if let Some(hid) = cell.hyperlink {
            if let Some(uri) = src.hyperlinks.lookup(hid) {
                let owned = uri.to_string();
                let page = self.cur_page();
                let new_id = match page.hyperlinks.get(&owned) {
                    Some(id) => {
                        page.hyperlinks.dupe(id);
                        id
                    }
                    None => page.hyperlinks.add(&owned)?,
                };
                new_cell.hyperlink = Some(new_id);
            }
        }
        let y = self.y;
        let x = self.x;
        *self.cur_page().cell_mut(y, x) = new_cell;
        self.x += 1;
        Ok(())
    }

    /// Relocates the row currently being written to a freshly allocated,
    /// wider page, then resumes writing there (spec §4.7
    /// `moveLastRowToNewPage`).
    fn move_last_row_to_new_page(&mut self, new_cap: Capacity) -> Result<()> {
        let mut new_page = self.pool.alloc_page(new_cap)?;
        new_page.size.rows = 0;
        let y = self.y;
        {
            let old_page = self.cur_page();
            new_page.clone_from(old_page, y, y + 1)?;
        }
        self.bytes_added += new_page.memory_len();
        {
            let old_page = self.cur_page();
            old_page.size.rows -= 1;
        }
        if self.nodes.get(self.cur).page.size.rows == 0 {
            let freed = self.nodes.remove(self.cur);
            self.bytes_added -= freed.memory_len();
            self.pool.free_page(freed);
        }
        self.cur = self.nodes.push_back(new_page);
        self.cap = new_cap;
        self.y = 0;
        Ok(())
    }
}
