//! The `Page`: a fixed-capacity grid of rows/cells with side tables for
//! styles, grapheme clusters, and hyperlinks.
//!
//! Spec §3/§6 treat `Page` as opaque to the page-list engine; this module
//! is the concrete leaf implementation the rest of the crate is built on.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{PageListError, Result};

/// Identifier into a page's style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleId(pub u32);

/// Identifier into a page's grapheme table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphemeId(pub u32);

/// Identifier into a page's hyperlink table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HyperlinkId(pub u32);

/// A cell's visual style. Kept intentionally small; the screen layer above
/// owns richer rendering attributes and only hands us an opaque, hashable
/// value to dedup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<(u8, u8, u8)>,
    pub bg: Option<(u8, u8, u8)>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
}

bitflags::bitflags! {
    /// Per-row flags (spec §6 "row flags").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowFlags: u8 {
        /// Row soft-wraps into the next row.
        const WRAP = 0b0000_0001;
        /// Row is the visual continuation of the previous row's wrap.
        const WRAP_CONTINUATION = 0b0000_0010;
        /// Row has at least one cell with a non-default style.
        const STYLED = 0b0000_0100;
        /// Row holds a Kitty graphics virtual placeholder.
        const KITTY_VIRTUAL_PLACEHOLDER = 0b0000_1000;
        /// Row has unrendered changes (diagnostics §6).
        const DIRTY = 0b0001_0000;
    }
}

/// Shell-supplied semantic tag for a row (OSC 133).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemanticPrompt {
    #[default]
    Unknown,
    Prompt,
    PromptContinuation,
    Input,
    Command,
}

/// Wide-character placement state for a cell (spec invariant 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wide {
    #[default]
    Narrow,
    Wide,
    SpacerHead,
    SpacerTail,
}

/// What a cell's content field holds (spec §6 `content_tag`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTag {
    Codepoint,
    CodepointGrapheme,
    BgColorPalette,
    BgColorRgb,
}

/// A single cell's content payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellContent {
    Codepoint(char),
    /// Base codepoint plus a link to combining codepoints in the
    /// grapheme table.
    CodepointGrapheme(char, GraphemeId),
    BgColorPalette(u8),
    BgColorRgb(u8, u8, u8),
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Codepoint('\0')
    }
}

impl CellContent {
    pub fn tag(&self) -> ContentTag {
        match self {
            CellContent::Codepoint(_) => ContentTag::Codepoint,
            CellContent::CodepointGrapheme(..) => ContentTag::CodepointGrapheme,
            CellContent::BgColorPalette(_) => ContentTag::BgColorPalette,
            CellContent::BgColorRgb(..) => ContentTag::BgColorRgb,
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub content: CellContent,
    pub wide: Wide,
    pub hyperlink: Option<HyperlinkId>,
    pub style_id: Option<StyleId>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Codepoint(c) if c == '\0')
            && self.wide == Wide::Narrow
            && self.hyperlink.is_none()
    }

    pub fn has_text(&self) -> bool {
        match self.content {
            CellContent::Codepoint(c) => c != '\0',
            CellContent::CodepointGrapheme(c, _) => c != '\0',
            _ => false,
        }
    }
}

/// One row of cells plus its flags and side-table back-references.
#[derive(Debug, Clone)]
pub struct Row {
    cells: Vec<Cell>,
    pub flags: RowFlags,
    pub semantic_prompt: SemanticPrompt,
}

impl Row {
    fn new(cols: usize) -> Self {
        Row {
            cells: vec![Cell::default(); cols],
            flags: RowFlags::empty(),
            semantic_prompt: SemanticPrompt::Unknown,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn wrap(&self) -> bool {
        self.flags.contains(RowFlags::WRAP)
    }

    pub fn wrap_continuation(&self) -> bool {
        self.flags.contains(RowFlags::WRAP_CONTINUATION)
    }

    pub fn set_wrap(&mut self, v: bool) {
        self.flags.set(RowFlags::WRAP, v);
    }

    pub fn set_wrap_continuation(&mut self, v: bool) {
        self.flags.set(RowFlags::WRAP_CONTINUATION, v);
    }

    pub fn clear(&mut self) {
        for c in &mut self.cells {
            *c = Cell::default();
        }
        self.flags = RowFlags::empty();
        self.semantic_prompt = SemanticPrompt::Unknown;
    }

    /// True when every cell is the default empty cell and the row carries
    /// no wrap-continuation flag — a "fully empty" source row for the
    /// reflow cursor's `new_rows` deferral (spec §4.7).
    pub fn is_blank(&self) -> bool {
        !self.wrap_continuation() && self.cells.iter().all(Cell::is_empty)
    }
}

/// Dedup table for cell styles: id -> (style, refcount).
#[derive(Debug, Default)]
pub struct StyleTable {
    entries: FxHashMap<StyleId, (Style, u32)>,
    next_id: u32,
    capacity: u32,
}

impl StyleTable {
    fn new(capacity: u32) -> Self {
        StyleTable {
            entries: FxHashMap::default(),
            next_id: 1,
            capacity,
        }
    }

    pub fn get(&self, id: StyleId) -> Option<&Style> {
        self.entries.get(&id).map(|(s, _)| s)
    }

    pub fn add(&mut self, style: Style) -> Result<StyleId> {
        if self.entries.len() as u32 >= self.capacity {
            return Err(PageListError::SideTableFull {
                table: "styles",
                capacity: self.capacity,
            });
        }
        let id = StyleId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, (style, 1));
        Ok(id)
    }

    pub fn add_with_id(&mut self, id: StyleId, style: Style) {
        self.entries.insert(id, (style, 1));
        self.next_id = self.next_id.max(id.0 + 1);
    }

    pub fn use_(&mut self, id: StyleId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.1 += 1;
        }
    }

    pub fn release(&mut self, id: StyleId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.1 = entry.1.saturating_sub(1);
            if entry.1 == 0 {
                self.entries.remove(&id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Dedup table for grapheme cluster extensions, budgeted in bytes rather
/// than entry count (spec §3 `grapheme_bytes`).
#[derive(Debug, Default)]
pub struct GraphemeTable {
    entries: FxHashMap<GraphemeId, SmallVec<[char; 4]>>,
    next_id: u32,
    byte_capacity: u32,
    bytes_used: u32,
}

impl GraphemeTable {
    fn new(byte_capacity: u32) -> Self {
        GraphemeTable {
            entries: FxHashMap::default(),
            next_id: 1,
            byte_capacity,
            bytes_used: 0,
        }
    }

    fn entry_bytes(chars: &[char]) -> u32 {
        (chars.len() * std::mem::size_of::<char>()) as u32
    }

    pub fn lookup(&self, id: GraphemeId) -> Option<&[char]> {
        self.entries.get(&id).map(|v| v.as_slice())
    }

    pub fn append(&mut self, chars: &[char]) -> Result<GraphemeId> {
        let needed = Self::entry_bytes(chars);
        if self.bytes_used + needed > self.byte_capacity {
            return Err(PageListError::SideTableFull {
                table: "graphemes",
                capacity: self.byte_capacity,
            });
        }
        let id = GraphemeId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, SmallVec::from_slice(chars));
        self.bytes_used += needed;
        Ok(id)
    }

    /// Overwrites (or creates) the grapheme run for an existing id —
    /// `set_graphemes` in spec §6.
    pub fn set(&mut self, id: GraphemeId, chars: &[char]) -> Result<()> {
        let old = self.entries.get(&id).map(Self::entry_bytes).unwrap_or(0);
        let needed = Self::entry_bytes(chars);
        if self.bytes_used - old + needed > self.byte_capacity {
            return Err(PageListError::SideTableFull {
                table: "graphemes",
                capacity: self.byte_capacity,
            });
        }
        self.bytes_used = self.bytes_used - old + needed;
        self.entries.insert(id, SmallVec::from_slice(chars));
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> u32 {
        self.byte_capacity
    }

    pub fn bytes_used(&self) -> u32 {
        self.bytes_used
    }
}

/// Dedup table for hyperlink URIs, refcounted like styles.
#[derive(Debug, Default)]
pub struct HyperlinkTable {
    entries: FxHashMap<HyperlinkId, (String, u32)>,
    next_id: u32,
    byte_capacity: u32,
    bytes_used: u32,
}

impl HyperlinkTable {
    fn new(byte_capacity: u32) -> Self {
        HyperlinkTable {
            entries: FxHashMap::default(),
            next_id: 1,
            byte_capacity,
            bytes_used: 0,
        }
    }

    pub fn lookup(&self, id: HyperlinkId) -> Option<&str> {
        self.entries.get(&id).map(|(s, _)| s.as_str())
    }

    pub fn get(&self, uri: &str) -> Option<HyperlinkId> {
        self.entries
            .iter()
            .find(|(_, (u, _))| u == uri)
            .map(|(id, _)| *id)
    }

    pub fn add(&mut self, uri: &str) -> Result<HyperlinkId> {
        if self.bytes_used as usize + uri.len() > self.byte_capacity as usize {
            return Err(PageListError::SideTableFull {
                table: "hyperlinks",
                capacity: self.byte_capacity,
            });
        }
        let id = HyperlinkId(self.next_id);
        self.next_id += 1;
        self.bytes_used += uri.len() as u32;
        self.entries.insert(id, (uri.to_string(), 1));
        Ok(id)
    }

    pub fn add_with_id(&mut self, id: HyperlinkId, uri: &str) {
        self.bytes_used += uri.len() as u32;
        self.entries.insert(id, (uri.to_string(), 1));
        self.next_id = self.next_id.max(id.0 + 1);
    }

    /// Increments the refcount when a cell copy duplicates a reference.
    pub fn dupe(&mut self, id: HyperlinkId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.1 += 1;
        }
    }

    pub fn release(&mut self, id: HyperlinkId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.1 = entry.1.saturating_sub(1);
            if entry.1 == 0 {
                self.bytes_used -= entry.0.len() as u32;
                self.entries.remove(&id);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> u32 {
        self.byte_capacity
    }
}

/// A page's fixed allocation shape (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub cols: u16,
    pub rows: u16,
    pub styles: u16,
    pub grapheme_bytes: u32,
    pub hyperlink_bytes: u32,
    pub string_bytes: u32,
}

impl Capacity {
    /// Rounds every field up to the next power of two, monotonically
    /// non-decreasing relative to `self` (spec §4.9).
    pub fn grow_rounded(&self, at_least: Capacity) -> Capacity {
        fn round(v: u32) -> u32 {
            if v <= 1 {
                1
            } else {
                v.next_power_of_two()
            }
        }
        Capacity {
            cols: self.cols.max(at_least.cols),
            rows: self.rows.max(at_least.rows),
            styles: (round(self.styles.max(at_least.styles) as u32) as u16),
            grapheme_bytes: round(self.grapheme_bytes.max(at_least.grapheme_bytes)),
            hyperlink_bytes: round(self.hyperlink_bytes.max(at_least.hyperlink_bytes)),
            string_bytes: round(self.string_bytes.max(at_least.string_bytes)),
        }
    }
}

/// The byte layout a given [`Capacity`] would require. Used both for pool
/// sizing decisions and for `page_size` accounting (spec §4.1/§4.2).
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub total_size: usize,
}

/// Computes the byte layout for a capacity, mirroring spec §4.2's
/// `layout(cap).total_size`.
pub fn layout(cap: &Capacity) -> Layout {
    let cell_bytes = std::mem::size_of::<Cell>();
    let row_overhead = std::mem::size_of::<RowFlags>() + std::mem::size_of::<SemanticPrompt>();
    let rows_bytes = cap.rows as usize * (cap.cols as usize * cell_bytes + row_overhead);
    let style_bytes = cap.styles as usize * std::mem::size_of::<Style>();
    let total = rows_bytes
        + style_bytes
        + cap.grapheme_bytes as usize
        + cap.hyperlink_bytes as usize
        + cap.string_bytes as usize;
    Layout { total_size: total }
}

/// Active extent within a page's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// A fixed-capacity grid of rows/cells with side tables. See module docs.
#[derive(Debug)]
pub struct Page {
    pub capacity: Capacity,
    pub size: Size,
    rows: Vec<Row>,
    pub styles: StyleTable,
    pub graphemes: GraphemeTable,
    pub hyperlinks: HyperlinkTable,
    dirty: roaring::RoaringBitmap,
    integrity_paused: bool,
}

impl Page {
    /// Allocates a new, zero-initialized page at the given capacity.
    /// Mirrors spec §6 `initBuf`/`reinit` combined for a safe Rust target:
    /// there is no raw buffer handed in, the page owns its storage.
    pub fn new(capacity: Capacity) -> Self {
        let rows = (0..capacity.rows as usize)
            .map(|_| Row::new(capacity.cols as usize))
            .collect();
        Page {
            capacity,
            size: Size {
                cols: capacity.cols,
                rows: 0,
            },
            rows,
            styles: StyleTable::new(capacity.styles as u32),
            graphemes: GraphemeTable::new(capacity.grapheme_bytes),
            hyperlinks: HyperlinkTable::new(capacity.hyperlink_bytes),
            dirty: roaring::RoaringBitmap::new(),
            integrity_paused: false,
        }
    }

    pub fn memory_len(&self) -> usize {
        layout(&self.capacity).total_size
    }

    /// Resets the page to zero rows while retaining its capacity and
    /// backing storage (used when recycling a detached head page, spec
    /// §4.4 step 3a).
    pub fn reinit(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.size.rows = 0;
        self.styles = StyleTable::new(self.capacity.styles as u32);
        self.graphemes = GraphemeTable::new(self.capacity.grapheme_bytes);
        self.hyperlinks = HyperlinkTable::new(self.capacity.hyperlink_bytes);
        self.dirty.clear();
    }

    pub fn row(&self, y: u16) -> &Row {
        &self.rows[y as usize]
    }

    pub fn row_mut(&mut self, y: u16) -> &mut Row {
        &mut self.rows[y as usize]
    }

    pub fn cell(&self, y: u16, x: u16) -> &Cell {
        &self.rows[y as usize].cells()[x as usize]
    }

    pub fn cell_mut(&mut self, y: u16, x: u16) -> &mut Cell {
        &mut self.rows[y as usize].cells_mut()[x as usize]
    }

    /// Swaps two rows' storage wholesale. Side-table ids stay valid
    /// regardless of which row slot holds them, so this is a cheap,
    /// correct way to shift rows within a page (erase, resize).
    pub fn swap_rows(&mut self, a: u16, b: u16) {
        self.rows.swap(a as usize, b as usize);
    }

    pub fn clear_cells(&mut self, row: u16, x0: u16, x1: u16) {
        let cells = self.rows[row as usize].cells_mut();
        for c in &mut cells[x0 as usize..x1 as usize] {
            *c = Cell::default();
        }
    }

    /// Copies rows `[src_y_start, src_y_end)` from `src` onto the end of
    /// `self`'s active rows, remapping style/grapheme/hyperlink ids into
    /// `self`'s own side tables (spec §6 `cloneFrom`).
    pub fn clone_from(&mut self, src: &Page, src_y_start: u16, src_y_end: u16) -> Result<u16> {
        let mut copied = 0u16;
        for src_y in src_y_start..src_y_end {
            let dst_y = self.size.rows;
            if dst_y >= self.capacity.rows {
                return Err(PageListError::PageCloneFailed(
                    "destination page ran out of row capacity",
                ));
            }
            self.clone_row_from(src, dst_y, src_y)?;
            self.size.rows += 1;
            copied += 1;
        }
        Ok(copied)
    }

    /// Copies a single row's content and metadata from `src_row` of `src`
    /// into `dst_row` of `self`, remapping side-table ids (spec §6
    /// `cloneRowFrom`).
    pub fn clone_row_from(&mut self, src: &Page, dst_row: u16, src_row: u16) -> Result<()> {
        let src_row_ref = src.row(src_row);
        let flags = src_row_ref.flags;
        let semantic_prompt = src_row_ref.semantic_prompt;
        let mut new_cells = Vec::with_capacity(self.capacity.cols as usize);
        for cell in src_row_ref.cells() {
            let mut new_cell = *cell;
            match cell.content {
                CellContent::CodepointGrapheme(cp, gid) => {
                    if let Some(chars) = src.graphemes.lookup(gid) {
                        let chars_owned: Vec<char> = chars.to_vec();
                        let new_gid = self.graphemes.append(&chars_owned)?;
                        new_cell.content = CellContent::CodepointGrapheme(cp, new_gid);
                    }
                }
                _ => {}
            }
            if let Some(style_id) = cell.style_id {
                if let Some(style) = src.styles.get(style_id).cloned() {
                    let new_id = self.find_or_add_style(style)?;
                    new_cell.style_id = Some(new_id);
                }
            }
            if let Some(hid) = cell.hyperlink {
                if let Some(uri) = src.hyperlinks.lookup(hid) {
                    let new_id = self.find_or_add_hyperlink(uri)?;
                    new_cell.hyperlink = Some(new_id);
                }
            }
            new_cells.push(new_cell);
        }
        // Pad to capacity.
        new_cells.resize(self.capacity.cols as usize, Cell::default());
        let dst = &mut self.rows[dst_row as usize];
        dst.cells_mut().copy_from_slice(&new_cells);
        dst.flags = flags;
        dst.semantic_prompt = semantic_prompt;
        Ok(())
    }

    pub(crate) fn find_or_add_style(&mut self, style: Style) -> Result<StyleId> {
        for (id, (s, _)) in self.styles.entries.iter() {
            if *s == style {
                let id = *id;
                self.styles.use_(id);
                return Ok(id);
            }
        }
        self.styles.add(style)
    }

    fn find_or_add_hyperlink(&mut self, uri: &str) -> Result<HyperlinkId> {
        if let Some(id) = self.hyperlinks.get(uri) {
            self.hyperlinks.dupe(id);
            return Ok(id);
        }
        self.hyperlinks.add(uri)
    }

    pub fn dirty_bit_set(&self) -> &roaring::RoaringBitmap {
        &self.dirty
    }

    pub fn is_row_dirty(&self, y: u16) -> bool {
        self.dirty.contains(y as u32)
    }

    pub fn mark_dirty(&mut self, y: u16) {
        self.dirty.insert(y as u32);
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn pause_integrity_checks(&mut self, pause: bool) {
        self.integrity_paused = pause;
    }

    /// Debug-mode structural sanity check (spec invariants 7/8). No-op
    /// (besides the pause flag check) when checks are paused or in a
    /// release build without `debug_assertions`.
    pub fn assert_integrity(&self) -> Result<()> {
        if self.integrity_paused {
            return Ok(());
        }
        for y in 0..self.size.rows {
            let row = self.row(y);
            if row.wrap_continuation() && y == 0 {
                return Err(PageListError::IntegrityViolation(format!(
                    "row {y} is a wrap continuation but is the first row of its page"
                )));
            }
            let cols = self.size.cols;
            for x in 0..cols {
                let cell = self.cell(y, x);
                match cell.wide {
                    Wide::Wide => {
                        if x + 1 < cols {
                            let next = self.cell(y, x + 1);
                            if next.wide != Wide::SpacerTail {
                                return Err(PageListError::IntegrityViolation(format!(
                                    "wide cell at ({x},{y}) not followed by spacer tail"
                                )));
                            }
                        } else if !row.wrap() {
                            return Err(PageListError::IntegrityViolation(format!(
                                "wide cell at last column ({x},{y}) on a non-wrapped row"
                            )));
                        }
                    }
                    Wide::SpacerHead => {
                        if x + 1 != cols || !row.wrap() {
                            return Err(PageListError::IntegrityViolation(format!(
                                "spacer head at ({x},{y}) not at wrapped row's last column"
                            )));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
