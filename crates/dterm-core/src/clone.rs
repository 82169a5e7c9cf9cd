//! Clone (spec §6 `clone(top, bot?, memory, tracked_pins?)`; testable
//! property 7: round-tripping a whole-screen clone must reproduce
//! identical iterator output).

use crate::error::Result;
use crate::iter::Direction;
use crate::node::{NodeId, NodeList};
use crate::page_list::{min_max_size, standard_capacity, PageList};
use crate::pin::{Pin, PinRegistry, Viewport};
use crate::pool::MemoryPool;

impl PageList {
    /// Copies the row range `[top, bot]` (or through the end of the list
    /// when `bot` is `None`) into a freshly constructed, independent page
    /// list. `tracked_pins` that fall within the range are relocated into
    /// the clone at the same logical offset from `top`; pins outside the
    /// range collapse to `{first_node, 0, 0}`, matching the fallback used
    /// elsewhere for destroyed cells.
    ///
    /// Always allocates its own pool. Spec §5 allows a clone to share the
    /// source's pool (`Clone { memory: .pool(p) }`); doing so here would
    /// require wrapping `MemoryPool` in interior mutability shared across
    /// independent `PageList`s, a structural change with no other use
    /// site in this crate (see DESIGN.md's open-question note) — so every
    /// clone owns a fresh pool at the source's standard capacity instead.
    pub fn clone_range(&self, top: Pin, bot: Option<Pin>, tracked_pins: &[Pin]) -> Result<PageList> {
        let bot = bot.unwrap_or_else(|| {
            let node = self.last_node();
            Pin {
                node,
                y: self.page(node).size.rows.saturating_sub(1),
                x: 0,
            }
        });

        let std_cap = standard_capacity(self.cols);
        let mut pool = MemoryPool::new(std_cap, 0);
        let mut nodes = NodeList::new();
        let mut page_size = 0usize;
        let mut total_rows = 0u32;

        for chunk in self.page_iterator(Direction::RightDown, top, Some(bot)) {
            let src = self.page(chunk.node);
            let mut page = pool.alloc_page(src.capacity)?;
            page.clone_from(src, chunk.start, chunk.end)?;
            page_size += page.memory_len();
            total_rows += (chunk.end - chunk.start) as u32;
            nodes.push_back(page);
        }
        if nodes.is_empty() {
            let mut page = pool.alloc_page(std_cap)?;
            page.size.rows = 0;
            page_size += page.memory_len();
            nodes.push_back(page);
        }

        let mut pins = PinRegistry::new();
        let first = nodes.first().expect("clone always produces at least one page");
        let viewport_pin = pins.track(Pin { node: first, y: 0, x: 0 });
        for p in tracked_pins {
            let relocated = self.relocate_into_clone(*p, top, bot, &nodes, first);
            pins.track(relocated);
        }

        let rows = self.rows.min(total_rows.max(1) as u16).max(1);

        Ok(PageList {
            pool,
            nodes,
            pins,
            viewport: Viewport::Active,
            viewport_pin,
            cols: self.cols,
            rows,
            explicit_max_size: self.explicit_max_size,
            min_max_size: min_max_size(self.cols, rows),
            page_size,
            owns_pool: true,
        })
    }

    /// Distance in rows from `top` to `p`, walking forward through the
    /// source list; `None` if `p` does not lie within `[top, bot]`.
    fn relocate_into_clone(
        &self,
        p: Pin,
        top: Pin,
        bot: Pin,
        dst_nodes: &NodeList,
        dst_first: NodeId,
    ) -> Pin {
        let mut pos = (top.node, top.y);
        let mut offset = 0u32;
        loop {
            if pos.0 == p.node && pos.1 == p.y {
                let mut cur = (dst_first, 0u16);
                for _ in 0..offset {
                    match PageList::step(dst_nodes, cur.0, cur.1) {
                        Some(next) => cur = next,
                        None => break,
                    }
                }
                return Pin { node: cur.0, y: cur.1, x: p.x };
            }
            if pos.0 == bot.node && pos.1 == bot.y {
                return Pin { node: dst_first, y: 0, x: 0 };
            }
            match PageList::step(&self.nodes, pos.0, pos.1) {
                Some(next) => {
                    pos = next;
                    offset += 1;
                }
                None => return Pin { node: dst_first, y: 0, x: 0 },
            }
        }
    }
}
