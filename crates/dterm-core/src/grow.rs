//! Grow/prune engine (spec §4.4).

use tracing::trace;

use crate::error::Result;
use crate::node::NodeId;
use crate::page_list::{standard_capacity, PageList};
use crate::pin::Pin;

impl PageList {
    /// Extends the active area by one row. Returns the newly created
    /// node, or `None` if the tail page had spare capacity.
    pub fn grow(&mut self) -> Result<Option<NodeId>> {
        let tail = self.last_node();
        {
            let page = self.page_mut(tail);
            if page.size.rows < page.capacity.rows {
                page.size.rows += 1;
                return Ok(None);
            }
        }

        let std_cap = standard_capacity(self.cols);
        let would_be_size = self.page_size + crate::page::layout(&std_cap).total_size;
        let over_budget = would_be_size > self.max_size();
        let can_prune = self.nodes.len() > 1 && self.prune_head_is_safe();

        if over_budget && can_prune {
            trace!(page_size = self.page_size, max_size = self.max_size(), "grow: pruning head page");
            let old_head = self.nodes.first().expect("non-empty list");
            let new_head = self.nodes.move_front_to_back();
            debug_assert_eq!(old_head, new_head);
            {
                let page = self.page_mut(new_head);
                page.reinit();
                page.size.rows = 1;
            }
            let first = self.nodes.first().expect("non-empty list");
            self.pins.for_each_mut(|_, p| {
                if p.node == old_head {
                    Pin { node: first, y: 0, x: 0 }
                } else {
                    p
                }
            });
            return Ok(Some(new_head));
        }

        let mut page = self.pool.alloc_page(std_cap)?;
        page.size.rows = 1;
        self.page_size += page.memory_len();
        let id = self.nodes.push_back(page);
        trace!(page_size = self.page_size, "grow: allocated new tail page");
        Ok(Some(id))
    }

    /// Whether pruning the head page would still leave enough rows to
    /// cover the active area (spec §4.4 step 3).
    fn prune_head_is_safe(&self) -> bool {
        let head = self.nodes.first().expect("non-empty list");
        let head_rows = self.page(head).size.rows as usize;
        self.total_rows() - head_rows >= self.rows as usize
    }
}
