//! Page-list storage backbone for a terminal screen model (spec §1-§10).
//!
//! A [`PageList`] is a linked list of fixed-capacity [`Page`]s holding
//! scrollback plus the currently visible active area. It supports growth,
//! pruning under a memory budget, scrolling, erase, reflow, resize, stable
//! cross-mutation pins, and directional iteration. Everything outside this
//! module — parsing, rendering, and per-cell mutation policy — is the
//! screen layer's job.

mod clone;
mod diagnostics;
mod erase;
pub mod error;
mod grow;
mod iter;
mod node;
mod page;
mod page_list;
mod pin;
mod point;
mod pool;
mod reflow;
mod resize;
mod scroll;

pub use error::{PageListError, Result};
pub use iter::{CellIter, Chunk, Direction, PageIter, RowIter};
pub use node::{Node, NodeId, NodeIter, NodeList};
pub use page::{
    Capacity, Cell, CellContent, ContentTag, GraphemeId, GraphemeTable, HyperlinkId,
    HyperlinkTable, Layout, Page, Row, RowFlags, SemanticPrompt, Size, Style, StyleId, StyleTable,
    Wide, layout,
};
pub use page_list::{PageList, PageListConfig};
pub use pin::{Pin, PinId, PinRegistry, Viewport};
pub use point::{Point, PointTag};
pub use pool::{MemoryPool, PageAlignedAllocator, ResetMode};
pub use resize::ResizeRequest;
pub use scroll::ScrollTo;

#[cfg(test)]
mod tests;
