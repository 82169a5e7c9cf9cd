//! Memory pool (spec §4.1): three sub-pools over one owning allocator.
//!
//! Standard-capacity page buffers are pooled directly as free [`Page`]
//! objects (§4.1's "fixed-size page buffers" sub-pool); the node and pin
//! sub-pools are the free lists already built into [`crate::node::NodeList`]
//! and [`crate::pin::PinRegistry`] — an arena's free list *is* an object
//! pool, so there is no separate type for them here (see DESIGN.md).
//!
//! Page buffers additionally go through a page-aligned, zero-on-fetch
//! allocator, modeled here with `memmap2` anonymous mappings (the OS
//! guarantees zeroed pages on first fault) and `libc::sysconf` for the
//! real page size, matching spec §4.1's "typically the OS page allocator"
//! note.

use tracing::trace;

use crate::error::{PageListError, Result};
use crate::page::{layout, Capacity, Page};

/// How `MemoryPool::reset` disposes of pooled buffers (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Drop every pooled buffer.
    FreeAll,
    /// Keep every pooled buffer.
    RetainCapacity,
    /// Keep pooled buffers up to a byte budget, freeing the rest.
    RetainWithLimit(usize),
}

/// Thin wrapper around the page-aligned allocator. Oversize page buffers
/// (capacity beyond `std_size`) are allocated and freed directly here,
/// never pooled (spec §4.1: "non-standard-sized page buffers ... are freed
/// directly on the page-aligned allocator").
#[derive(Debug)]
pub struct PageAlignedAllocator {
    os_page_size: usize,
}

impl PageAlignedAllocator {
    pub fn new() -> Self {
        let os_page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        PageAlignedAllocator {
            os_page_size: if os_page_size > 0 {
                os_page_size as usize
            } else {
                4096
            },
        }
    }

    pub fn os_page_size(&self) -> usize {
        self.os_page_size
    }

    /// Allocates `size` bytes, rounded up to a whole number of OS pages,
    /// zeroed by the kernel on first fault.
    pub fn alloc(&self, size: usize) -> Result<memmap2::MmapMut> {
        let rounded = size.div_ceil(self.os_page_size) * self.os_page_size;
        let rounded = rounded.max(self.os_page_size);
        memmap2::MmapMut::map_anon(rounded).map_err(|_| PageListError::OutOfMemory {
            requested: rounded,
        })
    }
}

impl Default for PageAlignedAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Three sub-pools over a single owning allocator (spec §4.1).
#[derive(Debug)]
pub struct MemoryPool {
    page_allocator: PageAlignedAllocator,
    std_capacity: Capacity,
    /// Reusable standard-capacity pages, paired with the raw page-aligned
    /// reservation backing them (kept for zero-on-fetch accounting; the
    /// page's real storage lives in the `Page` itself).
    free_std_pages: Vec<(Page, memmap2::MmapMut)>,
}

impl MemoryPool {
    pub fn new(std_capacity: Capacity, preheat: usize) -> Self {
        let mut pool = MemoryPool {
            page_allocator: PageAlignedAllocator::new(),
            std_capacity,
            free_std_pages: Vec::new(),
        };
        pool.preheat(preheat);
        pool
    }

    pub fn std_capacity(&self) -> Capacity {
        self.std_capacity
    }

    /// Repoints the pool's notion of "standard capacity" after a column
    /// change (reflow or column-only resize). Pages pooled under the old
    /// capacity no longer qualify as standard and are dropped rather than
    /// kept around at a width nothing will request again.
    pub fn set_std_capacity(&mut self, cap: Capacity) {
        self.std_capacity = cap;
        self.free_std_pages.clear();
    }

    pub fn preheat(&mut self, count: usize) {
        for _ in 0..count {
            if let Ok(buf) = self.page_allocator.alloc(layout(&self.std_capacity).total_size) {
                self.free_std_pages.push((Page::new(self.std_capacity), buf));
            }
        }
    }

    /// Returns a zero-initialized page at `cap`. Standard-capacity
    /// requests are served from the free list when possible; anything
    /// else (including standard capacity with an empty free list) is
    /// allocated fresh.
    pub fn alloc_page(&mut self, cap: Capacity) -> Result<Page> {
        if cap == self.std_capacity {
            if let Some((mut page, mut buf)) = self.free_std_pages.pop() {
                // The pool elides OS re-zeroing on retained slabs; mirror
                // that here by not trusting the mmap's prior contents and
                // re-zeroing explicitly, then clearing the page's own
                // logical state, before handing it back out.
                buf.fill(0);
                page.reinit();
                return Ok(page);
            }
        }
        let size = layout(&cap).total_size;
        let _raw = self.page_allocator.alloc(size)?;
        trace!(cols = cap.cols, rows = cap.rows, size, "allocated page buffer outside pool");
        Ok(Page::new(cap))
    }

    /// Returns `page` to the pool if it is standard capacity, zeroing its
    /// buffer before storage; otherwise frees it directly on the
    /// page-aligned allocator (spec §4.2 `destroyNode`).
    pub fn free_page(&mut self, mut page: Page) {
        if page.capacity == self.std_capacity {
            page.reinit();
            if let Ok(buf) = self
                .page_allocator
                .alloc(layout(&self.std_capacity).total_size)
            {
                self.free_std_pages.push((page, buf));
            }
        }
        // Oversize pages are simply dropped; their mmap-backed accounting
        // reservation (if any) was never retained.
    }

    pub fn reset(&mut self, mode: ResetMode) {
        match mode {
            ResetMode::FreeAll => {
                trace!(count = self.free_std_pages.len(), "pool: freeing all retained pages");
                self.free_std_pages.clear();
            }
            ResetMode::RetainCapacity => {
                trace!(count = self.free_std_pages.len(), "pool: retaining all pooled pages");
            }
            ResetMode::RetainWithLimit(bytes) => {
                let per_page = layout(&self.std_capacity).total_size.max(1);
                let keep = bytes / per_page;
                trace!(keep, total = self.free_std_pages.len(), "pool: retaining with limit");
                self.free_std_pages.truncate(keep);
            }
        }
    }

    pub fn pooled_count(&self) -> usize {
        self.free_std_pages.len()
    }
}
