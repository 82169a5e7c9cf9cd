//! Error taxonomy for the page list (spec §7).
//!
//! Only the operations that can actually fail return `Result`. `scroll`,
//! `erase*`, and pin rewriting are infallible by design and return plain
//! values.

use thiserror::Error;

/// Errors surfaced by page-list operations that allocate memory.
#[derive(Debug, Error)]
pub enum PageListError {
    /// The backing allocator (pool or page-aligned) could not satisfy a
    /// request. Surfaced from construction, `grow`, reflow, `adjust_capacity`,
    /// and `clone`.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A page's side table (styles, graphemes, hyperlinks) has no room
    /// for a new entry and the caller did not request capacity growth.
    /// The screen layer handles this by calling `adjust_capacity`.
    #[error("side table `{table}` is at capacity ({capacity})")]
    SideTableFull { table: &'static str, capacity: u32 },

    /// `Page::clone_from` or `Page::clone_row_from` failed because the
    /// destination page did not have room even after the caller checked
    /// capacity; indicates a logic error in the caller's chunking.
    #[error("page clone failed: {0}")]
    PageCloneFailed(&'static str),

    /// A debug-mode integrity check (`assert_integrity`) found a violated
    /// invariant. Fatal in debug builds, ignored in release.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}

pub type Result<T> = std::result::Result<T, PageListError>;
