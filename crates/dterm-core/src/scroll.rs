//! Scroll engine and viewport transitions (spec §4.6, §4.11).

use tracing::trace;

use crate::error::Result;
use crate::page::SemanticPrompt;
use crate::page_list::PageList;
use crate::pin::{Pin, Viewport};

/// Requested scroll target (spec §6 `scroll({...})`).
#[derive(Debug, Clone, Copy)]
pub enum ScrollTo {
    Active,
    Top,
    Pin(Pin),
    DeltaRow(i64),
    DeltaPrompt(i64),
}

impl PageList {
    /// The pin at the current viewport's top-left, regardless of which
    /// state the viewport is in.
    pub fn viewport_top_left(&self) -> Pin {
        match self.viewport {
            Viewport::Active => self.active_top(),
            Viewport::Top => Pin {
                node: self.first_node(),
                y: 0,
                x: 0,
            },
            Viewport::Pin => self.pin_value(self.viewport_pin_id()),
        }
    }

    /// Repositions the viewport selector. Never allocates, never creates
    /// scrollback (spec §4.6).
    pub fn scroll(&mut self, to: ScrollTo) -> Result<()> {
        match to {
            ScrollTo::Active => {
                trace!("scroll: active");
                self.viewport = Viewport::Active;
            }
            ScrollTo::Top => {
                trace!("scroll: top");
                self.viewport = Viewport::Top;
            }
            ScrollTo::Pin(p) => self.scroll_to_pin(p),
            ScrollTo::DeltaRow(n) => self.scroll_delta_row(n),
            ScrollTo::DeltaPrompt(n) => self.scroll_delta_prompt(n),
        }
        Ok(())
    }

    fn scroll_to_pin(&mut self, target: Pin) {
        if self.pin_is_active(target) {
            self.viewport = Viewport::Active;
        } else {
            self.viewport = Viewport::Pin;
            self.pins.set(self.viewport_pin, target);
        }
    }

    /// Walks up/down `n` rows from the current viewport top-left (spec
    /// §4.6 `delta_row`).
    fn scroll_delta_row(&mut self, n: i64) {
        let start = self.viewport_top_left();
        let target = self.walk_rows(start, n);
        self.scroll_to_pin(target);
    }

    /// Walks `n` rows forward (positive) or backward (negative) from
    /// `start`, clamping at either end of the list.
    fn walk_rows(&self, start: Pin, n: i64) -> Pin {
        let mut pos = (start.node, start.y);
        if n >= 0 {
            for _ in 0..n {
                match PageList::step(&self.nodes, pos.0, pos.1) {
                    Some(next) => pos = next,
                    None => break,
                }
            }
        } else {
            for _ in 0..(-n) {
                match PageList::step_back(&self.nodes, pos.0, pos.1) {
                    Some(next) => pos = next,
                    None => break,
                }
            }
        }
        Pin {
            node: pos.0,
            y: pos.1,
            x: start.x,
        }
    }

    /// Scans rows counting semantic-prompt transitions, stopping when the
    /// count reaches `|n|`, then behaves as `delta_row` to that row (spec
    /// §4.6 `delta_prompt`).
    fn scroll_delta_prompt(&mut self, n: i64) {
        let start = self.viewport_top_left();
        let mut pos = (start.node, start.y);
        let mut found = 0i64;
        let is_prompt_row = |pl: &PageList, node, y| {
            matches!(
                pl.page(node).row(y).semantic_prompt,
                SemanticPrompt::Prompt | SemanticPrompt::PromptContinuation | SemanticPrompt::Input
            )
        };
        if n >= 0 {
            while found < n {
                match PageList::step(&self.nodes, pos.0, pos.1) {
                    Some(next) => {
                        pos = next;
                        if is_prompt_row(self, pos.0, pos.1) {
                            found += 1;
                        }
                    }
                    None => break,
                }
            }
        } else {
            while found < -n {
                match PageList::step_back(&self.nodes, pos.0, pos.1) {
                    Some(next) => {
                        pos = next;
                        if is_prompt_row(self, pos.0, pos.1) {
                            found += 1;
                        }
                    }
                    None => break,
                }
            }
        }
        let target = Pin {
            node: pos.0,
            y: pos.1,
            x: start.x,
        };
        self.scroll_to_pin(target);
    }

    /// Counts trailing blank rows in the active area and `grow()`s once
    /// per non-blank row above the bottom, so the bottom line (and
    /// nothing above it) stays visible and everything else moves to
    /// scrollback (spec §4.6 `scrollClear`).
    pub fn scroll_clear(&mut self) -> Result<()> {
        trace!("scroll_clear");
        let mut pos = (
            self.last_node(),
            self.page(self.last_node()).size.rows.saturating_sub(1),
        );
        let mut trailing_blank = 0u16;
        loop {
            if trailing_blank >= self.rows || !self.page(pos.0).row(pos.1).is_blank() {
                break;
            }
            trailing_blank += 1;
            match PageList::step_back(&self.nodes, pos.0, pos.1) {
                Some(prev) => pos = prev,
                None => break,
            }
        }
        let rows_to_push = (self.rows as u32).saturating_sub(trailing_blank as u32 + 1);
        for _ in 0..rows_to_push {
            self.grow()?;
        }
        Ok(())
    }
}
