//! Diagnostics (spec §6): dirty tracking, a human-readable diagram, and a
//! UTF-8 encoder for dumping screen content.

use std::fmt::Write as _;

use crate::iter::Direction;
use crate::page::CellContent;
use crate::page_list::PageList;
use crate::pin::Pin;

impl PageList {
    pub fn is_dirty(&self, pt: Pin) -> bool {
        self.page(pt.node).is_row_dirty(pt.y)
    }

    /// Clears every page's dirty bitset.
    pub fn clear_dirty(&mut self) {
        for id in self.nodes.iter_forward().collect::<Vec<_>>() {
            self.page_mut(id).clear_dirty();
        }
    }

    /// A compact, human-readable dump of the whole list: one text line
    /// per row, blank rows rendered empty, wide/spacer cells reduced to
    /// their visible glyph. Intended for test failure output, not for
    /// production rendering.
    pub fn diagram(&self) -> String {
        let mut out = String::new();
        for chunk in self.page_iterator(Direction::RightDown, self.top_left(), None) {
            let page = self.page(chunk.node);
            for y in chunk.start..chunk.end {
                let row = page.row(y);
                let mut line = String::new();
                for cell in row.cells() {
                    match cell.content {
                        CellContent::Codepoint(c) if c != '\0' => line.push(c),
                        CellContent::CodepointGrapheme(c, _) if c != '\0' => line.push(c),
                        _ => line.push(' '),
                    }
                }
                let marker = if row.wrap() { '\\' } else { ' ' };
                let _ = writeln!(out, "{line}{marker}");
            }
        }
        out
    }

    fn top_left(&self) -> Pin {
        Pin { node: self.first_node(), y: 0, x: 0 }
    }

    /// Walks chunks from `tl` through `br` (or the end of the list) and
    /// writes their visible text as UTF-8 to `sink`. When `unwrap` is
    /// set, rows flagged `wrap` are joined with the next row instead of a
    /// newline, reconstructing the original logical line; otherwise every
    /// physical row ends in `\n`.
    pub fn encode_utf8(
        &self,
        sink: &mut dyn std::io::Write,
        tl: Pin,
        br: Option<Pin>,
        unwrap: bool,
    ) -> std::io::Result<()> {
        for chunk in self.page_iterator(Direction::RightDown, tl, br) {
            let page = self.page(chunk.node);
            for y in chunk.start..chunk.end {
                let row = page.row(y);
                let mut buf = String::new();
                for cell in row.cells() {
                    match cell.content {
                        CellContent::Codepoint(c) if c != '\0' => buf.push(c),
                        CellContent::CodepointGrapheme(c, id) => {
                            buf.push(c);
                            if let Some(extra) = page.graphemes.lookup(id) {
                                buf.extend(extra.iter());
                            }
                        }
                        _ => {}
                    }
                }
                sink.write_all(buf.as_bytes())?;
                if !(unwrap && row.wrap()) {
                    sink.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }
}
