//! Source positions (spec.md §3 "Source range").
//!
//! A [`SourceRange`] is an opaque pair of positions inside one named text
//! buffer. It is totally ordered *within a buffer* and carries no
//! ownership of the buffer's contents — the buffer lives in a
//! [`SourceMap`] that outlives every range pointing into it.

use crate::index_vec::{Idx, IndexVec};
use crate::define_idx;

define_idx!(
    /// Identifies one named source buffer inside a [`SourceMap`].
    BufferId
);

/// A byte offset within a single buffer.
pub type Offset = u32;

/// An opaque `[start, end)` byte range inside one buffer.
///
/// Equality and ordering only ever compare `(buffer, start)` — two ranges
/// from different buffers are never ordered against each other beyond
/// that, matching spec.md §3: "Totally ordered within one buffer;
/// equality compares (buffer identity, offset)."
#[derive(Clone, Copy, Debug)]
pub struct SourceRange {
    pub buffer: BufferId,
    pub start: Offset,
    pub end: Offset,
}

impl SourceRange {
    pub fn new(buffer: BufferId, start: Offset, end: Offset) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self { buffer, start, end }
    }

    /// A range with no real location, used for synthetic nodes (e.g. the
    /// compiler-inserted `main-code` wrapper declaration).
    pub fn synthetic() -> Self {
        Self { buffer: BufferId(u32::MAX), start: 0, end: 0 }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }
}

impl PartialEq for SourceRange {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer && self.start == other.start
    }
}
impl Eq for SourceRange {}

impl PartialOrd for SourceRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.buffer.0, self.start).cmp(&(other.buffer.0, other.start))
    }
}

impl std::hash::Hash for SourceRange {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.buffer.hash(state);
        self.start.hash(state);
    }
}

/// One named text buffer, and the line-start table used to turn an offset
/// back into (line, column) for display.
pub struct SourceBuffer {
    pub name: String,
    pub text: String,
    line_starts: Vec<Offset>,
}

impl SourceBuffer {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as Offset);
            }
        }
        Self { name: name.into(), text, line_starts }
    }

    /// 1-based (line, column) for a byte offset into this buffer.
    pub fn line_col(&self, offset: Offset) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }
}

/// Owns every buffer admitted to a compilation, keyed by [`BufferId`].
#[derive(Default)]
pub struct SourceMap {
    buffers: IndexVec<BufferId, SourceBuffer>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_buffer(&mut self, name: impl Into<String>, text: impl Into<String>) -> BufferId {
        self.buffers.push(SourceBuffer::new(name, text))
    }

    pub fn buffer(&self, id: BufferId) -> &SourceBuffer {
        &self.buffers[id]
    }

    /// Render a range as `name:line:col`, or `<synthetic>` for
    /// [`SourceRange::synthetic`].
    pub fn describe(&self, range: SourceRange) -> String {
        if range.buffer.0 == u32::MAX {
            return "<synthetic>".to_string();
        }
        let buffer = self.buffer(range.buffer);
        let (line, col) = buffer.line_col(range.start);
        format!("{}:{}:{}", buffer.name, line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_order_by_buffer_then_start() {
        let mut map = SourceMap::new();
        let a = map.add_buffer("a.ward", "");
        let b = map.add_buffer("b.ward", "");
        let r1 = SourceRange::new(a, 10, 20);
        let r2 = SourceRange::new(a, 5, 8);
        let r3 = SourceRange::new(b, 0, 1);
        assert!(r2 < r1);
        assert!(r1 < r3);
    }

    #[test]
    fn equality_ignores_end_offset() {
        let mut map = SourceMap::new();
        let a = map.add_buffer("a.ward", "");
        let r1 = SourceRange::new(a, 0, 5);
        let r2 = SourceRange::new(a, 0, 50);
        assert_eq!(r1, r2);
    }

    #[test]
    fn line_col_tracks_newlines() {
        let mut map = SourceMap::new();
        let id = map.add_buffer("a.ward", "let x = 1\nlet y = 2\n");
        let buffer = map.buffer(id);
        assert_eq!(buffer.line_col(0), (1, 1));
        assert_eq!(buffer.line_col(11), (2, 1));
    }
}
