use std::ops::Range;

use ropey::Rope;

/// A `(start, end)` pair of character offsets into an [`EditorBuffer`].
///
/// `start <= end` always holds; constructors normalize reversed offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection, swapping the offsets if they are reversed.
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// An empty selection (a caret) at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Whether no characters are selected.
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Number of selected characters.
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Clamp both offsets to a buffer of `len` characters.
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }

    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// A replacement of one selection by new text, plus where the selection
/// should land once the replacement is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The characters being replaced (empty for a pure insertion).
    pub replace: Selection,
    /// Text inserted in place of `replace`.
    pub insert: String,
    /// Selection to restore after the edit.
    pub selection: Selection,
}

impl Edit {
    /// Apply this edit to a plain string, returning the new text.
    ///
    /// Offsets are character offsets, matching [`EditorBuffer`].
    pub fn apply_to(&self, text: &str) -> String {
        let byte_at = |offset: usize| {
            text.char_indices()
                .nth(offset)
                .map_or(text.len(), |(idx, _)| idx)
        };
        let start = byte_at(self.replace.start);
        let end = byte_at(self.replace.end);
        let mut out = String::with_capacity(text.len() + self.insert.len());
        out.push_str(&text[..start]);
        out.push_str(&self.insert);
        out.push_str(&text[end..]);
        out
    }
}

/// The Markdown source of one document field, backed by a rope.
pub struct EditorBuffer {
    rope: Rope,
    dirty: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            dirty: false,
        }
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after the form saved a draft).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The selected text; offsets past the end are clamped.
    pub fn slice(&self, selection: Selection) -> String {
        let selection = selection.clamp(self.len_chars());
        self.rope.slice(selection.range()).to_string()
    }

    /// Whether the buffer holds exactly `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.rope == text
    }

    /// Replace the whole buffer.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.dirty = true;
    }

    /// Apply an edit produced by a formatting operation.
    pub fn apply(&mut self, edit: &Edit) {
        let replace = edit.replace.clamp(self.len_chars());
        if !replace.is_empty() {
            self.rope.remove(replace.range());
        }
        if !edit.insert.is_empty() {
            self.rope.insert(replace.start, &edit.insert);
        }
        self.dirty = true;
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!(
                    "Rope({} chars, {} lines)",
                    self.rope.len_chars(),
                    self.rope.len_lines()
                ),
            )
            .field("dirty", &self.dirty)
            .finish()
    }
}
