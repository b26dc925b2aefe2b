//! Toolbar formatting operations.
//!
//! Each operation is a pure function of the buffer and the current selection
//! and yields an [`Edit`]. Nothing here mutates the buffer.

use super::buffer::{Edit, EditorBuffer, Selection};

/// Inserted (and re-selected) when an operation runs without a selection.
pub const PLACEHOLDER: &str = "text";

const BULLETED_EXAMPLE: &str = "\n- Item 1\n- Item 2\n- Item 3\n";
const NUMBERED_EXAMPLE: &str = "\n1. Item 1\n2. Item 2\n3. Item 3\n";
const QUOTE_EXAMPLE: &str = "\n> This is a quote\n";
const HORIZONTAL_RULE: &str = "\n\n---\n\n";

/// List flavour for [`insert_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bulleted,
    Numbered,
}

/// Formatting actions available on the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOp {
    Bold,
    Italic,
    /// Heading level, clamped to 1–3.
    Heading(u8),
    BulletedList,
    NumberedList,
    InlineCode,
    CodeBlock,
    Blockquote,
    Link,
    HorizontalRule,
}

impl FormatOp {
    /// Compute the edit for this operation.
    pub fn edit(self, buffer: &EditorBuffer, selection: Selection) -> Edit {
        match self {
            Self::Bold => wrap_selection(buffer, selection, "**", "**"),
            Self::Italic => wrap_selection(buffer, selection, "*", "*"),
            Self::Heading(level) => insert_heading(buffer, selection, level),
            Self::BulletedList => insert_list(buffer, selection, ListKind::Bulleted),
            Self::NumberedList => insert_list(buffer, selection, ListKind::Numbered),
            Self::InlineCode => wrap_selection(buffer, selection, "`", "`"),
            Self::CodeBlock => wrap_selection(buffer, selection, "\n```\n", "\n```\n"),
            Self::Blockquote => insert_quote(buffer, selection),
            Self::Link => wrap_selection(buffer, selection, "[", "](url)"),
            Self::HorizontalRule => insert_horizontal_rule(selection),
        }
    }

    /// Parse a toolbar/CLI name such as `bold`, `h2` or `numbered-list`.
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "list" | "bulleted-list" => Self::BulletedList,
            "numbered-list" => Self::NumberedList,
            "code" => Self::InlineCode,
            "code-block" => Self::CodeBlock,
            "quote" => Self::Blockquote,
            "link" => Self::Link,
            "hr" => Self::HorizontalRule,
            _ => return None,
        };
        Some(op)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Wrap the selection in `before`/`after`.
///
/// With a selection, the selected text stays selected inside the markers.
/// Without one, [`PLACEHOLDER`] is inserted between the markers and selected
/// so typing replaces it.
pub fn wrap_selection(
    buffer: &EditorBuffer,
    selection: Selection,
    before: &str,
    after: &str,
) -> Edit {
    let selection = selection.clamp(buffer.len_chars());
    let inner = if selection.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        buffer.slice(selection)
    };
    let inner_start = selection.start + char_len(before);
    Edit {
        replace: selection,
        selection: Selection::new(inner_start, inner_start + char_len(&inner)),
        insert: format!("{before}{inner}{after}"),
    }
}

/// Prefix a newline and `level` hashes before the selection (or placeholder).
pub fn insert_heading(buffer: &EditorBuffer, selection: Selection, level: u8) -> Edit {
    let hashes = "#".repeat(usize::from(level.clamp(1, 3)));
    wrap_selection(buffer, selection, &format!("\n{hashes} "), "")
}

/// Prefix every selected line with a list marker, or insert an example list.
pub fn insert_list(buffer: &EditorBuffer, selection: Selection, kind: ListKind) -> Edit {
    let selection = selection.clamp(buffer.len_chars());
    if selection.is_empty() {
        let example = match kind {
            ListKind::Bulleted => BULLETED_EXAMPLE,
            ListKind::Numbered => NUMBERED_EXAMPLE,
        };
        return insert_at_caret(selection.start, example);
    }
    let selected = buffer.slice(selection);
    let lines: Vec<String> = selected
        .split('\n')
        .enumerate()
        .map(|(i, line)| match kind {
            ListKind::Bulleted => format!("- {line}"),
            ListKind::Numbered => format!("{}. {line}", i + 1),
        })
        .collect();
    replace_lines(selection, &lines.join("\n"))
}

/// Prefix every selected line with `> `, or insert an example quote.
pub fn insert_quote(buffer: &EditorBuffer, selection: Selection) -> Edit {
    let selection = selection.clamp(buffer.len_chars());
    if selection.is_empty() {
        return insert_at_caret(selection.start, QUOTE_EXAMPLE);
    }
    let quoted: Vec<String> = buffer
        .slice(selection)
        .split('\n')
        .map(|line| format!("> {line}"))
        .collect();
    replace_lines(selection, &quoted.join("\n"))
}

/// Insert a horizontal rule at the cursor, leaving any selected text alone.
pub fn insert_horizontal_rule(selection: Selection) -> Edit {
    insert_at_caret(selection.start, HORIZONTAL_RULE)
}

/// Insert a Markdown image reference on its own line, replacing the selection.
pub fn insert_image(buffer: &EditorBuffer, selection: Selection, alt: &str, src: &str) -> Edit {
    let selection = selection.clamp(buffer.len_chars());
    let insert = format!("\n![{alt}]({src})\n");
    let end = selection.start + char_len(&insert);
    Edit {
        replace: selection,
        insert,
        selection: Selection::caret(end),
    }
}

fn insert_at_caret(offset: usize, text: &str) -> Edit {
    Edit {
        replace: Selection::caret(offset),
        insert: text.to_string(),
        selection: Selection::caret(offset + char_len(text)),
    }
}

fn replace_lines(selection: Selection, replacement: &str) -> Edit {
    Edit {
        replace: selection,
        selection: Selection::new(selection.start, selection.start + char_len(replacement)),
        insert: replacement.to_string(),
    }
}
