//! Toolbar-driven Markdown editor.
//!
//! Provides a rope-backed text buffer with character-offset selections,
//! the pure formatting operations behind the toolbar, and the editing
//! session that ties them to a host text widget.

mod buffer;
mod format;
mod session;

pub use buffer::{Edit, EditorBuffer, Selection};
pub use format::{
    FormatOp, ListKind, PLACEHOLDER, insert_heading, insert_horizontal_rule, insert_image,
    insert_list, insert_quote, wrap_selection,
};
pub use session::{ChangeListener, Editor, Tab, TextField, TextInput};
