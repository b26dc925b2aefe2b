//! An editing session for one document field.

use crate::markdown::{self, RenderOptions};

use super::buffer::{Edit, EditorBuffer, Selection};
use super::format::{self, FormatOp};

/// The host text-input widget the editor reads selections from.
pub trait TextInput {
    /// The widget's current selection, or `None` if it is detached.
    fn selection(&self) -> Option<Selection>;
    /// The text the widget currently displays.
    fn text(&self) -> &str;
    /// Number of characters the widget currently displays.
    fn text_len(&self) -> usize {
        self.text().chars().count()
    }
    fn focus(&mut self);
    fn set_selection(&mut self, selection: Selection);
}

/// Receives a copy of the buffer after every mutation.
pub trait ChangeListener {
    fn on_change(&mut self, text: &str);
}

impl<F: FnMut(&str)> ChangeListener for F {
    fn on_change(&mut self, text: &str) {
        self(text);
    }
}

/// Editor tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Write,
    Preview,
}

/// In-memory text widget: what the host displays and where its selection is.
///
/// The widget only learns about new editor text when the host renders
/// ([`TextField::sync`]), which is why selections are restored afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    selection: Selection,
    focused: bool,
    attached: bool,
}

impl TextField {
    /// A mounted widget showing `text` with the caret at the end.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            selection: Selection::caret(text.chars().count()),
            focused: false,
            attached: true,
        }
    }

    /// A widget that is not mounted; reads yield no selection.
    pub fn detached() -> Self {
        Self::default()
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Display new text, as a host repaint does.
    pub fn sync(&mut self, text: &str) {
        self.text = text.to_string();
        self.attached = true;
        let len = self.text_len();
        self.selection = self.selection.clamp(len);
    }

    /// User moved the caret or highlighted text.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.text_len());
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }
}

impl TextInput for TextField {
    fn selection(&self) -> Option<Selection> {
        self.attached.then_some(self.selection)
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }
}

/// The authoritative buffer for one field plus tab and preview state.
///
/// There is no undo stack; the host widget's native undo applies.
pub struct Editor {
    buffer: EditorBuffer,
    tab: Tab,
    preview: String,
    pending_selection: Option<Selection>,
    render_options: RenderOptions,
}

impl Editor {
    /// Start a session from the caller-supplied initial content.
    pub fn new(initial: &str) -> Self {
        let render_options = RenderOptions::default();
        Self {
            buffer: EditorBuffer::from_text(initial),
            tab: Tab::Write,
            preview: markdown::render_with(initial, &render_options),
            pending_selection: None,
            render_options,
        }
    }

    /// Use specific render options for the preview.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self.refresh_preview();
        self
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub const fn tab(&self) -> Tab {
        self.tab
    }

    /// The most recently rendered preview HTML.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Selection waiting for the next render.
    pub const fn pending_selection(&self) -> Option<Selection> {
        self.pending_selection
    }

    /// Switch tabs. Entering the preview tab re-renders the buffer.
    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == Tab::Preview {
            self.refresh_preview();
        }
        tracing::debug!(from = ?self.tab, to = ?tab, "editor tab switched");
        self.tab = tab;
    }

    /// Overwrite the buffer from outside (one-way sync, no merge).
    ///
    /// The listener is not notified: the change came from the host.
    pub fn set_content(&mut self, text: &str) {
        if self.buffer.text() == text {
            return;
        }
        self.buffer = EditorBuffer::from_text(text);
        self.pending_selection = None;
        self.refresh_preview();
    }

    /// A native edit made in the host widget (typing, paste, native undo).
    ///
    /// Drops any queued selection: it described text the user has since
    /// replaced.
    pub fn input(&mut self, text: &str, listener: &mut impl ChangeListener) {
        self.buffer.set_text(text);
        self.pending_selection = None;
        self.changed(listener);
    }

    /// Run a toolbar operation against the widget's current selection.
    ///
    /// Returns the selection that will be restored by [`Self::after_render`].
    pub fn format(
        &mut self,
        op: FormatOp,
        input: &impl TextInput,
        listener: &mut impl ChangeListener,
    ) -> Selection {
        let selection = self.read_selection(input);
        let edit = op.edit(&self.buffer, selection);
        tracing::debug!(?op, ?selection, "applying format operation");
        self.apply(&edit, listener)
    }

    /// Insert an image reference at the widget's cursor.
    pub fn insert_image(
        &mut self,
        alt: &str,
        src: &str,
        input: &impl TextInput,
        listener: &mut impl ChangeListener,
    ) -> Selection {
        let selection = self.read_selection(input);
        let edit = format::insert_image(&self.buffer, selection, alt, src);
        self.apply(&edit, listener)
    }

    /// Apply an edit, notify the listener, and queue the selection hint.
    pub fn apply(&mut self, edit: &Edit, listener: &mut impl ChangeListener) -> Selection {
        self.buffer.apply(edit);
        self.pending_selection = Some(edit.selection);
        self.changed(listener);
        edit.selection
    }

    /// Continuation for "after the next render".
    ///
    /// Focuses the widget and applies the queued selection once the widget
    /// shows the current buffer. Returns `true` if a selection was applied.
    pub fn after_render(&mut self, input: &mut impl TextInput) -> bool {
        let Some(selection) = self.pending_selection else {
            return false;
        };
        if !self.buffer.matches(input.text()) {
            tracing::trace!(
                ?selection,
                widget_len = input.text_len(),
                "widget not yet updated, keeping selection pending"
            );
            return false;
        }
        input.focus();
        input.set_selection(selection);
        self.pending_selection = None;
        true
    }

    fn read_selection(&self, input: &impl TextInput) -> Selection {
        let len = self.buffer.len_chars();
        let Some(selection) = input.selection() else {
            return Selection::caret(len);
        };
        if selection.end > len {
            tracing::warn!(?selection, len, "selection outside buffer, clamping");
        }
        selection.clamp(len)
    }

    fn changed(&mut self, listener: &mut impl ChangeListener) {
        self.refresh_preview();
        let text = self.buffer.text();
        listener.on_change(&text);
    }

    fn refresh_preview(&mut self) {
        self.preview = markdown::render_with(&self.buffer.text(), &self.render_options);
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("buffer", &self.buffer)
            .field("tab", &self.tab)
            .field("pending_selection", &self.pending_selection)
            .finish_non_exhaustive()
    }
}
