use std::time::{Duration, Instant};

use crate::editor::{ChangeListener, Editor, TextField};
use crate::ingest::{IngestError, IngestSlot, Ingested, ImagePayload, RequestToken};
use crate::markdown::RenderOptions;
use crate::store::{Draft, slugify};

/// Severity of a toast shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Where an ingested image ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageField {
    /// The post's cover image.
    Cover,
    /// A Markdown image inserted at the editor cursor.
    Inline { alt: String },
}

/// What the host reports back once an ingestion resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ready(ImagePayload),
    /// Processing failed; store the placeholder and tell the user.
    Placeholder { payload: ImagePayload, message: String },
    /// Nothing to store.
    Rejected(String),
}

impl From<Result<Ingested, IngestError>> for IngestOutcome {
    fn from(result: Result<Ingested, IngestError>) -> Self {
        match result {
            Ok(ingested) => Self::Ready(ingested.payload),
            Err(err) => match err.placeholder() {
                Some(payload) => Self::Placeholder {
                    payload,
                    message: err.user_message(),
                },
                None => Self::Rejected(err.user_message()),
            },
        }
    }
}

/// The post being edited: the fields the editor and pipeline feed into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    changes: usize,
}

impl PostForm {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            ..Self::default()
        }
    }

    /// Initial image from an existing post (URL or data URI).
    #[must_use]
    pub fn with_initial_image(mut self, image: Option<&str>) -> Self {
        self.cover_image = image.map(str::to_string);
        self
    }

    /// Cover image chosen, replaced, or removed (`None`).
    pub fn on_image_select(&mut self, image: Option<String>) {
        self.cover_image = image;
    }

    /// Number of content changes received from the editor.
    pub const fn change_count(&self) -> usize {
        self.changes
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn to_draft(&self, id: Option<&str>) -> Draft {
        let mut draft = Draft::new(&self.title, &self.content);
        if let Some(id) = id {
            draft.id = id.to_string();
        }
        draft.cover_image.clone_from(&self.cover_image);
        draft.category.clone_from(&self.category);
        draft.tags.clone_from(&self.tags);
        draft
    }
}

impl From<&Draft> for PostForm {
    fn from(draft: &Draft) -> Self {
        Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            cover_image: draft.cover_image.clone(),
            category: draft.category.clone(),
            tags: draft.tags.clone(),
            changes: 0,
        }
    }
}

impl ChangeListener for PostForm {
    fn on_change(&mut self, text: &str) {
        text.clone_into(&mut self.content);
        self.changes += 1;
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug)]
pub struct Model {
    pub editor: Editor,
    /// The host's text widget.
    pub input: TextField,
    pub form: PostForm,
    pub cover_slot: IngestSlot,
    pub inline_slot: IngestSlot,
    /// Id of the draft this form was loaded from or last saved as.
    pub draft_id: Option<String>,
    toast: Option<Toast>,
}

impl Model {
    pub fn new(form: PostForm, render_options: RenderOptions) -> Self {
        let editor = Editor::new(&form.content).with_render_options(render_options);
        Self {
            input: TextField::new(&form.content),
            editor,
            form,
            cover_slot: IngestSlot::default(),
            inline_slot: IngestSlot::default(),
            draft_id: None,
            toast: None,
        }
    }

    pub fn from_draft(draft: &Draft, render_options: RenderOptions) -> Self {
        let mut model = Self::new(PostForm::from(draft), render_options);
        model.draft_id = Some(draft.id.clone());
        model
    }

    /// Form for saving `content` under `title`.
    ///
    /// When a draft with the same id already exists its cover, category and
    /// tags carry over, so re-saving only replaces what the caller supplies.
    pub fn for_save(
        title: &str,
        content: &str,
        existing: Option<&Draft>,
        render_options: RenderOptions,
    ) -> Self {
        let Some(existing) = existing else {
            return Self::new(PostForm::new(title, content), render_options);
        };
        let form = PostForm {
            category: existing.category.clone(),
            tags: existing.tags.clone(),
            ..PostForm::new(title, content)
        }
        .with_initial_image(existing.cover_image.as_deref());
        let mut model = Self::new(form, render_options);
        model.draft_id = Some(existing.id.clone());
        model
    }

    /// Issue a token for a new ingestion into `field`.
    ///
    /// The host runs the pipeline and reports back with
    /// [`super::Message::IngestCompleted`] carrying this token.
    pub fn begin_ingest(&mut self, field: &ImageField) -> RequestToken {
        self.slot_mut(field).begin()
    }

    pub(super) fn slot_mut(&mut self, field: &ImageField) -> &mut IngestSlot {
        match field {
            ImageField::Cover => &mut self.cover_slot,
            ImageField::Inline { .. } => &mut self.inline_slot,
        }
    }

    /// Draft id to save under: the loaded one, or a slug of the title.
    pub fn save_id(&self) -> String {
        self.draft_id
            .clone()
            .unwrap_or_else(|| slugify(&self.form.title))
    }

    pub fn to_draft(&self) -> Draft {
        self.form.to_draft(Some(&self.save_id()))
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
