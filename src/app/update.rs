use std::time::Instant;

use crate::app::Model;
use crate::app::model::{ImageField, IngestOutcome, ToastLevel};
use crate::editor::{FormatOp, Selection, Tab};
use crate::ingest::RequestToken;

/// All possible events and actions in the application.
///
/// These represent user input, host notifications, and results of work
/// done outside `update` (ingestion, draft saves).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editor
    /// Native edit in the text widget (typing, paste, native undo)
    Input(String),
    /// Caret moved or text highlighted in the widget
    Select(Selection),
    /// Toolbar button pressed
    Format(FormatOp),
    /// Write/Preview tab clicked
    SwitchTab(Tab),
    /// The host repainted the widget with the current buffer
    Rendered,
    /// Content replaced from outside the editor
    SetContent(String),

    // Form fields
    SetTitle(String),
    SetCategory(Option<String>),
    AddTag(String),
    RemoveTag(String),

    // Images
    /// An ingestion started with [`Model::begin_ingest`] resolved
    IngestCompleted {
        field: ImageField,
        token: RequestToken,
        outcome: IngestOutcome,
    },
    /// User removed the cover image
    RemoveCover,

    // Drafts
    /// The host stored the draft under this id
    DraftSaved(String),
    /// The host failed to store the draft
    SaveFailed(String),

    /// Periodic tick for toast expiry
    Tick(Instant),
}

/// Pure state transition: apply one message to the model.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Editor
        Message::Input(text) => {
            model.input.sync(&text);
            model.editor.input(&text, &mut model.form);
        }
        Message::Select(selection) => model.input.select(selection),
        Message::Format(op) => {
            model.editor.format(op, &model.input, &mut model.form);
        }
        Message::SwitchTab(tab) => model.editor.switch_tab(tab),
        Message::Rendered => {
            model.input.sync(&model.editor.text());
            model.editor.after_render(&mut model.input);
        }
        Message::SetContent(text) => {
            model.editor.set_content(&text);
            model.input.sync(&text);
            model.form.content = text;
        }

        // Form fields
        Message::SetTitle(title) => model.form.title = title,
        Message::SetCategory(category) => {
            model.form.category = category.filter(|c| !c.trim().is_empty());
        }
        Message::AddTag(tag) => {
            if !model.form.add_tag(&tag) {
                tracing::debug!(%tag, "tag ignored");
            }
        }
        Message::RemoveTag(tag) => {
            model.form.remove_tag(&tag);
        }

        // Images
        Message::IngestCompleted {
            field,
            token,
            outcome,
        } => {
            let Some(outcome) = model.slot_mut(&field).complete(token, outcome) else {
                return model;
            };
            apply_ingest_outcome(&mut model, field, outcome);
        }
        Message::RemoveCover => {
            model.cover_slot.invalidate();
            model.form.on_image_select(None);
        }

        // Drafts
        Message::DraftSaved(id) => {
            model.editor.buffer_mut().mark_clean();
            model.show_toast(ToastLevel::Info, format!("Draft saved as {id}"));
            model.draft_id = Some(id);
        }
        Message::SaveFailed(reason) => {
            model.show_toast(ToastLevel::Error, format!("Could not save draft: {reason}"));
        }

        Message::Tick(now) => {
            model.expire_toast(now);
        }
    }
    model
}

fn apply_ingest_outcome(model: &mut Model, field: ImageField, outcome: IngestOutcome) {
    let payload = match outcome {
        IngestOutcome::Ready(payload) => payload,
        IngestOutcome::Placeholder { payload, message } => {
            model.show_toast(ToastLevel::Error, message);
            payload
        }
        IngestOutcome::Rejected(message) => {
            model.show_toast(ToastLevel::Warning, message);
            return;
        }
    };
    match field {
        ImageField::Cover => model.form.on_image_select(Some(payload.into_string())),
        ImageField::Inline { alt } => {
            model
                .editor
                .insert_image(&alt, payload.as_str(), &model.input, &mut model.form);
        }
    }
}
