use std::time::{Duration, Instant};

use crate::editor::{FormatOp, Selection, Tab, TextInput};
use crate::ingest::{CodecError, ImagePayload, IngestError};
use crate::markdown::RenderOptions;
use crate::store::Draft;

use super::{ImageField, IngestOutcome, Message, Model, PostForm, ToastLevel, update};

fn create_test_model(content: &str) -> Model {
    Model::new(PostForm::new("My Post", content), RenderOptions::default())
}

fn data_uri() -> ImagePayload {
    ImagePayload::data_uri("image/png", b"png bytes")
}

#[test]
fn test_format_updates_form_through_change_notification() {
    let model = create_test_model("hello world");
    let model = update(model, Message::Select(Selection::new(6, 11)));
    let model = update(model, Message::Format(FormatOp::Bold));

    assert_eq!(model.form.content, "hello **world**");
    assert_eq!(model.form.change_count(), 1);
    assert!(model.editor.preview().contains("<strong>world</strong>"));
}

#[test]
fn test_selection_restored_after_render_message() {
    let model = create_test_model("");
    let model = update(model, Message::Format(FormatOp::Link));
    assert_eq!(model.form.content, "[text](url)");
    assert_eq!(model.editor.pending_selection(), Some(Selection::new(1, 5)));

    let model = update(model, Message::Rendered);
    assert_eq!(model.input.text(), "[text](url)");
    assert_eq!(model.input.selection(), Some(Selection::new(1, 5)));
    assert!(model.input.is_focused());
    assert!(model.editor.pending_selection().is_none());
}

#[test]
fn test_typing_flows_into_form() {
    let model = create_test_model("");
    let model = update(model, Message::Input("# Draft".to_string()));
    assert_eq!(model.form.content, "# Draft");
    assert!(model.editor.preview().contains("<h1>Draft</h1>"));
}

#[test]
fn test_typing_after_format_cancels_selection_restore() {
    let model = create_test_model("abcdef");
    let model = update(model, Message::Select(Selection::new(0, 3)));
    let model = update(model, Message::Format(FormatOp::Bold));
    let model = update(model, Message::Input("x".to_string()));
    let model = update(model, Message::Rendered);
    assert!(model.editor.pending_selection().is_none());
    assert!(!model.input.is_focused());

    // Typing on past the old hint's length must not resurrect it.
    let model = update(model, Message::Input("xyzuvw".to_string()));
    let model = update(model, Message::Rendered);
    assert!(!model.input.is_focused());
    assert_eq!(model.form.content, "xyzuvw");
}

#[test]
fn test_set_content_overwrites_editor_and_form() {
    let model = create_test_model("local edits");
    let model = update(model, Message::SetContent("server copy".to_string()));
    assert_eq!(model.editor.text(), "server copy");
    assert_eq!(model.input.text(), "server copy");
    assert_eq!(model.form.content, "server copy");
    assert_eq!(model.form.change_count(), 0);
}

#[test]
fn test_format_right_after_set_content_uses_new_text() {
    let model = create_test_model("a much longer local draft");
    let model = update(model, Message::SetContent("short".to_string()));
    // The caret sat at the end of the old text; it now fits the new one.
    assert_eq!(model.input.selection(), Some(Selection::caret(5)));

    let model = update(model, Message::Format(FormatOp::Italic));
    assert_eq!(model.form.content, "short*text*");
}

#[test]
fn test_tab_switch() {
    let model = create_test_model("*hi*");
    let model = update(model, Message::SwitchTab(Tab::Preview));
    assert_eq!(model.editor.tab(), Tab::Preview);
    let model = update(model, Message::SwitchTab(Tab::Write));
    assert_eq!(model.editor.tab(), Tab::Write);
}

#[test]
fn test_cover_ingest_sets_image() {
    let mut model = create_test_model("");
    let token = model.begin_ingest(&ImageField::Cover);
    let model = update(
        model,
        Message::IngestCompleted {
            field: ImageField::Cover,
            token,
            outcome: IngestOutcome::Ready(data_uri()),
        },
    );
    assert_eq!(model.form.cover_image, Some(data_uri().into_string()));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_stale_cover_ingest_is_ignored() {
    let mut model = create_test_model("");
    let slow = model.begin_ingest(&ImageField::Cover);
    let fast = model.begin_ingest(&ImageField::Cover);

    let newer = ImagePayload::Url("/uploads/new.png".to_string());
    let model = update(
        model,
        Message::IngestCompleted {
            field: ImageField::Cover,
            token: fast,
            outcome: IngestOutcome::Ready(newer.clone()),
        },
    );
    let model = update(
        model,
        Message::IngestCompleted {
            field: ImageField::Cover,
            token: slow,
            outcome: IngestOutcome::Ready(data_uri()),
        },
    );
    assert_eq!(model.form.cover_image, Some(newer.into_string()));
}

#[test]
fn test_remove_cover_discards_in_flight_result() {
    let mut model = create_test_model("");
    model.form.on_image_select(Some("/old.png".to_string()));
    let token = model.begin_ingest(&ImageField::Cover);
    let model = update(model, Message::RemoveCover);
    assert_eq!(model.form.cover_image, None);

    let model = update(
        model,
        Message::IngestCompleted {
            field: ImageField::Cover,
            token,
            outcome: IngestOutcome::Ready(data_uri()),
        },
    );
    assert_eq!(model.form.cover_image, None);
}

#[test]
fn test_decode_failure_stores_placeholder_and_warns() {
    let mut model = create_test_model("");
    let token = model.begin_ingest(&ImageField::Cover);
    let outcome = IngestOutcome::from(Err(IngestError::Decode(CodecError(
        "bad header".to_string(),
    ))));
    let model = update(
        model,
        Message::IngestCompleted {
            field: ImageField::Cover,
            token,
            outcome,
        },
    );
    assert_eq!(
        model.form.cover_image,
        Some(ImagePayload::placeholder().into_string())
    );
    assert_eq!(model.active_toast().map(|(_, level)| level), Some(ToastLevel::Error));
}

#[test]
fn test_rejection_keeps_existing_cover() {
    let mut model = create_test_model("");
    model.form.on_image_select(Some("/keep.png".to_string()));
    let token = model.begin_ingest(&ImageField::Cover);
    let outcome = IngestOutcome::from(Err(IngestError::UnsupportedType {
        media_type: "text/plain".to_string(),
    }));
    let model = update(
        model,
        Message::IngestCompleted {
            field: ImageField::Cover,
            token,
            outcome,
        },
    );
    assert_eq!(model.form.cover_image.as_deref(), Some("/keep.png"));
    assert_eq!(
        model.active_toast(),
        Some(("Please select an image file", ToastLevel::Warning))
    );
}

#[test]
fn test_inline_ingest_inserts_markdown_image_at_cursor() {
    let model = create_test_model("intro\noutro");
    let mut model = update(model, Message::Select(Selection::caret(5)));
    let field = ImageField::Inline {
        alt: "diagram".to_string(),
    };
    let token = model.begin_ingest(&field);
    let model = update(
        model,
        Message::IngestCompleted {
            field,
            token,
            outcome: IngestOutcome::Ready(ImagePayload::Url("/d.png".to_string())),
        },
    );
    assert_eq!(model.form.content, "intro\n![diagram](/d.png)\n\noutro");
    assert!(model.editor.preview().contains(r#"<img src="/d.png" alt="diagram""#));
}

#[test]
fn test_tags_and_category() {
    let model = create_test_model("");
    let model = update(model, Message::AddTag("rust".to_string()));
    let model = update(model, Message::AddTag("rust".to_string()));
    let model = update(model, Message::AddTag("  ".to_string()));
    let model = update(model, Message::AddTag("web".to_string()));
    let model = update(model, Message::RemoveTag("rust".to_string()));
    let model = update(model, Message::SetCategory(Some(" ".to_string())));
    assert_eq!(model.form.tags, vec!["web".to_string()]);
    assert_eq!(model.form.category, None);

    let model = update(model, Message::SetCategory(Some("notes".to_string())));
    assert_eq!(model.form.category.as_deref(), Some("notes"));
}

#[test]
fn test_draft_saved_marks_clean_and_remembers_id() {
    let model = create_test_model("");
    let model = update(model, Message::Input("body".to_string()));
    assert!(model.editor.buffer().is_dirty());
    assert_eq!(model.save_id(), "my-post");

    let model = update(model, Message::DraftSaved("my-post".to_string()));
    assert!(!model.editor.buffer().is_dirty());
    assert_eq!(model.draft_id.as_deref(), Some("my-post"));
    assert_eq!(model.active_toast().map(|(_, level)| level), Some(ToastLevel::Info));
}

#[test]
fn test_model_from_draft_round_trips_fields() {
    let mut draft = Draft::new("Hello", "**b**");
    draft.id = "custom-id".to_string();
    draft.tags = vec!["a".to_string()];
    draft.cover_image = Some("/c.png".to_string());

    let model = Model::from_draft(&draft, RenderOptions::default());
    assert_eq!(model.editor.text(), "**b**");
    let saved = model.to_draft();
    assert_eq!(saved.id, "custom-id");
    assert_eq!(saved.tags, draft.tags);
    assert_eq!(saved.cover_image, draft.cover_image);
}

#[test]
fn test_toast_expires_on_tick() {
    let model = create_test_model("");
    let model = update(model, Message::SaveFailed("disk full".to_string()));
    assert!(model.active_toast().is_some());

    let model = update(model, Message::Tick(Instant::now()));
    assert!(model.active_toast().is_some());

    let later = Instant::now() + Duration::from_secs(10);
    let model = update(model, Message::Tick(later));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_resave_keeps_stored_cover_tags_and_category() {
    let mut existing = Draft::new("Same", "old body");
    existing.cover_image = Some("data:image/jpeg;base64,AAAA".to_string());
    existing.category = Some("notes".to_string());
    existing.tags = vec!["rust".to_string()];

    let model = Model::for_save("Same", "new body", Some(&existing), RenderOptions::default());
    let model = update(model, Message::AddTag("web".to_string()));
    let draft = model.to_draft();

    assert_eq!(draft.id, existing.id);
    assert_eq!(draft.content, "new body");
    assert_eq!(draft.cover_image, existing.cover_image);
    assert_eq!(draft.category.as_deref(), Some("notes"));
    assert_eq!(draft.tags, vec!["rust".to_string(), "web".to_string()]);
}

#[test]
fn test_first_save_starts_from_empty_fields() {
    let model = Model::for_save("Fresh", "body", None, RenderOptions::default());
    assert_eq!(model.draft_id, None);
    assert_eq!(model.form.cover_image, None);
    assert_eq!(model.to_draft().id, "fresh");
}
