// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. ingest::IngestError)
    clippy::module_name_repetitions
)]

//! # quillpost
//!
//! The content-authoring core of a blog: a toolbar Markdown editor, a
//! preview renderer and an image ingestion pipeline.
//!
//! ## Architecture
//!
//! The post form uses The Elm Architecture (TEA) pattern:
//! - **Model**: editor session, text widget state and form fields
//! - **Message**: host events and side-effect results
//! - **Update**: pure state transitions
//!
//! ## Modules
//!
//! - [`markdown`]: Markdown to preview HTML
//! - [`editor`]: text buffer, selections and toolbar operations
//! - [`ingest`]: image validation, resizing and re-encoding
//! - [`app`]: the post form hosting the editor
//! - [`store`]: draft persistence
//! - [`config`]: persistent CLI defaults
//! - [`watcher`]: file watching for live preview

pub mod app;
pub mod config;
pub mod editor;
pub mod ingest;
pub mod markdown;
pub mod perf;
pub mod store;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{Message, Model, PostForm, update};
    pub use crate::editor::{Editor, FormatOp, Selection, Tab};
    pub use crate::ingest::{ImageIngestor, ImagePayload, IngestError};
    pub use crate::markdown::{RenderOptions, render};
}
