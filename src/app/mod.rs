//! The post form hosting the editor.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: editor session, text widget, form fields and ingestion slots
//! - [`Message`]: all events the host can report
//! - [`update`]: pure function for state transitions
//!
//! Side effects (running the ingestion pipeline, writing drafts) happen in
//! the host; their results come back in as messages.

mod model;
mod update;

pub use model::{ImageField, IngestOutcome, Model, PostForm, ToastLevel};
pub use update::{Message, update};

#[cfg(test)]
mod tests;
