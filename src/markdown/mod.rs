//! Markdown to HTML conversion for the live preview.
//!
//! This is not a general-purpose Markdown parser. The source runs through
//! an ordered list of substitution passes ([`PIPELINE`]); every pass sees the
//! HTML produced by the passes before it, never the original syntax. The
//! conversion is one-directional and lossy: feeding rendered HTML back in is
//! not expected to reproduce the same output.
//!
//! Supported dialect: `#`..`###` headings, `**bold**`, `*italic*`, links,
//! images (including inline `<img>` tags with base64 data sources),
//! `-` and `1.` lists, fenced and inline code, `>` quotes and `---` rules.

mod passes;

pub use passes::{PIPELINE, Pass};

/// Knobs for the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Inject inline `style` attributes on paragraphs and image containers.
    pub inline_styles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline_styles: true,
        }
    }
}

/// Render optional Markdown source to HTML.
///
/// `None` and the empty string both render to an empty string.
pub fn render(markdown: Option<&str>) -> String {
    markdown.map_or_else(String::new, render_str)
}

/// Render Markdown source to HTML with default options.
pub fn render_str(markdown: &str) -> String {
    render_with(markdown, &RenderOptions::default())
}

/// Render Markdown source to HTML, running every pass of [`PIPELINE`] in order.
pub fn render_with(markdown: &str, options: &RenderOptions) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    let _scope = crate::perf::scope("markdown.render");

    let mut html = markdown.replace("\r\n", "\n");
    for pass in PIPELINE {
        html = pass.apply(&html, options);
        tracing::trace!(pass = pass.name(), len = html.len(), "markdown pass");
    }
    tracing::trace!(
        source_len = markdown.len(),
        html_len = html.len(),
        "rendered markdown preview"
    );
    html
}
