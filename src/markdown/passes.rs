//! The ordered substitution passes behind [`super::render_with`].

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::RenderOptions;

const CONTAINER_STYLE: &str = "margin: 1.5rem 0; text-align: center;";
const IMAGE_STYLE: &str = "max-width: 100%; height: auto; border-radius: 8px;";
const PARAGRAPH_STYLE: &str = "margin-bottom: 1rem;";

/// Tags that start or end a block; soft breaks and paragraphs never touch them.
const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "pre", "blockquote", "div", "hr", "p",
];

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markdown pass pattern must compile")
}

static DATA_IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"<img\b[^>]*?\bsrc\s*=\s*"(data:image/[^"]+)"[^>]*>"#));
static IMG_ALT_ATTR: LazyLock<Regex> = LazyLock::new(|| regex(r#"\balt\s*=\s*"([^"]*)""#));
static MD_IMAGE: LazyLock<Regex> = LazyLock::new(|| regex(r"!\[([^\]]*)\]\(([^)\s]+)\)"));

static H3: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^### (.*)$"));
static H2: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^## (.*)$"));
static H1: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^# (.*)$"));

static BOLD: LazyLock<Regex> = LazyLock::new(|| regex(r"\*\*(.+?)\*\*"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| regex(r"\*([^*\n]+)\*"));

static LINK: LazyLock<Regex> = LazyLock::new(|| regex(r"\[([^\]]+)\]\(([^)\s]+)\)"));

static UL_ITEM: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^- (.*)$"));
static OL_ITEM: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^\d+\. (.*)$"));
static UL_RUN: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?m)(?:^<li data-kind="ul">[^\n]*</li>\n?)+"#));
static OL_RUN: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?m)(?:^<li data-kind="ol">[^\n]*</li>\n?)+"#));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?s)```(?:([\w+-]+)?\n)?(.*?)```"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| regex(r"`([^`\n]+)`"));

static QUOTE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^> (.*)$"));
static RULE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^---$"));

static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"\n+"));
static LINE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^(.+)$"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"\n{2,}"));

/// One stage of the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Images,
    Headings,
    Emphasis,
    Links,
    Lists,
    Code,
    Blockquotes,
    HorizontalRules,
    SoftBreaks,
    Paragraphs,
    Cosmetic,
}

/// Every pass, in the order it must run.
///
/// Images come first so paragraph wrapping never sees raw image syntax, bold
/// runs before italic, fenced code before inline code, and the line-based
/// passes (soft breaks, paragraphs) run after every block-producing pass.
pub const PIPELINE: [Pass; 11] = [
    Pass::Images,
    Pass::Headings,
    Pass::Emphasis,
    Pass::Links,
    Pass::Lists,
    Pass::Code,
    Pass::Blockquotes,
    Pass::HorizontalRules,
    Pass::SoftBreaks,
    Pass::Paragraphs,
    Pass::Cosmetic,
];

impl Pass {
    /// Short name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Headings => "headings",
            Self::Emphasis => "emphasis",
            Self::Links => "links",
            Self::Lists => "lists",
            Self::Code => "code",
            Self::Blockquotes => "blockquotes",
            Self::HorizontalRules => "horizontal-rules",
            Self::SoftBreaks => "soft-breaks",
            Self::Paragraphs => "paragraphs",
            Self::Cosmetic => "cosmetic",
        }
    }

    /// Run this pass over `text`.
    pub fn apply(self, text: &str, options: &RenderOptions) -> String {
        match self {
            Self::Images => images(text, options),
            Self::Headings => headings(text),
            Self::Emphasis => emphasis(text),
            Self::Links => LINK
                .replace_all(text, |caps: &Captures| {
                    format!(
                        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                        escape_attr(&caps[2]),
                        &caps[1]
                    )
                })
                .into_owned(),
            Self::Lists => lists(text),
            Self::Code => code(text),
            Self::Blockquotes => QUOTE
                .replace_all(text, "<blockquote>$1</blockquote>")
                .replace("</blockquote>\n<blockquote>", "<br>"),
            Self::HorizontalRules => RULE.replace_all(text, "<hr>").into_owned(),
            Self::SoftBreaks => soft_breaks(text),
            Self::Paragraphs => LINE
                .replace_all(text, |caps: &Captures| {
                    let line = &caps[1];
                    if line.trim().is_empty() || starts_with_block_open(line) {
                        line.to_string()
                    } else {
                        format!("<p>{line}</p>")
                    }
                })
                .into_owned(),
            Self::Cosmetic => cosmetic(text, options),
        }
    }
}

fn image_container(src: &str, alt: &str, options: &RenderOptions) -> String {
    if options.inline_styles {
        format!(
            "<div class=\"post-image\" style=\"{CONTAINER_STYLE}\"><img src=\"{src}\" alt=\"{alt}\" style=\"{IMAGE_STYLE}\"></div>"
        )
    } else {
        format!("<div class=\"post-image\"><img src=\"{src}\" alt=\"{alt}\"></div>")
    }
}

fn images(text: &str, options: &RenderOptions) -> String {
    let text = DATA_IMG_TAG.replace_all(text, |caps: &Captures| {
        let alt = IMG_ALT_ATTR
            .captures(&caps[0])
            .map(|alt| alt[1].to_string())
            .unwrap_or_default();
        image_container(&caps[1], &alt, options)
    });
    MD_IMAGE
        .replace_all(&text, |caps: &Captures| {
            image_container(&escape_attr(&caps[2]), &escape_attr(&caps[1]), options)
        })
        .into_owned()
}

fn headings(text: &str) -> String {
    let text = H3.replace_all(text, "<h3>$1</h3>");
    let text = H2.replace_all(&text, "<h2>$1</h2>");
    H1.replace_all(&text, "<h1>$1</h1>").into_owned()
}

fn emphasis(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>$1</strong>");
    ITALIC.replace_all(&text, "<em>$1</em>").into_owned()
}

fn lists(text: &str) -> String {
    let text = UL_ITEM.replace_all(text, r#"<li data-kind="ul">$1</li>"#);
    let text = OL_ITEM.replace_all(&text, r#"<li data-kind="ol">$1</li>"#);
    let text = UL_RUN.replace_all(&text, |caps: &Captures| wrap_run(&caps[0], "ul"));
    OL_RUN
        .replace_all(&text, |caps: &Captures| wrap_run(&caps[0], "ol"))
        .into_owned()
}

/// Collapse a run of marked list items onto one line inside `<ul>`/`<ol>`.
fn wrap_run(run: &str, kind: &str) -> String {
    let marker = format!("<li data-kind=\"{kind}\">");
    let items: String = run
        .lines()
        .map(|line| line.replacen(&marker, "<li>", 1))
        .collect();
    let trailing = if run.ends_with('\n') { "\n" } else { "" };
    format!("<{kind}>{items}</{kind}>{trailing}")
}

fn code(text: &str) -> String {
    let text = CODE_FENCE.replace_all(text, |caps: &Captures| {
        let body = &caps[2];
        let body = body.strip_suffix('\n').unwrap_or(body).replace('\n', "&#10;");
        match caps.get(1) {
            Some(lang) => format!(
                "<pre><code class=\"language-{}\">{body}</code></pre>",
                lang.as_str()
            ),
            None => format!("<pre><code>{body}</code></pre>"),
        }
    });
    INLINE_CODE
        .replace_all(&text, "<code>$1</code>")
        .into_owned()
}

/// Turn lone newlines inside running text into `<br>`.
fn soft_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for run in NEWLINE_RUN.find_iter(text) {
        out.push_str(&text[last..run.start()]);
        let before = &text[..run.start()];
        let after = &text[run.end()..];
        let is_soft = run.len() == 1
            && !before.is_empty()
            && !after.is_empty()
            && !ends_with_block_close(before)
            && !starts_with_block_open(after);
        if is_soft {
            out.push_str("<br>");
        } else {
            out.push_str(run.as_str());
        }
        last = run.end();
    }
    out.push_str(&text[last..]);
    out
}

fn cosmetic(text: &str, options: &RenderOptions) -> String {
    let body = text.trim_end_matches('\n');
    let trailing = text.len() - body.len();

    let mut html = if options.inline_styles {
        body.replace("<p>", &format!("<p style=\"{PARAGRAPH_STYLE}\">"))
    } else {
        body.to_string()
    };
    html = BLANK_RUN.replace_all(&html, "\n").into_owned();
    html.push_str(&"<br>".repeat(trailing));
    html
}

fn starts_with_block_open(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('<') else {
        return false;
    };
    BLOCK_TAGS.iter().any(|tag| {
        rest.strip_prefix(tag)
            .is_some_and(|after| after.starts_with(['>', ' ', '/']))
    })
}

fn ends_with_block_close(text: &str) -> bool {
    let text = text.trim_end_matches([' ', '\t']);
    text.ends_with("<hr>")
        || BLOCK_TAGS
            .iter()
            .any(|tag| text.ends_with(&format!("</{tag}>")))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
