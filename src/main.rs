//! quillpost - Markdown post authoring from the command line.
//!
//! # Usage
//!
//! ```bash
//! quillpost render post.md -o post.html
//! quillpost render --watch post.md
//! quillpost format post.md --op bold --range 6..11 --in-place
//! quillpost ingest cover.jpg --markdown "Cover"
//! quillpost draft save post.md --title "Hello" --cover cover.jpg --tag rust
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use quillpost::app::{ImageField, IngestOutcome, Message, Model, ToastLevel, update};
use quillpost::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use quillpost::editor::{Editor, FormatOp, Selection, TextField};
use quillpost::ingest::{ImageIngestor, size_display};
use quillpost::markdown::{self, RenderOptions};
use quillpost::perf;
use quillpost::store::{DraftStore, FileStore, slugify};
use quillpost::watcher::FileWatcher;

/// Markdown post authoring: preview rendering, toolbar formatting and image ingestion
#[derive(Parser, Debug)]
#[command(name = "quillpost", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Watch the input file and re-render on change
    #[arg(short, long, global = true)]
    watch: bool,

    /// Enable performance logging
    #[arg(long, global = true)]
    perf: bool,

    /// Render paragraphs and images without inline styles
    #[arg(long, global = true)]
    no_inline_styles: bool,

    /// Write detailed ingestion/watcher debug events to a file
    #[arg(long, value_name = "PATH", global = true)]
    debug_log: Option<PathBuf>,

    /// Draft store file
    #[arg(long, value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    /// Maximum width of ingested images
    #[arg(long, value_name = "PX", global = true)]
    max_width: Option<u32>,

    /// Maximum height of ingested images
    #[arg(long, value_name = "PX", global = true)]
    max_height: Option<u32>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Markdown file to preview HTML
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write HTML here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Apply a toolbar formatting operation to a file
    Format {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// bold, italic, heading, h1-h3, list, numbered-list, code,
        /// code-block, quote, link, hr
        #[arg(long)]
        op: String,

        /// Character range to format, e.g. 6..11 (default: end of file)
        #[arg(long, value_parser = parse_range)]
        range: Option<Selection>,

        /// Heading level for `--op heading`
        #[arg(long)]
        level: Option<u8>,

        /// Rewrite the file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },

    /// Normalize an image into an embeddable data URI
    Ingest {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Print a Markdown image reference with this alt text
        #[arg(long, value_name = "ALT")]
        markdown: Option<String>,
    },

    /// Manage saved drafts
    Draft {
        #[command(subcommand)]
        action: DraftCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Save a Markdown file as a draft
    Save {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        title: String,

        /// Cover image to ingest
        #[arg(long, value_name = "IMAGE")]
        cover: Option<PathBuf>,

        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Print a draft as JSON
    Show { id: String },

    /// List drafts, newest first
    List,
}

fn parse_range(s: &str) -> Result<Selection, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {s}"))?;
    let start = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid range start: {start}"))?;
    let end = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid range end: {end}"))?;
    Ok(Selection::new(start, end))
}

fn parse_op(name: &str, level: Option<u8>) -> Result<FormatOp> {
    if name == "heading" {
        return Ok(FormatOp::Heading(level.unwrap_or(1)));
    }
    FormatOp::from_name(name).with_context(|| format!("Unknown formatting operation: {name}"))
}

fn render_file(file: &Path, output: Option<&Path>, options: &RenderOptions) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let html = markdown::render_with(&source, options);
    match output {
        Some(out) => {
            fs::write(out, &html).with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!(file = %file.display(), out = %out.display(), "rendered");
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn run_render(file: &Path, output: Option<&Path>, flags: &ConfigFlags) -> Result<()> {
    let options = flags.render_options();
    render_file(file, output, &options)?;
    if !flags.watch {
        return Ok(());
    }

    let mut watcher = FileWatcher::new(file, Duration::from_millis(200))
        .with_context(|| format!("Failed to watch {}", file.display()))?;
    eprintln!("Watching {} (Ctrl-C to stop)", watcher.target_path().display());
    loop {
        std::thread::sleep(Duration::from_millis(250));
        if !watcher.take_change_ready() {
            continue;
        }
        if let Err(err) = render_file(file, output, &options) {
            eprintln!("[warn] {err:#}");
        }
    }
}

fn run_format(
    file: &Path,
    op: FormatOp,
    range: Option<Selection>,
    in_place: bool,
    flags: &ConfigFlags,
) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mut editor = Editor::new(&source).with_render_options(flags.render_options());
    let mut field = TextField::new(&source);
    if let Some(range) = range {
        field.select(range);
    }

    let mut result = String::new();
    let hint = editor.format(op, &field, &mut |text: &str| text.clone_into(&mut result));
    tracing::info!(?op, ?hint, "formatted");

    if in_place {
        fs::write(file, &result).with_context(|| format!("Failed to write {}", file.display()))?;
        eprintln!("selection {}..{}", hint.start, hint.end);
    } else {
        print!("{result}");
    }
    Ok(())
}

fn run_ingest(image: &Path, alt: Option<&str>, flags: &ConfigFlags) -> Result<()> {
    let ingestor = ImageIngestor::new(flags.ingest_policy());
    let payload = match ingestor.ingest_path(image) {
        Ok(ingested) => {
            eprintln!(
                "{} -> {} at quality {:.1} ({} -> {}, {} attempt(s))",
                ingested.natural,
                ingested.target,
                ingested.quality,
                size_display(ingested.original_bytes),
                size_display(ingested.payload.len() as u64),
                ingested.attempts,
            );
            ingested.payload
        }
        Err(err) => match err.placeholder() {
            Some(placeholder) => {
                tracing::warn!(error = ?err, "ingestion failed, using placeholder");
                eprintln!("[warn] {}", err.user_message());
                placeholder
            }
            None => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Failed to ingest {}", image.display())));
            }
        },
    };
    match alt {
        Some(alt) => println!("![{alt}]({payload})"),
        None => println!("{payload}"),
    }
    Ok(())
}

fn report_toast(model: &Model) {
    if let Some((message, level)) = model.active_toast() {
        let tag = match level {
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warn",
            ToastLevel::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }
}

fn run_draft(action: DraftCommand, flags: &ConfigFlags) -> Result<()> {
    let store_path = flags.store_path();
    let store = FileStore::open(&store_path)
        .with_context(|| format!("Failed to open draft store {}", store_path.display()))?;
    let mut drafts = DraftStore::new(store);

    match action {
        DraftCommand::Save {
            file,
            title,
            cover,
            tags,
            category,
        } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let existing = drafts.load(&slugify(&title))?;
            let mut model =
                Model::for_save(&title, &content, existing.as_ref(), flags.render_options());
            for tag in tags {
                model = update(model, Message::AddTag(tag));
            }
            if category.is_some() {
                model = update(model, Message::SetCategory(category));
            }

            if let Some(cover) = cover {
                let token = model.begin_ingest(&ImageField::Cover);
                let ingestor = ImageIngestor::new(flags.ingest_policy());
                let outcome = IngestOutcome::from(ingestor.ingest_path(&cover));
                model = update(
                    model,
                    Message::IngestCompleted {
                        field: ImageField::Cover,
                        token,
                        outcome,
                    },
                );
                report_toast(&model);
            }

            let draft = model.to_draft();
            model = match drafts.save(&draft) {
                Ok(()) => update(model, Message::DraftSaved(draft.id.clone())),
                Err(err) => {
                    let model = update(model, Message::SaveFailed(err.to_string()));
                    report_toast(&model);
                    return Err(err).context("Failed to save draft");
                }
            };
            report_toast(&model);
            println!("{}", draft.id);
        }
        DraftCommand::Show { id } => {
            let draft = drafts
                .load(&id)?
                .with_context(|| format!("No draft with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        DraftCommand::List => {
            for draft in drafts.list()? {
                println!("{}\t{}\t{}", draft.id, draft.updated_at, draft.title);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();

    let global_path = global_config_path();
    let local_path = local_override_path();
    let mut cli_flags = parse_flag_tokens(&raw_args);
    // `-w` is only known to clap.
    cli_flags.watch |= cli.watch;

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective configuration");

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("QUILLPOST_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let Some(command) = cli.command else {
        if cli.save || cli.clear {
            return Ok(());
        }
        anyhow::bail!("No command given, see --help");
    };

    match command {
        Command::Render { file, output } => run_render(&file, output.as_deref(), &effective),
        Command::Format {
            file,
            op,
            range,
            level,
            in_place,
        } => {
            let op = parse_op(&op, level)?;
            run_format(&file, op, range, in_place, &effective)
        }
        Command::Ingest { image, markdown } => {
            run_ingest(&image, markdown.as_deref(), &effective)
        }
        Command::Draft { action } => run_draft(action, &effective),
    }
}
