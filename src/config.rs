use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ingest::IngestPolicy;
use crate::markdown::RenderOptions;

/// Persistent defaults, written as CLI-style flag tokens.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub perf: bool,
    pub no_inline_styles: bool,
    pub debug_log: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl ConfigFlags {
    /// Merge two flag sets. Switches are OR-ed; for options `other` wins.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            perf: self.perf || other.perf,
            no_inline_styles: self.no_inline_styles || other.no_inline_styles,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
            store: other.store.clone().or_else(|| self.store.clone()),
            max_width: other.max_width.or(self.max_width),
            max_height: other.max_height.or(self.max_height),
        }
    }

    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            inline_styles: !self.no_inline_styles,
        }
    }

    pub fn ingest_policy(&self) -> IngestPolicy {
        IngestPolicy::default()
            .with_max_dimensions(self.max_width.unwrap_or(0), self.max_height.unwrap_or(0))
    }

    /// Draft store location: `--store`, else next to the global config.
    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }
}

pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(
        || PathBuf::from(".quillpostrc"),
        |dir| dir.join("config"),
    )
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".quillpostrc")
}

pub fn default_store_path() -> PathBuf {
    config_dir().map_or_else(
        || PathBuf::from("quillpost-drafts.json"),
        |dir| dir.join("drafts.json"),
    )
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("quillpost"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("quillpost"),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("quillpost"));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config").join("quillpost"));
        }
    }

    None
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# quillpost defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if flags.no_inline_styles {
        lines.push("--no-inline-styles".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(path) = &flags.store {
        lines.push(format!("--store {}", path.display()));
    }
    if let Some(width) = flags.max_width {
        lines.push(format!("--max-width {width}"));
    }
    if let Some(height) = flags.max_height {
        lines.push(format!("--max-height {height}"));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list; unknown tokens are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let mut value = || {
            inline_value.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--watch" => flags.watch = true,
            "--perf" => flags.perf = true,
            "--no-inline-styles" => flags.no_inline_styles = true,
            "--debug-log" => flags.debug_log = value().map(PathBuf::from),
            "--store" => flags.store = value().map(PathBuf::from),
            "--max-width" => flags.max_width = value().and_then(|v| v.parse().ok()),
            "--max-height" => flags.max_height = value().and_then(|v| v.parse().ok()),
            _ => {}
        }
        i += 1;
    }
    flags
}
