//! Files handed to the pipeline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A dropped or selected file, as the picker reports it.
///
/// Name, media type and size are known up front; the contents are only
/// read once the file has passed validation.
pub trait SourceFile {
    fn name(&self) -> &str;
    /// Declared media type, e.g. `image/png`.
    fn media_type(&self) -> &str;
    /// Reported size in bytes.
    fn size(&self) -> u64;
    fn read(&self) -> io::Result<Vec<u8>>;
}

const MEDIA_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
];

/// Media type for a path, guessed from its extension.
pub fn media_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| {
            MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, media)| *media)
        })
        .unwrap_or("application/octet-stream")
}

/// Whether a media type is an image type (`image/*`).
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .split_once('/')
        .is_some_and(|(top, sub)| top.eq_ignore_ascii_case("image") && !sub.is_empty())
}

/// A file on disk.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    media_type: &'static str,
    size: u64,
}

impl DiskFile {
    /// Stat a file. Its contents are not read until [`SourceFile::read`].
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Ok(Self {
            media_type: media_type_for(&path),
            size: metadata.len(),
            name,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceFile for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        self.media_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// A file already held in memory (pasted image, test fixture).
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
    reported_size: Option<u64>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
            reported_size: None,
        }
    }

    /// Report a size other than the byte count, as a picker might.
    #[must_use]
    pub const fn with_reported_size(mut self, size: u64) -> Self {
        self.reported_size = Some(size);
        self
    }
}

impl SourceFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn size(&self) -> u64 {
        self.reported_size.unwrap_or(self.bytes.len() as u64)
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
