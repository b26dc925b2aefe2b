use thiserror::Error;

use super::payload::ImagePayload;
use super::policy::size_display;

/// Failure from an image codec.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        Self(err.to_string())
    }
}

/// Why an image could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {media_type}")]
    UnsupportedType { media_type: String },

    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("failed to read file")]
    Read(#[source] std::io::Error),

    #[error("failed to decode image")]
    Decode(#[source] CodecError),

    #[error("failed to encode image")]
    Encode(#[source] CodecError),

    #[error("encoded image still too large: {size} bytes (limit {limit})")]
    StillTooLarge { size: usize, limit: usize },
}

impl IngestError {
    /// Short sentence suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedType { .. } => "Please select an image file".to_string(),
            Self::TooLarge { limit, .. } => {
                format!("Image must be smaller than {}", size_display(*limit))
            }
            Self::Read(_) => "Could not read the selected file".to_string(),
            Self::Decode(_) | Self::Encode(_) => {
                "Could not process the image, using a placeholder".to_string()
            }
            Self::StillTooLarge { .. } => {
                "Image is too large even after compression, please choose a smaller image"
                    .to_string()
            }
        }
    }

    /// Payload to store instead, so the host never keeps a broken reference.
    pub fn placeholder(&self) -> Option<ImagePayload> {
        match self {
            Self::Decode(_) | Self::Encode(_) => Some(ImagePayload::placeholder()),
            _ => None,
        }
    }
}
