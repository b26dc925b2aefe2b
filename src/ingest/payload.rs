use base64::{Engine, engine::general_purpose::STANDARD};

/// Path stored when an image could not be processed.
pub const PLACEHOLDER_PATH: &str = "/placeholder.svg";

/// The final embeddable form of an image.
///
/// Both variants render to the same string for consumers (`src` attributes,
/// Markdown image references, draft fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// `data:<media>;base64,<data>`
    DataUri(String),
    /// A plain URL or path, e.g. an image that was already uploaded.
    Url(String),
}

impl ImagePayload {
    pub fn data_uri(media_type: &str, bytes: &[u8]) -> Self {
        Self::DataUri(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn placeholder() -> Self {
        Self::Url(PLACEHOLDER_PATH.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DataUri(s) | Self::Url(s) => s,
        }
    }

    /// Serialized length in bytes, the figure the payload cap applies to.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Url(url) if url == PLACEHOLDER_PATH)
    }

    /// Media type declared by a data URI.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Self::DataUri(s) => s.strip_prefix("data:")?.split(';').next(),
            Self::Url(_) => None,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::DataUri(s) | Self::Url(s) => s,
        }
    }
}

impl std::fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ImagePayload> for String {
    fn from(payload: ImagePayload) -> Self {
        payload.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_format() {
        let payload = ImagePayload::data_uri("image/png", b"abc");
        assert_eq!(payload.as_str(), "data:image/png;base64,YWJj");
        assert_eq!(payload.media_type(), Some("image/png"));
        assert_eq!(payload.len(), "data:image/png;base64,YWJj".len());
    }

    #[test]
    fn test_both_variants_render_as_plain_strings() {
        let url = ImagePayload::Url("https://cdn.example.com/a.jpg".into());
        assert_eq!(url.to_string(), "https://cdn.example.com/a.jpg");

        let data = ImagePayload::data_uri("image/gif", b"GIF");
        assert_eq!(data.to_string(), "data:image/gif;base64,R0lG");
    }

    #[test]
    fn test_placeholder() {
        let payload = ImagePayload::placeholder();
        assert!(payload.is_placeholder());
        assert_eq!(payload.media_type(), None);
        assert_eq!(String::from(payload), PLACEHOLDER_PATH);
    }
}
