//! Image ingestion.
//!
//! A dropped or selected file goes through a fixed sequence:
//!
//! 1. type and size gate (nothing is read on rejection)
//! 2. read and decode
//! 3. plan bounded target dimensions
//! 4. pick a quality tier from the natural pixel count
//! 5. re-encode into a data URI
//! 6. retry once at a lower quality if the payload is still oversized
//!
//! Decode and encode failures carry a placeholder payload (see
//! [`IngestError::placeholder`]) so the host never stores a broken image.

mod codec;
mod error;
mod payload;
mod policy;
mod source;

use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

pub use codec::{ImageCodec, RasterCodec};
pub use error::{CodecError, IngestError};
pub use payload::{ImagePayload, PLACEHOLDER_PATH};
pub use policy::{
    DEFAULT_QUALITY, Dimensions, FALLBACK_QUALITY, HUGE_QUALITY, IngestPolicy, LARGE_QUALITY,
    MAX_HEIGHT, MAX_PAYLOAD_BYTES, MAX_UPLOAD_BYTES, MAX_WIDTH, quality_for, size_display,
};
pub use source::{DiskFile, MemoryFile, SourceFile, is_image_media_type, media_type_for};

use crate::perf;

/// A successfully ingested image.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub payload: ImagePayload,
    /// Size of the decoded bitmap.
    pub natural: Dimensions,
    /// Size of the encoded payload.
    pub target: Dimensions,
    /// Quality of the accepted encode.
    pub quality: f32,
    /// Number of encodes performed (1, or 2 after the fallback retry).
    pub attempts: u8,
    /// Bytes read from the source file.
    pub original_bytes: u64,
}

/// Runs the ingestion pipeline with a codec and a policy.
#[derive(Debug, Clone, Default)]
pub struct ImageIngestor<C = RasterCodec> {
    codec: C,
    policy: IngestPolicy,
}

impl ImageIngestor<RasterCodec> {
    pub fn new(policy: IngestPolicy) -> Self {
        Self::with_codec(RasterCodec, policy)
    }
}

impl<C: ImageCodec> ImageIngestor<C> {
    pub const fn with_codec(codec: C, policy: IngestPolicy) -> Self {
        Self { codec, policy }
    }

    pub const fn policy(&self) -> &IngestPolicy {
        &self.policy
    }

    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Type and size gate. Runs before anything is read.
    pub fn validate(&self, file: &dyn SourceFile) -> Result<(), IngestError> {
        if !is_image_media_type(file.media_type()) {
            return Err(IngestError::UnsupportedType {
                media_type: file.media_type().to_string(),
            });
        }
        if file.size() > self.policy.max_upload_bytes {
            return Err(IngestError::TooLarge {
                size: file.size(),
                limit: self.policy.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Stat a file on disk and ingest it.
    pub fn ingest_path(&self, path: &Path) -> Result<Ingested, IngestError> {
        let file = DiskFile::open(path).map_err(IngestError::Read)?;
        self.ingest(&file)
    }

    pub fn ingest(&self, file: &dyn SourceFile) -> Result<Ingested, IngestError> {
        let _scope = perf::scope("ingest.image");
        if let Err(err) = self.validate(file) {
            tracing::info!(name = file.name(), %err, "image rejected");
            return Err(err);
        }

        let bytes = file.read().map_err(IngestError::Read)?;
        let original_bytes = bytes.len() as u64;
        let media_type = file.media_type().to_ascii_lowercase();

        let bitmap = self.codec.decode(&bytes, &media_type).map_err(|err| {
            tracing::warn!(name = file.name(), %err, "image decode failed");
            IngestError::Decode(err)
        })?;
        drop(bytes);

        let natural = self.codec.dimensions(&bitmap);
        let target = self.policy.plan(natural);
        let quality = quality_for(natural);
        tracing::debug!(
            name = file.name(),
            %natural,
            %target,
            quality,
            size = %size_display(original_bytes),
            "image decoded"
        );

        let payload = self.encode(&bitmap, target, &media_type, quality)?;
        if payload.len() <= self.policy.max_payload_bytes {
            return Ok(self.finish(payload, natural, target, quality, 1, original_bytes));
        }

        let fallback = self.policy.fallback_quality;
        tracing::info!(
            payload = payload.len(),
            limit = self.policy.max_payload_bytes,
            quality = fallback,
            "payload over limit, retrying at lower quality"
        );
        let payload = self.encode(&bitmap, target, &media_type, fallback)?;
        if payload.len() <= self.policy.max_payload_bytes {
            return Ok(self.finish(payload, natural, target, fallback, 2, original_bytes));
        }

        tracing::warn!(
            payload = payload.len(),
            limit = self.policy.max_payload_bytes,
            "payload still over limit after retry"
        );
        Err(IngestError::StillTooLarge {
            size: payload.len(),
            limit: self.policy.max_payload_bytes,
        })
    }

    fn encode(
        &self,
        bitmap: &C::Bitmap,
        target: Dimensions,
        media_type: &str,
        quality: f32,
    ) -> Result<ImagePayload, IngestError> {
        let encoded = self
            .codec
            .encode(bitmap, target, media_type, quality)
            .map_err(|err| {
                tracing::warn!(%err, media_type, "image encode failed");
                IngestError::Encode(err)
            })?;
        let payload = ImagePayload::data_uri(media_type, &encoded);
        perf::log_event(
            "ingest.encode",
            format!(
                "target={target} quality={quality:.2} encoded={} payload={}",
                encoded.len(),
                payload.len()
            ),
        );
        Ok(payload)
    }

    #[allow(clippy::unused_self)]
    fn finish(
        &self,
        payload: ImagePayload,
        natural: Dimensions,
        target: Dimensions,
        quality: f32,
        attempts: u8,
        original_bytes: u64,
    ) -> Ingested {
        perf::log_event(
            "ingest.done",
            format!(
                "natural={natural} target={target} before={original_bytes} after={} attempts={attempts}",
                payload.len()
            ),
        );
        Ingested {
            payload,
            natural,
            target,
            quality,
            attempts,
            original_bytes,
        }
    }
}

/// Identifies one ingestion request for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// Per-field request counter: only the latest request's result is accepted.
#[derive(Debug, Clone, Default)]
pub struct IngestSlot {
    latest: u64,
    in_flight: bool,
}

impl IngestSlot {
    /// Start a new request, superseding any outstanding one.
    pub const fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        self.in_flight = true;
        RequestToken(self.latest)
    }

    /// Supersede outstanding requests without starting a new one
    /// (e.g. the user removed the image).
    pub const fn invalidate(&mut self) {
        self.latest += 1;
        self.in_flight = false;
    }

    pub const fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    pub const fn is_pending(&self) -> bool {
        self.in_flight
    }

    /// Accept a completion. Returns `None` for stale tokens.
    pub fn complete<T>(&mut self, token: RequestToken, value: T) -> Option<T> {
        if !self.is_current(token) {
            tracing::debug!(
                stale = token.0,
                latest = self.latest,
                "dropping stale ingestion result"
            );
            return None;
        }
        self.in_flight = false;
        Some(value)
    }
}

/// Result of a background ingestion.
#[derive(Debug)]
pub struct Completion {
    pub token: RequestToken,
    pub result: Result<Ingested, IngestError>,
}

/// Run the pipeline on a worker thread and send the outcome on `tx`.
pub fn spawn_ingest<C, F>(
    ingestor: ImageIngestor<C>,
    file: F,
    token: RequestToken,
    tx: Sender<Completion>,
) -> JoinHandle<()>
where
    C: ImageCodec + Send + 'static,
    F: SourceFile + Send + 'static,
{
    std::thread::spawn(move || {
        let result = ingestor.ingest(&file);
        if tx.send(Completion { token, result }).is_err() {
            tracing::debug!(
                token = token.0,
                "ingestion receiver dropped before completion"
            );
        }
    })
}
