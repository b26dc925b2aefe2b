//! Decoding and re-encoding bitmaps.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::error::CodecError;
use super::policy::Dimensions;

/// Turns bytes into bitmaps and bitmaps back into bytes.
///
/// The pipeline only talks to this trait, so tests can count decodes or
/// force encodes to produce a chosen size.
pub trait ImageCodec {
    type Bitmap;

    fn decode(&self, bytes: &[u8], media_type: &str) -> Result<Self::Bitmap, CodecError>;

    fn dimensions(&self, bitmap: &Self::Bitmap) -> Dimensions;

    /// Encode `bitmap` resized to `target` in `media_type`.
    ///
    /// `quality` is in `0.0..=1.0`; codecs without a quality knob may ignore it.
    fn encode(
        &self,
        bitmap: &Self::Bitmap,
        target: Dimensions,
        media_type: &str,
        quality: f32,
    ) -> Result<Vec<u8>, CodecError>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    type Bitmap = DynamicImage;

    fn decode(&self, bytes: &[u8], media_type: &str) -> Result<DynamicImage, CodecError> {
        let Some(format) = ImageFormat::from_mime_type(media_type) else {
            return Ok(image::load_from_memory(bytes)?);
        };
        match image::load_from_memory_with_format(bytes, format) {
            Ok(image) => Ok(image),
            // Declared types come from file extensions; trust the content instead.
            Err(err) => {
                tracing::debug!(
                    media_type,
                    error = %err,
                    "declared format failed, sniffing content"
                );
                Ok(image::load_from_memory(bytes)?)
            }
        }
    }

    fn dimensions(&self, bitmap: &DynamicImage) -> Dimensions {
        Dimensions::new(bitmap.width(), bitmap.height())
    }

    fn encode(
        &self,
        bitmap: &DynamicImage,
        target: Dimensions,
        media_type: &str,
        quality: f32,
    ) -> Result<Vec<u8>, CodecError> {
        let resized;
        let image = if target == self.dimensions(bitmap) {
            bitmap
        } else {
            resized = bitmap.resize_exact(target.width, target.height, FilterType::Triangle);
            &resized
        };

        let mut out = Cursor::new(Vec::new());
        match ImageFormat::from_mime_type(media_type) {
            Some(ImageFormat::Jpeg) => {
                // JPEG has no alpha channel.
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality));
                rgb.write_with_encoder(encoder)?;
            }
            Some(ImageFormat::Png) => {
                let encoder = PngEncoder::new_with_quality(
                    &mut out,
                    png_compression(quality),
                    png::FilterType::Adaptive,
                );
                image.write_with_encoder(encoder)?;
            }
            Some(format) => image.write_to(&mut out, format)?,
            None => {
                return Err(CodecError(format!("no encoder for {media_type}")));
            }
        }
        Ok(out.into_inner())
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    let percent = (quality.clamp(0.0, 1.0) * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = percent as u8;
    percent.max(1)
}

/// PNG is lossless; lower quality buys harder compression instead.
fn png_compression(quality: f32) -> png::CompressionType {
    if quality <= 0.6 {
        png::CompressionType::Best
    } else if quality < 0.8 {
        png::CompressionType::Default
    } else {
        png::CompressionType::Fast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn test_decode_png_reports_dimensions() {
        let codec = RasterCodec;
        let bitmap = codec
            .decode(&png_bytes(32, 16), "image/png")
            .expect("decode");
        assert_eq!(codec.dimensions(&bitmap), Dimensions::new(32, 16));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let codec = RasterCodec;
        assert!(codec.decode(b"not an image", "image/png").is_err());
    }

    #[test]
    fn test_decode_sniffs_content_when_declared_type_is_wrong() {
        let codec = RasterCodec;
        let bitmap = codec
            .decode(&png_bytes(12, 8), "image/jpeg")
            .expect("decode");
        assert_eq!(codec.dimensions(&bitmap), Dimensions::new(12, 8));
        assert!(codec.decode(b"not an image", "image/jpeg").is_err());
    }

    #[test]
    fn test_encode_resizes_to_target() {
        let codec = RasterCodec;
        let bitmap = codec.decode(&png_bytes(40, 20), "image/png").expect("decode");
        let bytes = codec
            .encode(&bitmap, Dimensions::new(20, 10), "image/png", 0.8)
            .expect("encode");
        let round = codec.decode(&bytes, "image/png").expect("decode");
        assert_eq!(codec.dimensions(&round), Dimensions::new(20, 10));
    }

    #[test]
    fn test_jpeg_drops_alpha_and_honours_quality() {
        let codec = RasterCodec;
        let img = RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        });
        let bitmap = DynamicImage::ImageRgb8(img);
        let target = Dimensions::new(64, 64);
        let high = codec
            .encode(&bitmap, target, "image/jpeg", 0.9)
            .expect("encode high");
        let low = codec
            .encode(&bitmap, target, "image/jpeg", 0.1)
            .expect("encode low");
        assert!(low.len() < high.len());

        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        assert!(
            codec
                .encode(&rgba, Dimensions::new(8, 8), "image/jpeg", 0.8)
                .is_ok()
        );
    }

    #[test]
    fn test_unknown_media_type_cannot_encode() {
        let codec = RasterCodec;
        let bitmap = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let err = codec
            .encode(&bitmap, Dimensions::new(4, 4), "image/x-unknown", 0.8)
            .expect_err("no encoder");
        assert_eq!(err.to_string(), "no encoder for image/x-unknown");
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.8), 80);
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(2.0), 100);
    }
}
