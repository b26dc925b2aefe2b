//! Size limits, dimension caps and quality tiers.

/// Largest raw upload accepted before decoding (2 MB).
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Largest serialized data URI accepted after re-encoding (1.5 MB).
pub const MAX_PAYLOAD_BYTES: usize = 1_572_864;

pub const MAX_WIDTH: u32 = 1200;
pub const MAX_HEIGHT: u32 = 900;

pub const DEFAULT_QUALITY: f32 = 0.8;
pub const LARGE_QUALITY: f32 = 0.7;
pub const HUGE_QUALITY: f32 = 0.6;
/// Quality used for the single retry when the first encode is oversized.
pub const FALLBACK_QUALITY: f32 = 0.5;

const LARGE_PIXELS: u64 = 1_000_000;
const HUGE_PIXELS: u64 = 2_000_000;

/// Width and height of a bitmap, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn pixels(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Limits applied by an [`super::ImageIngestor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestPolicy {
    pub max_upload_bytes: u64,
    pub max_payload_bytes: usize,
    pub max_width: u32,
    pub max_height: u32,
    pub fallback_quality: f32,
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            fallback_quality: FALLBACK_QUALITY,
        }
    }
}

impl IngestPolicy {
    /// Override the dimension caps. Zero keeps the current cap.
    #[must_use]
    pub const fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        if width > 0 {
            self.max_width = width;
        }
        if height > 0 {
            self.max_height = height;
        }
        self
    }

    /// Target size for a bitmap: aspect ratio kept, never upscaled, and
    /// both caps respected. Fractional results are truncated (minimum 1).
    pub fn plan(&self, natural: Dimensions) -> Dimensions {
        let Dimensions { width, height } = natural;
        if width <= self.max_width && height <= self.max_height {
            return natural;
        }
        let (w, h) = (u64::from(width), u64::from(height));
        let (max_w, max_h) = (u64::from(self.max_width), u64::from(self.max_height));
        // Compare w/h against max_w/max_h without floating point.
        let (new_w, new_h) = if w * max_h >= h * max_w {
            (max_w, h * max_w / w)
        } else {
            (w * max_h / h, max_h)
        };
        // Both values are bounded by the u32 inputs.
        let width = u32::try_from(new_w).unwrap_or(u32::MAX).max(1);
        let height = u32::try_from(new_h).unwrap_or(u32::MAX).max(1);
        Dimensions::new(width, height)
    }
}

/// Initial encoding quality for a bitmap of the given natural size.
pub const fn quality_for(natural: Dimensions) -> f32 {
    let pixels = natural.pixels();
    if pixels > HUGE_PIXELS {
        HUGE_QUALITY
    } else if pixels > LARGE_PIXELS {
        LARGE_QUALITY
    } else {
        DEFAULT_QUALITY
    }
}

/// Human-readable byte size (for log lines and user messages).
pub fn size_display(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes_f / 1024.0)
    } else {
        format!("{:.1} MB", bytes_f / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_image_keeps_dimensions() {
        let policy = IngestPolicy::default();
        let natural = Dimensions::new(640, 480);
        assert_eq!(policy.plan(natural), natural);
    }

    #[test]
    fn test_landscape_bound_by_width() {
        let policy = IngestPolicy::default();
        assert_eq!(
            policy.plan(Dimensions::new(4000, 3000)),
            Dimensions::new(1200, 900)
        );
        assert_eq!(
            policy.plan(Dimensions::new(2400, 600)),
            Dimensions::new(1200, 300)
        );
    }

    #[test]
    fn test_portrait_bound_by_height() {
        let policy = IngestPolicy::default();
        assert_eq!(
            policy.plan(Dimensions::new(1000, 3000)),
            Dimensions::new(300, 900)
        );
    }

    #[test]
    fn test_wide_image_that_only_exceeds_height_cap() {
        // 1100 wide fits, but 1000 tall does not.
        let policy = IngestPolicy::default();
        let planned = policy.plan(Dimensions::new(1100, 1000));
        assert_eq!(planned, Dimensions::new(990, 900));
    }

    #[test]
    fn test_extreme_aspect_never_collapses_to_zero() {
        let policy = IngestPolicy::default();
        let planned = policy.plan(Dimensions::new(100_000, 10));
        assert_eq!(planned, Dimensions::new(1200, 1));
    }

    #[test]
    fn test_custom_caps() {
        let policy = IngestPolicy::default().with_max_dimensions(800, 0);
        assert_eq!(policy.max_width, 800);
        assert_eq!(policy.max_height, MAX_HEIGHT);
        assert_eq!(
            policy.plan(Dimensions::new(1600, 800)),
            Dimensions::new(800, 400)
        );
    }

    #[test]
    fn test_quality_tiers_follow_natural_pixel_count() {
        assert!((quality_for(Dimensions::new(800, 600)) - DEFAULT_QUALITY).abs() < f32::EPSILON);
        assert!((quality_for(Dimensions::new(1000, 1000)) - DEFAULT_QUALITY).abs() < f32::EPSILON);
        assert!((quality_for(Dimensions::new(1200, 900)) - LARGE_QUALITY).abs() < f32::EPSILON);
        assert!((quality_for(Dimensions::new(4000, 3000)) - HUGE_QUALITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_size_display() {
        assert_eq!(size_display(512), "512 B");
        assert_eq!(size_display(10 * 1024), "10.0 KB");
        assert_eq!(size_display(3 * 1024 * 1024), "3.0 MB");
    }
}
