//! Frame payloads.
//!
//! A [`Frame`] is one encoded image from the upstream pipeline. The viewer
//! never decodes pixels; it only checks that the payload is a PNG or JPEG
//! and reads its dimensions from the header.
//!
//! The bundled demo frame is drawn at runtime as a synthetic edge map.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Demo frame width in pixels.
pub const DEMO_WIDTH: u32 = 640;

/// Demo frame height in pixels.
pub const DEMO_HEIGHT: u32 = 480;

/// Edge pixel intensity.
const EDGE: Luma<u8> = Luma([255]);

/// Background pixel intensity.
const BACKGROUND: Luma<u8> = Luma([0]);

// ============================================================================
// FrameFormat
// ============================================================================

/// Image encodings accepted in frame payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// PNG.
    Png,
    /// JPEG, the camera's usual encoding.
    Jpeg,
}

impl FrameFormat {
    /// Returns the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn from_codec(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            _ => None,
        }
    }
}

// ============================================================================
// Frame
// ============================================================================

/// One encoded image ready for display.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
    format: FrameFormat,
    width: u32,
    height: u32,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Frame {
    /// Wraps encoded image bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::ImageDecode`] if the payload is empty or not PNG/JPEG
    /// - [`Error::Image`] if the image header is unreadable
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::image_decode("empty payload"));
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let format = reader
            .format()
            .and_then(FrameFormat::from_codec)
            .ok_or_else(|| Error::image_decode("unsupported image format"))?;
        let (width, height) = reader.into_dimensions()?;

        Ok(Self {
            bytes,
            format,
            width,
            height,
        })
    }

    /// Decodes a base64 payload.
    ///
    /// A leading `data:image/...;base64,` prefix and embedded whitespace
    /// (line-wrapped encoders) are tolerated.
    ///
    /// # Errors
    ///
    /// - [`Error::Base64`] if the payload is not valid base64
    /// - any error from [`Frame::from_bytes`]
    pub fn from_base64(payload: &str) -> Result<Self> {
        let encoded = strip_data_url(payload);
        let cleaned: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = Base64Standard.decode(cleaned)?;
        Self::from_bytes(bytes)
    }

    /// The bundled demo frame at [`DEMO_WIDTH`] x [`DEMO_HEIGHT`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if PNG encoding fails.
    pub fn demo() -> Result<Self> {
        Self::demo_with_size(DEMO_WIDTH, DEMO_HEIGHT)
    }

    /// A demo frame of the given size.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if either dimension is zero
    /// - [`Error::Image`] if PNG encoding fails
    pub fn demo_with_size(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::config("demo frame dimensions must be non-zero"));
        }

        let edges = draw_demo_edges(width, height);
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(edges).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        Ok(Self {
            bytes,
            format: FrameFormat::Png,
            width,
            height,
        })
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Frame {
    /// Encoded image bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Image encoding.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> FrameFormat {
        self.format
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Resolution in the stats panel format, e.g. `"640 x 480"`.
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    /// Base64 encoding of the image bytes.
    #[must_use]
    pub fn to_base64(&self) -> String {
        Base64Standard.encode(&self.bytes)
    }

    /// `data:` URL suitable for an `<img src>`.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.to_base64())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Removes a `data:...;base64,` prefix if present.
fn strip_data_url(payload: &str) -> &str {
    let trimmed = payload.trim();
    if trimmed.starts_with("data:")
        && let Some((_, rest)) = trimmed.split_once(";base64,")
    {
        return rest;
    }
    trimmed
}

/// Draws an outlined rectangle and circle on a black background.
fn draw_demo_edges(width: u32, height: u32) -> GrayImage {
    let short_side = width.min(height);
    let margin = short_side / 10;
    let right = width.saturating_sub(1 + margin);
    let bottom = height.saturating_sub(1 + margin);

    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    let radius = f64::from(short_side) * 0.3;

    GrayImage::from_fn(width, height, |x, y| {
        let inside_x = (margin..=right).contains(&x);
        let inside_y = (margin..=bottom).contains(&y);
        let on_rect = ((x == margin || x == right) && inside_y)
            || ((y == margin || y == bottom) && inside_x);

        let dx = f64::from(x) + 0.5 - cx;
        let dy = f64::from(y) + 0.5 - cy;
        let on_circle = ((dx * dx + dy * dy).sqrt() - radius).abs() < 0.75;

        if on_rect || on_circle { EDGE } else { BACKGROUND }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_frame_dimensions() {
        let frame = Frame::demo().expect("demo frame");
        assert_eq!(frame.width(), DEMO_WIDTH);
        assert_eq!(frame.height(), DEMO_HEIGHT);
        assert_eq!(frame.format(), FrameFormat::Png);
        assert_eq!(frame.resolution(), "640 x 480");
    }

    #[test]
    fn test_demo_frame_rejects_zero_size() {
        assert!(Frame::demo_with_size(0, 10).is_err());
    }

    #[test]
    fn test_base64_round_trip_reads_header() {
        let demo = Frame::demo_with_size(8, 6).expect("demo frame");
        let frame = Frame::from_base64(&demo.to_base64()).expect("decode");
        assert_eq!(frame, demo);
    }

    #[test]
    fn test_data_url_prefix_is_accepted() {
        let demo = Frame::demo_with_size(4, 4).expect("demo frame");
        let url = demo.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));

        let frame = Frame::from_base64(&url).expect("decode");
        assert_eq!(frame.width(), 4);
    }

    #[test]
    fn test_wrapped_base64_is_accepted() {
        let demo = Frame::demo_with_size(16, 16).expect("demo frame");
        let encoded = demo.to_base64();
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("{head}\n{tail}\n");

        assert!(Frame::from_base64(&wrapped).is_ok());
    }

    #[test]
    fn test_invalid_base64() {
        let err = Frame::from_base64("not base64!!").unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
    }

    #[test]
    fn test_non_image_payload() {
        let payload = Base64Standard.encode(b"plain text, not an image");
        let err = Frame::from_base64(&payload).unwrap_err();
        assert!(err.is_frame_error());
    }

    #[test]
    fn test_empty_payload() {
        let err = Frame::from_base64("").unwrap_err();
        assert!(matches!(err, Error::ImageDecode { .. }));
    }

    #[test]
    fn test_debug_hides_bytes() {
        let frame = Frame::demo_with_size(2, 2).expect("demo frame");
        let debug = format!("{frame:?}");
        assert!(debug.contains("len"));
        assert!(!debug.contains("bytes"));
    }
}
