//! Image export of the canvas content.
//!
//! PNG keeps the alpha channel and is written by Cairo. JPEG has no alpha, so
//! the content is flattened onto white first and encoded with the `image`
//! crate at the requested quality.

pub mod file;

pub use file::{ExportFileConfig, generate_filename, save_export};

use crate::draw::render::render_flattened;
use crate::draw::{Snapshot, SnapshotError, SurfaceError, WHITE};
use cairo::{Context, Format, ImageSurface};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quality used when none is given.
pub const DEFAULT_QUALITY: u8 = 92;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    /// File extension for exported files.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// MIME type, for front-ends that hand the bytes to a download helper.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" | "image/png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" | "image/jpeg" => Ok(ExportFormat::Jpeg),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Errors that can occur while exporting an image.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format '{0}' (expected png or jpeg)")]
    UnsupportedFormat(String),

    #[error("export quality {0} is out of range (expected 1-100)")]
    InvalidQuality(u8),

    #[error("snapshot could not be decoded: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("canvas could not be captured: {0}")]
    Surface(#[from] SurfaceError),

    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] cairo::IoError),

    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),

    #[error("pixel data unavailable: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Encodes `snapshot` as an image file in `format`.
///
/// `quality` (1-100) applies to JPEG only but is validated for every format
/// so callers get the same answer regardless of format.
pub fn encode_snapshot(
    snapshot: &Snapshot,
    format: ExportFormat,
    quality: u8,
) -> Result<Vec<u8>, ExportError> {
    if !(1..=100).contains(&quality) {
        return Err(ExportError::InvalidQuality(quality));
    }

    let content = snapshot_surface(snapshot)?;
    let bytes = match format {
        ExportFormat::Png => encode_png(&content)?,
        ExportFormat::Jpeg => encode_jpeg(&content, quality)?,
    };

    log::debug!(
        "Encoded {}x{} canvas as {} ({} bytes)",
        content.width(),
        content.height(),
        format,
        bytes.len()
    );
    Ok(bytes)
}

/// Rebuilds a Cairo surface from a snapshot.
fn snapshot_surface(snapshot: &Snapshot) -> Result<ImageSurface, ExportError> {
    let decoded = snapshot.decode()?;
    let stride = Format::ARgb32.stride_for_width(decoded.width)?;
    if stride as u32 != decoded.stride {
        return Err(SnapshotError::InvalidGeometry {
            width: decoded.width,
            height: decoded.height,
            stride: decoded.stride,
        }
        .into());
    }
    Ok(ImageSurface::create_for_data(
        decoded.data,
        Format::ARgb32,
        decoded.width as i32,
        decoded.height as i32,
        stride,
    )?)
}

fn encode_png(content: &ImageSurface) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    content.write_to_png(&mut out)?;
    Ok(out)
}

fn encode_jpeg(content: &ImageSurface, quality: u8) -> Result<Vec<u8>, ExportError> {
    let width = content.width();
    let height = content.height();

    let flat = ImageSurface::create(Format::Rgb24, width, height)?;
    {
        let ctx = Context::new(&flat)?;
        render_flattened(&ctx, content, WHITE)?;
    }
    flat.flush();

    let stride = flat.stride() as usize;
    let mut rgb = RgbImage::new(width as u32, height as u32);
    flat.with_data(|data| {
        for (x, y, pixel) in rgb.enumerate_pixels_mut() {
            let offset = y as usize * stride + x as usize * 4;
            if let Some(px) = data.get(offset..offset + 4) {
                // RGB24 stores 0x00RRGGBB in native byte order
                let word = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                *pixel = Rgb([(word >> 16) as u8, (word >> 8) as u8, word as u8]);
            }
        }
    })?;

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}
