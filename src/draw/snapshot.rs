//! Lossless serialized images of the content buffer.
//!
//! A snapshot is a small header followed by the gzip-compressed raw pixel
//! rows of a Cairo ARGB32 surface (premultiplied, native byte order). Nothing
//! on this path is lossy, so decoding reproduces the buffer bit for bit.
//!
//! Layout:
//!
//! ```text
//! "DPSN" | version: u8 | width: u32 LE | height: u32 LE | stride: u32 LE | gzip(rows)
//! ```

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error;

const MAGIC: &[u8; 4] = b"DPSN";
const CURRENT_VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1 + 4 + 4 + 4;
const BYTES_PER_PIXEL: u32 = 4;

/// Largest canvas width or height a snapshot may describe.
pub const MAX_CANVAS_DIMENSION: u32 = 8192;

/// Errors raised while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is truncated ({0} bytes)")]
    Truncated(usize),

    #[error("snapshot has an unknown signature")]
    BadMagic,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid snapshot geometry {width}x{height} (stride {stride})")]
    InvalidGeometry { width: u32, height: u32, stride: u32 },

    #[error("snapshot pixel data has {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("snapshot compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

/// Raw pixel rows recovered from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub data: Vec<u8>,
}

/// Immutable encoded image of the content buffer at one instant.
///
/// Cloning is cheap; the encoded bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoded_len", &self.bytes.len())
            .finish()
    }
}

impl Snapshot {
    /// Encodes raw ARGB32 rows into a snapshot.
    pub fn encode(width: u32, height: u32, stride: u32, data: &[u8]) -> Result<Self, SnapshotError> {
        validate_geometry(width, height, stride)?;
        let expected = stride as usize * height as usize;
        if data.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut out = Vec::with_capacity(HEADER_LEN + data.len() / 8);
        out.extend_from_slice(MAGIC);
        out.push(CURRENT_VERSION);
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&stride.to_le_bytes());

        let mut encoder = GzEncoder::new(out, Compression::fast());
        encoder.write_all(data)?;
        let bytes = encoder.finish()?;

        Ok(Self {
            bytes: bytes.into(),
            width,
            height,
        })
    }

    /// Wraps previously encoded bytes, validating the header.
    ///
    /// The compressed payload is only checked by [`Snapshot::decode`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SnapshotError> {
        let header = Header::parse(&bytes)?;
        Ok(Self {
            bytes: bytes.into(),
            width: header.width,
            height: header.height,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Inflates the pixel rows.
    pub fn decode(&self) -> Result<DecodedImage, SnapshotError> {
        let header = Header::parse(&self.bytes)?;
        let expected = header.stride as usize * header.height as usize;

        // Grows with the inflated data, not with the size the header claims
        let mut data = Vec::new();
        GzDecoder::new(&self.bytes[HEADER_LEN..])
            .take(expected as u64 + 1)
            .read_to_end(&mut data)?;

        if data.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(DecodedImage {
            width: header.width,
            height: header.height,
            stride: header.stride,
            data,
        })
    }
}

struct Header {
    width: u32,
    height: u32,
    stride: u32,
}

impl Header {
    fn parse(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Truncated(bytes.len()));
        }
        if &bytes[0..4] != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        if bytes[4] != CURRENT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(bytes[4]));
        }

        let read_u32 = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let header = Self {
            width: read_u32(5),
            height: read_u32(9),
            stride: read_u32(13),
        };
        validate_geometry(header.width, header.height, header.stride)?;
        Ok(header)
    }
}

fn validate_geometry(width: u32, height: u32, stride: u32) -> Result<(), SnapshotError> {
    let dims_ok = (1..=MAX_CANVAS_DIMENSION).contains(&width)
        && (1..=MAX_CANVAS_DIMENSION).contains(&height);
    // Dimensions are bounded above, so these cannot overflow
    if dims_ok
        && stride >= width * BYTES_PER_PIXEL
        && stride <= MAX_CANVAS_DIMENSION * BYTES_PER_PIXEL
        && stride % 4 == 0
    {
        Ok(())
    } else {
        Err(SnapshotError::InvalidGeometry {
            width,
            height,
            stride,
        })
    }
}
