//! Bitmap container decode/encode.
//!
//! Handles the 24-bit uncompressed BMP layout: a 14-byte file header, a
//! 40-byte `BITMAPINFOHEADER`, and bottom-to-top rows of blue-green-red
//! pixel triples padded to 4-byte boundaries. The decoded in-memory grid
//! is an [`RgbImage`] in top-down RGB order; the codec performs the row
//! flip and channel swap at the container boundary.
//!
//! Header fields the pipeline does not interpret (reserved words, planes,
//! resolution, color counts) are carried through decode so that an
//! untouched grid re-encodes to the original bytes exactly.

use crate::types::{Dimensions, PipelineError, RgbImage};

/// Length of the fixed file header.
const FILE_HEADER_LEN: usize = 14;

/// Length of the `BITMAPINFOHEADER` info header.
const INFO_HEADER_LEN: usize = 40;

/// Combined header length; encode places pixel data immediately after.
const HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

/// Container signature, "BM".
const MAGIC: [u8; 2] = [0x42, 0x4D];

/// The only supported bit depth.
const BITS_PER_PIXEL: u16 = 24;

/// Bytes of padding appended to each row of `width` pixels.
const fn row_padding(width: u32) -> usize {
    ((4 - (width as usize * 3) % 4) % 4) as usize
}

/// A decoded bitmap: the pixel grid plus the container fields needed to
/// re-encode it bit-exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pixels: RgbImage,
    reserved: [u16; 2],
    planes: u16,
    /// Image-size field as read; 0 is legal for uncompressed data, so it
    /// is carried verbatim rather than recomputed.
    image_size: u32,
    x_pixels_per_meter: i32,
    y_pixels_per_meter: i32,
    colors_used: u32,
    colors_important: u32,
}

impl Bitmap {
    /// Wrap an in-memory pixel grid with canonical header fields.
    ///
    /// Used for synthetic inputs; decoded bitmaps keep whatever the
    /// container declared instead.
    #[must_use]
    pub fn from_pixels(pixels: RgbImage) -> Self {
        let row = pixels.width() as usize * 3 + row_padding(pixels.width());
        #[allow(clippy::cast_possible_truncation)]
        let image_size = (row * pixels.height() as usize) as u32;
        Self {
            pixels,
            reserved: [0, 0],
            planes: 1,
            image_size,
            x_pixels_per_meter: 0,
            y_pixels_per_meter: 0,
            colors_used: 0,
            colors_important: 0,
        }
    }

    /// Decode a BMP byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] on an empty slice,
    /// [`PipelineError::TruncatedHeader`] if the fixed headers are cut
    /// short, [`PipelineError::BadMagic`] on a wrong signature,
    /// [`PipelineError::UnsupportedInfoHeader`] /
    /// [`PipelineError::UnsupportedBitDepth`] /
    /// [`PipelineError::UnsupportedCompression`] on formats outside the
    /// 24-bit uncompressed layout,
    /// [`PipelineError::InvalidDimensions`] on non-positive or
    /// overflowing dimensions, and
    /// [`PipelineError::TruncatedPixelData`] if the pixel section is
    /// shorter than the dimensions require.
    pub fn decode(bytes: &[u8]) -> Result<Self, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        if bytes.len() < HEADER_LEN {
            return Err(PipelineError::TruncatedHeader {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0..2] != MAGIC {
            return Err(PipelineError::BadMagic);
        }

        let reserved = [read_u16(bytes, 6), read_u16(bytes, 8)];
        let data_offset = read_u32(bytes, 10) as usize;

        let info_size = read_u32(bytes, 14);
        if info_size as usize != INFO_HEADER_LEN {
            return Err(PipelineError::UnsupportedInfoHeader(info_size));
        }
        let width = read_i32(bytes, 18);
        let height = read_i32(bytes, 22);
        let planes = read_u16(bytes, 26);
        let bits_per_pixel = read_u16(bytes, 28);
        if bits_per_pixel != BITS_PER_PIXEL {
            return Err(PipelineError::UnsupportedBitDepth(bits_per_pixel));
        }
        let compression = read_u32(bytes, 30);
        if compression != 0 {
            return Err(PipelineError::UnsupportedCompression(compression));
        }
        if width <= 0 || height <= 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }

        #[allow(clippy::cast_sign_loss)]
        let (w, h) = (width as u32, height as u32);
        let row_len = w as usize * 3;
        let padded_row = row_len + row_padding(w);
        let expected = padded_row
            .checked_mul(h as usize)
            .ok_or(PipelineError::InvalidDimensions { width, height })?;
        let data = bytes
            .get(data_offset..)
            .ok_or(PipelineError::TruncatedPixelData {
                expected,
                actual: 0,
            })?;
        if data.len() < expected {
            return Err(PipelineError::TruncatedPixelData {
                expected,
                actual: data.len(),
            });
        }

        // Rows are stored bottom-to-top; the in-memory grid is top-down.
        let mut raw = Vec::with_capacity(row_len * h as usize);
        for y in 0..h {
            let file_row = (h - 1 - y) as usize;
            let row = &data[file_row * padded_row..file_row * padded_row + row_len];
            for bgr in row.chunks_exact(3) {
                raw.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
            }
        }
        let pixels = RgbImage::from_raw(w, h, raw)
            .ok_or(PipelineError::InvalidDimensions { width, height })?;

        Ok(Self {
            pixels,
            reserved,
            planes,
            image_size: read_u32(bytes, 34),
            x_pixels_per_meter: read_i32(bytes, 38),
            y_pixels_per_meter: read_i32(bytes, 42),
            colors_used: read_u32(bytes, 46),
            colors_important: read_u32(bytes, 50),
        })
    }

    /// Encode back to the container layout.
    ///
    /// Recomputes row padding, total file size, and the pixel-data offset
    /// (canonical 54); all carried-through fields are written as read.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let (w, h) = self.pixels.dimensions();
        let row_len = w as usize * 3;
        let padding = row_padding(w);
        let padded_row = row_len + padding;
        let file_size = HEADER_LEN + padded_row * h as usize;

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(&MAGIC);
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&self.reserved[0].to_le_bytes());
        out.extend_from_slice(&self.reserved[1].to_le_bytes());
        out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());

        out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
        #[allow(clippy::cast_possible_wrap)]
        out.extend_from_slice(&(w as i32).to_le_bytes());
        #[allow(clippy::cast_possible_wrap)]
        out.extend_from_slice(&(h as i32).to_le_bytes());
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // compression
        out.extend_from_slice(&self.image_size.to_le_bytes());
        out.extend_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.colors_used.to_le_bytes());
        out.extend_from_slice(&self.colors_important.to_le_bytes());

        // Rows bottom-to-top, BGR, zero-filled padding.
        for y in (0..h).rev() {
            for x in 0..w {
                let px = self.pixels.get_pixel(x, y).0;
                out.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            out.extend_from_slice(&[0u8; 4][..padding]);
        }
        out
    }

    /// The decoded pixel grid.
    #[must_use]
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Grid dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    /// Replace the pixel grid, keeping the carried-through header fields.
    ///
    /// The replacement must have the same dimensions; the painter always
    /// produces a same-sized grid.
    #[must_use]
    pub fn with_pixels(&self, pixels: RgbImage) -> Self {
        debug_assert_eq!(pixels.dimensions(), self.pixels.dimensions());
        Self {
            pixels,
            ..self.clone()
        }
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
