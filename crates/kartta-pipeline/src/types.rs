//! Shared types for the kartta map-coloring pipeline.

use serde::{Deserialize, Serialize};

use crate::bmp::Bitmap;
use crate::color::Coloring;
use crate::diagnostics::PipelineDiagnostics;
use crate::graph::RegionGraph;
use crate::paint::PaintStats;
use crate::segment::Segmentation;

/// Re-export `RgbImage` so downstream crates can reference the in-memory
/// pixel grid without depending on `image` directly.
pub use image::RgbImage;

/// Re-export the `Rgb` pixel type alongside the grid it fills.
pub use image::Rgb;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Per-pixel region labels produced by segmentation.
///
/// Same dimensions as the source pixel grid. Each cell holds a region id:
/// `0` for border/background pixels, `1..=N` for one of the `N` detected
/// regions. Two cells share a positive id iff they are 4-connected through
/// cells of that id; ids are dense in raster-scan discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMap {
    dimensions: Dimensions,
    labels: Vec<u32>,
}

impl RegionMap {
    /// Create a zero-filled label grid.
    ///
    /// Only the segmenter constructs these; everything downstream reads.
    pub(crate) fn new(dimensions: Dimensions) -> Self {
        // Callers validate that the pixel count fits in usize.
        #[allow(clippy::cast_possible_truncation)]
        let len = dimensions.pixel_count() as usize;
        Self {
            dimensions,
            labels: vec![0; len],
        }
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Label at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.labels[self.index(x, y)]
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, label: u32) {
        let idx = self.index(x, y);
        self.labels[idx] = label;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.dimensions.width && y < self.dimensions.height);
        (y as usize) * (self.dimensions.width as usize) + (x as usize)
    }

    /// All labels in raster order.
    #[must_use]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }
}

/// The fixed color table used when repainting.
///
/// Index 0 is reserved for border/background pixels and is never an
/// assignable region color; indices `1..` are the region colors in the
/// order the colorer assigns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    /// Index of the designated fallback entry, substituted when a color id
    /// has no palette entry. Entry 1 is the first assignable region color,
    /// never the border.
    pub const FALLBACK_INDEX: u8 = 1;

    /// Create a palette from explicit entries.
    ///
    /// `entries[0]` is the border color; the rest are region colors in
    /// assignment order. A palette needs the border entry plus at least
    /// one region color.
    #[must_use]
    pub fn new(entries: Vec<[u8; 3]>) -> Self {
        debug_assert!(entries.len() >= 2, "palette needs a border and a region color");
        Self { entries }
    }

    /// The classic five-entry palette: black borders, then red, green,
    /// blue, and yellow regions.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            entries: vec![
                [0, 0, 0],       // 0 - border
                [255, 0, 0],     // 1 - red
                [0, 255, 0],     // 2 - green
                [0, 0, 255],     // 3 - blue
                [255, 255, 0],   // 4 - yellow
            ],
        }
    }

    /// Border/background color (entry 0).
    #[must_use]
    pub fn border(&self) -> Rgb<u8> {
        Rgb(self.entries[0])
    }

    /// The entry for an assigned color id, or `None` if the id is outside
    /// the palette.
    #[must_use]
    pub fn get(&self, color: u8) -> Option<Rgb<u8>> {
        if color == 0 {
            return None;
        }
        self.entries.get(color as usize).copied().map(Rgb)
    }

    /// The designated fallback entry.
    #[must_use]
    pub fn fallback(&self) -> Rgb<u8> {
        Rgb(self.entries[Self::FALLBACK_INDEX as usize])
    }

    /// Number of assignable region colors (entries minus the border).
    #[must_use]
    pub fn assignable_colors(&self) -> u8 {
        u8::try_from(self.entries.len().saturating_sub(1)).unwrap_or(u8::MAX)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

/// Configuration for the map-coloring pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Channel threshold for region-interior classification: a pixel is
    /// region-interior iff all three channels exceed this value.
    pub white_threshold: u8,

    /// Maximum number of distinct region colors the colorer may assign.
    /// The four-color theorem makes 4 sufficient for planar subdivision
    /// maps; non-planar inputs trigger the reported fallback instead.
    pub max_colors: u8,

    /// Color table used when repainting.
    pub palette: Palette,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            white_threshold: 250,
            max_colors: 4,
            palette: Palette::classic(),
        }
    }
}

/// Result of running the full map-coloring pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// The recolored bitmap, ready to encode.
    pub bitmap: Bitmap,
    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
    /// Number of regions found.
    pub region_count: u32,
    /// Distinct colors used.
    pub colors_used: u8,
    /// Coloring fallbacks (0 for four-colorable inputs).
    pub fallback_count: u32,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved, enabling inspection of every step.
///
/// Does not derive `PartialEq` or serde traits: the adjacency graph's
/// petgraph storage supports neither, and nothing crosses a
/// serialization boundary here.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Stage 1: decoded source bitmap.
    pub original: Bitmap,
    /// Stage 2: region label grid and count.
    pub segmentation: Segmentation,
    /// Stage 3: region adjacency graph.
    pub graph: RegionGraph,
    /// Stage 4: color assignment.
    pub coloring: Coloring,
    /// Stage 5: pixel counts from the repaint.
    pub paint_stats: PaintStats,
    /// Stage 5: recolored bitmap, ready to encode.
    pub recolored: Bitmap,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
    /// Per-stage timing and metrics.
    pub diagnostics: PipelineDiagnostics,
}

/// Errors that abort the pipeline.
///
/// Coloring degeneracies and palette-range substitutions are deliberately
/// absent: those are self-healing conditions surfaced through events and
/// diagnostics counts, never through `Err`.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineError {
    /// The input byte slice was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The input ends before the fixed headers do.
    #[error("truncated header: need {expected} bytes, have {actual}")]
    TruncatedHeader {
        /// Bytes required by the fixed file + info headers.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The container signature was not `BM`.
    #[error("not a BMP file (bad magic)")]
    BadMagic,

    /// The info header is not the 40-byte `BITMAPINFOHEADER` layout.
    #[error("unsupported info header size {0}")]
    UnsupportedInfoHeader(u32),

    /// The container declares a bit depth other than 24.
    #[error("only 24-bit BMP files are supported, got {0} bits per pixel")]
    UnsupportedBitDepth(u16),

    /// The container declares a compression method; only uncompressed
    /// (method 0) data is supported.
    #[error("compressed BMP files are not supported (compression method {0})")]
    UnsupportedCompression(u32),

    /// Width or height is non-positive, or their product does not fit in
    /// memory-indexable range.
    #[error("invalid image dimensions {width} x {height}")]
    InvalidDimensions {
        /// Declared width.
        width: i32,
        /// Declared height.
        height: i32,
    },

    /// The pixel data section is shorter than the dimensions require.
    #[error("truncated pixel data: need {expected} bytes, have {actual}")]
    TruncatedPixelData {
        /// Bytes required by the declared dimensions.
        expected: usize,
        /// Bytes actually present after the pixel data offset.
        actual: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Dimensions tests ---

    #[test]
    fn pixel_count_multiplies() {
        let d = Dimensions {
            width: 640,
            height: 480,
        };
        assert_eq!(d.pixel_count(), 307_200);
    }

    #[test]
    fn pixel_count_does_not_overflow_u32() {
        let d = Dimensions {
            width: u32::MAX,
            height: 2,
        };
        assert_eq!(d.pixel_count(), u64::from(u32::MAX) * 2);
    }

    // --- RegionMap tests ---

    #[test]
    fn region_map_starts_zeroed() {
        let map = RegionMap::new(Dimensions {
            width: 3,
            height: 2,
        });
        assert!(map.labels().iter().all(|&l| l == 0));
        assert_eq!(map.labels().len(), 6);
    }

    #[test]
    fn region_map_set_get_round_trip() {
        let mut map = RegionMap::new(Dimensions {
            width: 4,
            height: 3,
        });
        map.set(2, 1, 7);
        assert_eq!(map.get(2, 1), 7);
        assert_eq!(map.get(1, 2), 0);
    }

    // --- Palette tests ---

    #[test]
    fn classic_palette_matches_reference_colors() {
        let p = Palette::classic();
        assert_eq!(p.border(), Rgb([0, 0, 0]));
        assert_eq!(p.get(1), Some(Rgb([255, 0, 0])));
        assert_eq!(p.get(2), Some(Rgb([0, 255, 0])));
        assert_eq!(p.get(3), Some(Rgb([0, 0, 255])));
        assert_eq!(p.get(4), Some(Rgb([255, 255, 0])));
    }

    #[test]
    fn palette_rejects_out_of_range_ids() {
        let p = Palette::classic();
        assert_eq!(p.get(0), None);
        assert_eq!(p.get(5), None);
        assert_eq!(p.get(255), None);
    }

    #[test]
    fn palette_fallback_is_first_assignable_entry() {
        let p = Palette::classic();
        assert_eq!(p.fallback(), Rgb([255, 0, 0]));
    }

    #[test]
    fn classic_palette_has_four_assignable_colors() {
        assert_eq!(Palette::classic().assignable_colors(), 4);
    }

    // --- PipelineConfig tests ---

    #[test]
    fn config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.white_threshold, 250);
        assert_eq!(config.max_colors, 4);
        assert_eq!(config.palette, Palette::classic());
    }

    #[test]
    fn config_serde_round_trip() {
        let config = PipelineConfig {
            white_threshold: 200,
            max_colors: 3,
            palette: Palette::classic(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    // --- PipelineError tests ---

    #[test]
    fn error_display_messages() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty",
        );
        assert_eq!(
            PipelineError::BadMagic.to_string(),
            "not a BMP file (bad magic)",
        );
        assert_eq!(
            PipelineError::UnsupportedBitDepth(8).to_string(),
            "only 24-bit BMP files are supported, got 8 bits per pixel",
        );
        assert_eq!(
            PipelineError::TruncatedPixelData {
                expected: 64,
                actual: 10,
            }
            .to_string(),
            "truncated pixel data: need 64 bytes, have 10",
        );
    }
}
