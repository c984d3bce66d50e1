//! Region segmentation: label 4-connected components of near-white pixels.
//!
//! A pixel is region-interior iff all three channels exceed the configured
//! threshold; everything else is border/background (label 0). A raster
//! scan assigns dense ids `1..=N` in discovery order, flooding each new
//! component completely before the scan continues.
//!
//! The flood fill runs on an explicit work-list. A recursive fill costs
//! one call frame per pixel and exhausts the stack on large contiguous
//! regions (a full-frame white image is a legal input), so recursion is
//! not an option here.

use crate::events::{EventSink, PipelineEvent};
use crate::types::{Dimensions, PipelineError, RegionMap, Rgb, RgbImage};

/// Result of segmenting a pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    labels: RegionMap,
    region_count: u32,
}

impl Segmentation {
    /// The per-pixel label grid.
    #[must_use]
    pub const fn labels(&self) -> &RegionMap {
        &self.labels
    }

    /// Number of regions found; labels run `1..=region_count`.
    #[must_use]
    pub const fn region_count(&self) -> u32 {
        self.region_count
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.labels.dimensions()
    }
}

/// Is this pixel region-interior (near-white)?
const fn is_interior(pixel: Rgb<u8>, threshold: u8) -> bool {
    pixel.0[0] > threshold && pixel.0[1] > threshold && pixel.0[2] > threshold
}

/// Segment a pixel grid into labeled regions.
///
/// Regions are maximal 4-connected sets of near-white pixels; diagonal
/// contact does not connect. Ids are assigned densely in the order the
/// raster scan first reaches each region, which makes the labeling fully
/// deterministic for a given input.
///
/// Reports a [`PipelineEvent::RegionDiscovered`] per region with its seed
/// coordinates.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] when the label grid for
/// this image cannot be addressed on the current platform (the pixel
/// count exceeds `usize`). No partial labeling is produced.
pub fn segment(
    pixels: &RgbImage,
    white_threshold: u8,
    sink: &mut dyn EventSink,
) -> Result<Segmentation, PipelineError> {
    let dimensions = Dimensions {
        width: pixels.width(),
        height: pixels.height(),
    };
    if usize::try_from(dimensions.pixel_count()).is_err() {
        #[allow(clippy::cast_possible_wrap)]
        return Err(PipelineError::InvalidDimensions {
            width: dimensions.width as i32,
            height: dimensions.height as i32,
        });
    }

    let mut labels = RegionMap::new(dimensions);
    let mut next_id = 1u32;

    for y in 0..dimensions.height {
        for x in 0..dimensions.width {
            if labels.get(x, y) != 0 || !is_interior(*pixels.get_pixel(x, y), white_threshold) {
                continue;
            }
            sink.record(PipelineEvent::RegionDiscovered { id: next_id, x, y });
            flood_fill(pixels, &mut labels, white_threshold, (x, y), next_id);
            next_id += 1;
        }
    }

    Ok(Segmentation {
        labels,
        region_count: next_id - 1,
    })
}

/// Flood one 4-connected component from `seed`, labeling it `id`.
///
/// Work-list driven: cells are labeled when pushed, so no cell is visited
/// twice and the pending vector is bounded by the component size.
fn flood_fill(
    pixels: &RgbImage,
    labels: &mut RegionMap,
    threshold: u8,
    seed: (u32, u32),
    id: u32,
) {
    let Dimensions { width, height } = labels.dimensions();
    let mut pending = vec![seed];
    labels.set(seed.0, seed.1, id);

    while let Some((x, y)) = pending.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= width || ny >= height {
                continue;
            }
            if labels.get(nx, ny) == 0 && is_interior(*pixels.get_pixel(nx, ny), threshold) {
                labels.set(nx, ny, id);
                pending.push((nx, ny));
            }
        }
    }
}
