//! Repaint the pixel grid from the color assignment.
//!
//! Border/background pixels (label 0) take palette entry 0; region pixels
//! take the palette entry of their assigned color. Lookups are guarded:
//! a color id without a palette entry, or a label the coloring never
//! covered, substitutes the designated fallback entry instead of indexing
//! out of bounds. Substitutions are counted and reported once per region.

use serde::{Deserialize, Serialize};

use crate::color::Coloring;
use crate::events::{EventSink, PipelineEvent};
use crate::types::{Palette, RegionMap, RgbImage};

/// Pixel counts from a paint pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintStats {
    /// Pixels painted with their region's palette color.
    pub colored_pixels: u64,
    /// Pixels painted with the border color (label 0).
    pub border_pixels: u64,
    /// Pixels painted with the fallback entry because their color id had
    /// no palette entry (counted within `colored_pixels` as well).
    pub substituted_pixels: u64,
}

/// Paint a fresh pixel grid from labels, coloring, and palette.
///
/// The output has the same dimensions as the label grid and is built
/// whole; no partially repainted grid is ever observable. Reports one
/// [`PipelineEvent::PaletteSubstituted`] per region whose lookup failed
/// (event field `color` is 0 when the region had no assignment at all).
#[must_use]
pub fn paint(
    labels: &RegionMap,
    coloring: &Coloring,
    palette: &Palette,
    sink: &mut dyn EventSink,
) -> (RgbImage, PaintStats) {
    let dims = labels.dimensions();
    let mut out = RgbImage::new(dims.width, dims.height);
    let mut stats = PaintStats::default();
    let mut reported: Vec<u32> = Vec::new();

    for y in 0..dims.height {
        for x in 0..dims.width {
            let label = labels.get(x, y);
            if label == 0 {
                out.put_pixel(x, y, palette.border());
                stats.border_pixels += 1;
                continue;
            }

            let color = coloring.color_of(label);
            let entry = color.and_then(|c| palette.get(c));
            let pixel = entry.unwrap_or_else(|| {
                stats.substituted_pixels += 1;
                if !reported.contains(&label) {
                    reported.push(label);
                    sink.record(PipelineEvent::PaletteSubstituted {
                        region: label,
                        color: color.unwrap_or(0),
                    });
                }
                palette.fallback()
            });
            out.put_pixel(x, y, pixel);
            stats.colored_pixels += 1;
        }
    }

    (out, stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::{MemorySink, NullSink};
    use crate::types::{Dimensions, Rgb};
    use crate::{color, graph};

    /// Two single-pixel regions separated by a border column, with the
    /// interior border pixel that makes them adjacent.
    fn two_region_fixture() -> (RegionMap, Coloring) {
        let mut map = RegionMap::new(Dimensions {
            width: 3,
            height: 3,
        });
        map.set(0, 1, 1);
        map.set(2, 1, 2);
        let graph = graph::build(&map, 2, &mut NullSink);
        let coloring = color::color(&graph, 4, &mut NullSink);
        (map, coloring)
    }

    #[test]
    fn borders_take_entry_zero() {
        let (map, coloring) = two_region_fixture();
        let (out, stats) = paint(&map, &coloring, &Palette::classic(), &mut NullSink);
        assert_eq!(*out.get_pixel(1, 1), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(stats.border_pixels, 7);
        assert_eq!(stats.colored_pixels, 2);
        assert_eq!(stats.substituted_pixels, 0);
    }

    #[test]
    fn adjacent_regions_get_their_assigned_palette_entries() {
        let (map, coloring) = two_region_fixture();
        let palette = Palette::classic();
        let (out, _) = paint(&map, &coloring, &palette, &mut NullSink);
        let a = *out.get_pixel(0, 1);
        let b = *out.get_pixel(2, 1);
        assert_ne!(a, b);
        assert_eq!(a, palette.get(coloring.color_of(1).unwrap()).unwrap());
        assert_eq!(b, palette.get(coloring.color_of(2).unwrap()).unwrap());
    }

    #[test]
    fn missing_palette_entry_substitutes_fallback() {
        let (map, coloring) = two_region_fixture();
        // Only one assignable color: whichever region got color 2 has no
        // entry and must take the fallback instead.
        let palette = Palette::new(vec![[0, 0, 0], [200, 10, 10]]);
        let mut sink = MemorySink::new();
        let (out, stats) = paint(&map, &coloring, &palette, &mut sink);
        assert_eq!(stats.substituted_pixels, 1);
        assert_eq!(stats.colored_pixels, 2);
        assert_eq!(*out.get_pixel(0, 1), Rgb([200, 10, 10]));
        assert_eq!(*out.get_pixel(2, 1), Rgb([200, 10, 10]));
        let substitutions = sink
            .events()
            .iter()
            .filter(|e| matches!(e, PipelineEvent::PaletteSubstituted { .. }))
            .count();
        assert_eq!(substitutions, 1);
    }

    #[test]
    fn label_beyond_coloring_substitutes_fallback() {
        let (mut map, coloring) = two_region_fixture();
        map.set(1, 0, 9); // label the coloring never saw
        let mut sink = MemorySink::new();
        let (out, stats) = paint(&map, &coloring, &Palette::classic(), &mut sink);
        assert_eq!(*out.get_pixel(1, 0), Palette::classic().fallback());
        assert_eq!(stats.substituted_pixels, 1);
        assert_eq!(
            sink.events(),
            &[PipelineEvent::PaletteSubstituted {
                region: 9,
                color: 0,
            }],
        );
        assert_eq!(stats.border_pixels, 6);
    }

    #[test]
    fn substitution_is_reported_once_per_region() {
        let mut map = RegionMap::new(Dimensions {
            width: 4,
            height: 1,
        });
        for x in 0..4 {
            map.set(x, 0, 7); // one unknown region covering several pixels
        }
        let (_, coloring) = two_region_fixture();
        let mut sink = MemorySink::new();
        let (_, stats) = paint(&map, &coloring, &Palette::classic(), &mut sink);
        assert_eq!(stats.substituted_pixels, 4);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn output_dimensions_match_labels() {
        let map = RegionMap::new(Dimensions {
            width: 5,
            height: 3,
        });
        let (_, coloring) = two_region_fixture();
        let (out, stats) = paint(&map, &coloring, &Palette::classic(), &mut NullSink);
        assert_eq!(out.dimensions(), (5, 3));
        assert_eq!(stats.border_pixels, 15);
    }
}
