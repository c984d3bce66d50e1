//! kartta-pipeline: Pure map-coloring pipeline (sans-IO).
//!
//! Transforms a raster "map" image into a colored map:
//! bitmap decode -> region segmentation -> adjacency graph ->
//! Welsh-Powell coloring -> repaint.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File access and terminal
//! output live in the `kartta` binary crate.
//!
//! Data flows strictly left to right: each stage produces an immutable
//! result consumed by the next, and nothing mutates another stage's
//! output in place. Stages report notable facts to an injected
//! [`EventSink`]; recovered anomalies (coloring degeneracies, palette
//! substitutions) are surfaced through events and diagnostics counts,
//! never as errors.

pub mod bmp;
pub mod color;
pub mod diagnostics;
pub mod events;
pub mod graph;
pub mod paint;
pub mod segment;
pub mod types;

use std::time::Instant;

pub use bmp::Bitmap;
pub use events::{AdjacencyOrigin, EventSink, MemorySink, NullSink, PipelineEvent};
pub use types::{
    Dimensions, Palette, PipelineConfig, PipelineError, ProcessResult, RegionMap, StagedResult,
};

use diagnostics::{PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics};

/// Run the full map-coloring pipeline.
///
/// Takes raw BMP bytes and a configuration, then produces a
/// [`ProcessResult`] containing the recolored bitmap and summary counts.
///
/// # Pipeline steps
///
/// 1. Decode the 24-bit bitmap container
/// 2. Segment near-white pixels into 4-connected regions
/// 3. Build the region adjacency graph (direct + through-border contact)
/// 4. Color the graph (Welsh-Powell, at most `config.max_colors` colors)
/// 5. Repaint the grid from the assignment and palette
///
/// # Errors
///
/// Returns the decode errors described on [`Bitmap::decode`], or
/// [`PipelineError::InvalidDimensions`] if the label grid cannot be
/// addressed. Coloring degeneracies and palette substitutions do not
/// error; they are reported through `sink` and the result counts.
pub fn process(
    bytes: &[u8],
    config: &PipelineConfig,
    sink: &mut dyn EventSink,
) -> Result<ProcessResult, PipelineError> {
    // 1. Decode.
    let bitmap = Bitmap::decode(bytes)?;
    let dimensions = bitmap.dimensions();

    // 2. Segment into labeled regions.
    let segmentation = segment::segment(bitmap.pixels(), config.white_threshold, sink)?;

    // 3. Build the adjacency graph.
    let graph = graph::build(segmentation.labels(), segmentation.region_count(), sink);

    // 4. Color it.
    let coloring = color::color(&graph, config.max_colors, sink);

    // 5. Repaint.
    let (pixels, _stats) = paint::paint(segmentation.labels(), &coloring, &config.palette, sink);

    Ok(ProcessResult {
        region_count: segmentation.region_count(),
        colors_used: coloring.colors_used(),
        fallback_count: coloring.fallback_count(),
        bitmap: bitmap.with_pixels(pixels),
        dimensions,
    })
}

/// Run the pipeline, preserving every intermediate stage output and
/// collecting per-stage diagnostics.
///
/// Same computation as [`process`]; use this when the caller wants to
/// inspect the segmentation, graph, or coloring, or to print the
/// diagnostics report.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    bytes: &[u8],
    config: &PipelineConfig,
    sink: &mut dyn EventSink,
) -> Result<StagedResult, PipelineError> {
    let run_start = Instant::now();

    let stage_start = Instant::now();
    let original = Bitmap::decode(bytes)?;
    let dimensions = original.dimensions();
    let decode = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Decode {
            input_bytes: bytes.len(),
            width: dimensions.width,
            height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
        },
    };

    let stage_start = Instant::now();
    let segmentation = segment::segment(original.pixels(), config.white_threshold, sink)?;
    let interior_pixel_count = segmentation
        .labels()
        .labels()
        .iter()
        .filter(|&&label| label != 0)
        .count() as u64;
    let seg_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Segmentation {
            region_count: segmentation.region_count(),
            interior_pixel_count,
            border_pixel_count: dimensions.pixel_count() - interior_pixel_count,
        },
    };

    let stage_start = Instant::now();
    let graph = graph::build(segmentation.labels(), segmentation.region_count(), sink);
    let (direct_contact_edges, through_border_edges) = graph.origin_counts();
    let max_degree = (1..=graph.region_count())
        .map(|v| graph.degree(v))
        .max()
        .unwrap_or(0);
    let graph_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Graph {
            vertex_count: graph.region_count(),
            edge_count: graph.edge_count(),
            direct_contact_edges,
            through_border_edges,
            max_degree,
        },
    };

    let stage_start = Instant::now();
    let coloring = color::color(&graph, config.max_colors, sink);
    let coloring_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Coloring {
            max_colors: config.max_colors,
            colors_used: coloring.colors_used(),
            fallback_count: coloring.fallback_count(),
        },
    };

    let stage_start = Instant::now();
    let (pixels, paint_stats) =
        paint::paint(segmentation.labels(), &coloring, &config.palette, sink);
    let paint_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Paint {
            colored_pixels: paint_stats.colored_pixels,
            border_pixels: paint_stats.border_pixels,
            substituted_pixels: paint_stats.substituted_pixels,
        },
    };

    let diagnostics = PipelineDiagnostics {
        decode,
        segmentation: seg_diag,
        graph: graph_diag,
        coloring: coloring_diag,
        paint: paint_diag,
        total_duration: run_start.elapsed(),
        summary: PipelineSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
            region_count: segmentation.region_count(),
            edge_count: graph.edge_count(),
            colors_used: coloring.colors_used(),
            fallback_count: coloring.fallback_count(),
        },
    };

    Ok(StagedResult {
        recolored: original.with_pixels(pixels),
        original,
        segmentation,
        graph,
        coloring,
        paint_stats,
        dimensions,
        diagnostics,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RgbImage;
    use image::Rgb;

    /// Encode a synthetic bitmap from rows of '#' (white) and '.' (black).
    fn bmp_from_art(art: &[&str]) -> Vec<u8> {
        let height = art.len() as u32;
        let width = art[0].len() as u32;
        let img = RgbImage::from_fn(width, height, |x, y| {
            if art[y as usize].as_bytes()[x as usize] == b'#' {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        Bitmap::from_pixels(img).encode()
    }

    #[test]
    fn all_white_image_becomes_solid_red() {
        let bytes = bmp_from_art(&["####", "####", "####", "####"]);
        let result = process(&bytes, &PipelineConfig::default(), &mut NullSink).unwrap();
        assert_eq!(result.region_count, 1);
        assert_eq!(result.colors_used, 1);
        assert_eq!(result.fallback_count, 0);
        for pixel in result.bitmap.pixels().pixels() {
            assert_eq!(*pixel, Rgb([255, 0, 0]));
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = process(&[], &PipelineConfig::default(), &mut NullSink);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_input_is_rejected() {
        let result = process(&[0xFF, 0x00], &PipelineConfig::default(), &mut NullSink);
        assert!(matches!(result, Err(PipelineError::TruncatedHeader { .. })));
    }

    #[test]
    fn two_regions_through_border_get_distinct_colors() {
        let bytes = bmp_from_art(&[
            "#.#", //
            "#.#", //
            "#.#",
        ]);
        let result = process(&bytes, &PipelineConfig::default(), &mut NullSink).unwrap();
        assert_eq!(result.region_count, 2);
        assert_eq!(result.colors_used, 2);
        let left = *result.bitmap.pixels().get_pixel(0, 1);
        let right = *result.bitmap.pixels().get_pixel(2, 1);
        assert_ne!(left, right);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let bytes = bmp_from_art(&[
            "##.##", //
            "##.##", //
            ".....", //
            "##.##",
        ]);
        let config = PipelineConfig::default();
        let first = process(&bytes, &config, &mut NullSink).unwrap();
        let second = process(&bytes, &config, &mut NullSink).unwrap();
        assert_eq!(first.bitmap.encode(), second.bitmap.encode());
        assert_eq!(first.colors_used, second.colors_used);
    }

    #[test]
    fn staged_result_keeps_intermediates_consistent() {
        let bytes = bmp_from_art(&[
            "#.#", //
            "...", //
            "#.#",
        ]);
        let staged = process_staged(&bytes, &PipelineConfig::default(), &mut NullSink).unwrap();
        assert_eq!(staged.segmentation.region_count(), 4);
        assert_eq!(
            staged.graph.region_count(),
            staged.segmentation.region_count(),
        );
        assert_eq!(staged.diagnostics.summary.region_count, 4);
        assert_eq!(staged.diagnostics.summary.edge_count, staged.graph.edge_count());
        assert_eq!(
            staged.paint_stats.colored_pixels + staged.paint_stats.border_pixels,
            staged.dimensions.pixel_count(),
        );
        // The recolored bitmap still encodes with the original's header
        // fields and dimensions.
        assert_eq!(staged.recolored.dimensions(), staged.original.dimensions());
    }

    #[test]
    fn staged_and_plain_process_agree() {
        let bytes = bmp_from_art(&[
            "##.##", //
            "##.##",
        ]);
        let config = PipelineConfig::default();
        let plain = process(&bytes, &config, &mut NullSink).unwrap();
        let staged = process_staged(&bytes, &config, &mut NullSink).unwrap();
        assert_eq!(plain.bitmap.encode(), staged.recolored.encode());
        assert_eq!(plain.region_count, staged.segmentation.region_count());
        assert_eq!(plain.colors_used, staged.coloring.colors_used());
    }

    #[test]
    fn event_stream_covers_all_stages() {
        let bytes = bmp_from_art(&[
            "#.#", //
            "#.#",
        ]);
        let mut sink = MemorySink::new();
        process(&bytes, &PipelineConfig::default(), &mut sink).unwrap();
        let events = sink.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::RegionDiscovered { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::EdgeAdded { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::ColorAssigned { .. })));
    }
}
