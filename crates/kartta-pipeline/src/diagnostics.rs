//! Pipeline diagnostics: timing and counts for each stage.
//!
//! These diagnostics are permanent instrumentation. Every call to
//! [`process_staged`](crate::process_staged) collects them alongside the
//! pipeline results; the self-healing anomaly counts (coloring fallbacks,
//! palette substitutions) surface here so that no recovered condition
//! goes unreported.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: bitmap decoding.
    pub decode: StageDiagnostics,
    /// Stage 2: region segmentation.
    pub segmentation: StageDiagnostics,
    /// Stage 3: adjacency graph construction.
    pub graph: StageDiagnostics,
    /// Stage 4: Welsh–Powell coloring.
    pub coloring: StageDiagnostics,
    /// Stage 5: repainting.
    pub paint: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Bitmap decoding metrics.
    Decode {
        /// Size of the input byte stream.
        input_bytes: usize,
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Region segmentation metrics.
    Segmentation {
        /// Number of regions found.
        region_count: u32,
        /// Pixels classified region-interior.
        interior_pixel_count: u64,
        /// Pixels classified border/background.
        border_pixel_count: u64,
    },
    /// Adjacency graph metrics.
    Graph {
        /// Region vertices (excluding the reserved vertex 0).
        vertex_count: u32,
        /// Distinct adjacency edges.
        edge_count: usize,
        /// Edges found by direct pixel contact.
        direct_contact_edges: usize,
        /// Edges found across single border pixels.
        through_border_edges: usize,
        /// Highest vertex degree.
        max_degree: usize,
    },
    /// Coloring metrics.
    Coloring {
        /// Palette limit the colorer was given.
        max_colors: u8,
        /// Distinct colors actually used.
        colors_used: u8,
        /// Vertices that exhausted the palette and fell back to color 1.
        fallback_count: u32,
    },
    /// Repainting metrics.
    Paint {
        /// Pixels painted with a region color.
        colored_pixels: u64,
        /// Pixels painted with the border color.
        border_pixels: u64,
        /// Pixels that needed the fallback palette entry.
        substituted_pixels: u64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of regions found.
    pub region_count: u32,
    /// Number of adjacency edges.
    pub edge_count: usize,
    /// Distinct colors used.
    pub colors_used: u8,
    /// Coloring fallbacks (0 on healthy four-colorable inputs).
    pub fallback_count: u32,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Map Coloring Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages: [(&str, &StageDiagnostics); 5] = [
            ("Decode", &self.decode),
            ("Segmentation", &self.segmentation),
            ("Graph", &self.graph),
            ("Coloring", &self.coloring),
            ("Paint", &self.paint),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Regions: {}  |  Edges: {}  |  Colors used: {}  |  Fallbacks: {}",
            self.summary.region_count,
            self.summary.edge_count,
            self.summary.colors_used,
            self.summary.fallback_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Segmentation {
            region_count,
            interior_pixel_count,
            border_pixel_count,
        } => format!(
            "{region_count} regions ({interior_pixel_count} interior, {border_pixel_count} border px)",
        ),
        StageMetrics::Graph {
            vertex_count,
            edge_count,
            direct_contact_edges,
            through_border_edges,
            max_degree,
        } => format!(
            "{vertex_count} vertices, {edge_count} edges ({direct_contact_edges} direct, {through_border_edges} through-border, max degree {max_degree})",
        ),
        StageMetrics::Coloring {
            max_colors,
            colors_used,
            fallback_count,
        } => format!("{colors_used}/{max_colors} colors, {fallback_count} fallbacks"),
        StageMetrics::Paint {
            colored_pixels,
            border_pixels,
            substituted_pixels,
        } => format!(
            "{colored_pixels} colored, {border_pixels} border, {substituted_pixels} substituted px",
        ),
    }
}
