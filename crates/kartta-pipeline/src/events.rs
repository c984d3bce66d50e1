//! Pipeline events: the injected audit-log collaborator.
//!
//! Each stage reports notable facts (discovered regions, inserted edges,
//! color decisions, recovered anomalies) to an [`EventSink`] passed in by
//! the caller. The sink is a write-only, append-only side channel: no
//! stage depends on anything a sink returns, and the no-op [`NullSink`]
//! is always a valid choice.
//!
//! This replaces a process-wide log file with open/close lifecycle; the
//! pipeline stays testable without any I/O by recording into a
//! [`MemorySink`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an adjacency between two regions was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjacencyOrigin {
    /// The regions share pixels that touch orthogonally.
    DirectContact,
    /// The regions are separated only by a single border pixel.
    ThroughBorder,
}

impl fmt::Display for AdjacencyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectContact => f.write_str("direct contact"),
            Self::ThroughBorder => f.write_str("through border"),
        }
    }
}

/// A notable fact reported by a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Segmentation discovered a new region at its raster-scan seed.
    RegionDiscovered {
        /// Freshly assigned region id.
        id: u32,
        /// Seed pixel column.
        x: u32,
        /// Seed pixel row.
        y: u32,
    },

    /// The graph builder inserted a new edge.
    EdgeAdded {
        /// One endpoint region id.
        a: u32,
        /// The other endpoint region id.
        b: u32,
        /// Detection source.
        origin: AdjacencyOrigin,
        /// Pixel column where the adjacency was observed.
        x: u32,
        /// Pixel row where the adjacency was observed.
        y: u32,
    },

    /// The colorer assigned a region its color.
    ColorAssigned {
        /// Region id.
        region: u32,
        /// Assigned color id.
        color: u8,
    },

    /// The colorer exhausted the palette for a region and fell back to
    /// color 1. Recovered locally; the output may contain two adjacent
    /// regions of the same color.
    ColorFallback {
        /// Region id that could not be colored within the limit.
        region: u32,
    },

    /// The painter met a color id with no palette entry and substituted
    /// the designated fallback entry.
    PaletteSubstituted {
        /// Region id whose color was out of range.
        region: u32,
        /// The out-of-range color id.
        color: u8,
    },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegionDiscovered { id, x, y } => {
                write!(f, "region {id} discovered at ({x}, {y})")
            }
            Self::EdgeAdded { a, b, origin, x, y } => {
                write!(f, "added edge: region {a} <-> region {b} ({origin} at {x},{y})")
            }
            Self::ColorAssigned { region, color } => {
                write!(f, "region {region}: assigned color {color}")
            }
            Self::ColorFallback { region } => {
                write!(
                    f,
                    "region {region}: no safe color within the palette limit, using fallback color 1",
                )
            }
            Self::PaletteSubstituted { region, color } => {
                write!(
                    f,
                    "region {region}: color {color} has no palette entry, substituting fallback",
                )
            }
        }
    }
}

/// Receiver for pipeline events.
///
/// Implementations must treat `record` as append-only; stages never read
/// anything back.
pub trait EventSink {
    /// Record one event.
    fn record(&mut self, event: PipelineEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: PipelineEvent) {}
}

/// Collects events in memory, mainly for tests and inspection.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Vec<PipelineEvent>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Recorded events, in order.
    #[must_use]
    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Consume the sink and return the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<PipelineEvent> {
        self.events
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}
