//! Graph coloring: Welsh–Powell greedy assignment.
//!
//! Vertices are processed in descending degree order (ties broken by
//! ascending region id, so the order is fully deterministic) and each
//! receives the lowest-numbered color not used by an already-colored
//! neighbor.
//!
//! Four colors suffice for planar subdivision maps, but malformed or
//! non-planar inputs may locally need a fifth. That case is recovered,
//! not fatal: the vertex falls back to color 1, the degeneracy is counted
//! and reported, and the pipeline carries on. The visible output may then
//! contain two adjacent regions of the same color.

use std::cmp::Reverse;

use crate::events::{EventSink, PipelineEvent};
use crate::graph::RegionGraph;

/// Color every vertex falls back to when the palette limit is exhausted.
const FALLBACK_COLOR: u8 = 1;

/// A complete color assignment for the region graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    /// Color per region id; index 0 is unused and stays 0.
    colors: Vec<u8>,
    colors_used: u8,
    fallback_count: u32,
}

impl Coloring {
    /// The color assigned to `region`, or `None` for label 0 or a region
    /// id outside the assignment.
    #[must_use]
    pub fn color_of(&self, region: u32) -> Option<u8> {
        if region == 0 {
            return None;
        }
        self.colors.get(region as usize).copied().filter(|&c| c > 0)
    }

    /// Highest color id assigned to any vertex (0 for an empty graph).
    #[must_use]
    pub const fn colors_used(&self) -> u8 {
        self.colors_used
    }

    /// Number of vertices that exhausted the palette and fell back to
    /// color 1.
    #[must_use]
    pub const fn fallback_count(&self) -> u32 {
        self.fallback_count
    }
}

/// Color the region graph with at most `max_colors` colors.
///
/// Reports a [`PipelineEvent::ColorAssigned`] per vertex and a
/// [`PipelineEvent::ColorFallback`] per palette exhaustion. Given the
/// same graph, the assignment is always identical.
#[must_use]
pub fn color(graph: &RegionGraph, max_colors: u8, sink: &mut dyn EventSink) -> Coloring {
    let region_count = graph.region_count();

    let mut order: Vec<u32> = (1..=region_count).collect();
    order.sort_unstable_by_key(|&v| (Reverse(graph.degree(v)), v));

    let mut colors = vec![0u8; region_count as usize + 1];
    let mut colors_used = 0u8;
    let mut fallback_count = 0u32;

    for &vertex in &order {
        let assigned = (1..=max_colors).find(|&c| is_color_safe(graph, &colors, vertex, c));
        match assigned {
            Some(c) => {
                colors[vertex as usize] = c;
                colors_used = colors_used.max(c);
                sink.record(PipelineEvent::ColorAssigned {
                    region: vertex,
                    color: c,
                });
            }
            None => {
                colors[vertex as usize] = FALLBACK_COLOR;
                colors_used = colors_used.max(FALLBACK_COLOR);
                fallback_count += 1;
                sink.record(PipelineEvent::ColorFallback { region: vertex });
            }
        }
    }

    Coloring {
        colors,
        colors_used,
        fallback_count,
    }
}

/// Does no already-colored neighbor of `vertex` use `candidate`?
fn is_color_safe(graph: &RegionGraph, colors: &[u8], vertex: u32, candidate: u8) -> bool {
    graph
        .neighbors(vertex)
        .all(|n| colors[n as usize] != candidate)
}
