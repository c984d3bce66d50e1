//! Region adjacency graph construction.
//!
//! Vertices are region ids `1..=N` (vertex 0 is reserved and never joins
//! an edge). Two adjacency sources feed the edge set:
//!
//! 1. **Direct contact** — a pixel of region A with an orthogonal
//!    neighbor in a different region B.
//! 2. **Through-border contact** — an interior border pixel (label 0, not
//!    on the grid's outer edge) whose orthogonal neighbors span two or
//!    more distinct regions; every pair among them gets an edge. This is
//!    what catches regions separated by a one-pixel-wide drawn boundary,
//!    which direct contact alone misses because the pixel between them
//!    carries label 0 on both sides.
//!
//! A junction pixel may touch up to four distinct regions, contributing
//! up to six edges at once. Insertion is idempotent: an existing edge is
//! neither duplicated nor re-reported.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::events::{AdjacencyOrigin, EventSink, PipelineEvent};
use crate::types::{Dimensions, RegionMap};

/// The region adjacency graph.
///
/// Node index equals region id; edge weights record how the adjacency was
/// first detected. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct RegionGraph {
    graph: UnGraph<u32, AdjacencyOrigin>,
    region_count: u32,
}

impl RegionGraph {
    /// Number of region vertices (excluding the reserved vertex 0).
    #[must_use]
    pub const fn region_count(&self) -> u32 {
        self.region_count
    }

    /// Number of distinct adjacency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Is there an edge between regions `a` and `b`?
    #[must_use]
    pub fn adjacent(&self, a: u32, b: u32) -> bool {
        a != b
            && a <= self.region_count
            && b <= self.region_count
            && self
                .graph
                .contains_edge(NodeIndex::new(a as usize), NodeIndex::new(b as usize))
    }

    /// Number of distinct regions adjacent to `region`.
    #[must_use]
    pub fn degree(&self, region: u32) -> usize {
        self.graph
            .neighbors(NodeIndex::new(region as usize))
            .count()
    }

    /// Ids of the regions adjacent to `region`.
    pub fn neighbors(&self, region: u32) -> impl Iterator<Item = u32> + '_ {
        self.graph
            .neighbors(NodeIndex::new(region as usize))
            .map(|n| {
                #[allow(clippy::cast_possible_truncation)]
                let id = n.index() as u32;
                id
            })
    }

    /// Edge counts split by detection origin `(direct, through_border)`.
    #[must_use]
    pub fn origin_counts(&self) -> (usize, usize) {
        let direct = self
            .graph
            .edge_references()
            .filter(|e| *e.weight() == AdjacencyOrigin::DirectContact)
            .count();
        (direct, self.graph.edge_count() - direct)
    }

    /// Insert an edge unless it is a self-loop, touches vertex 0, or
    /// already exists. New edges are reported with the pixel coordinates
    /// where the adjacency was observed.
    fn add_edge_once(
        &mut self,
        a: u32,
        b: u32,
        origin: AdjacencyOrigin,
        at: (u32, u32),
        sink: &mut dyn EventSink,
    ) {
        if a == b || a == 0 || b == 0 {
            return;
        }
        let (na, nb) = (NodeIndex::new(a as usize), NodeIndex::new(b as usize));
        if self.graph.contains_edge(na, nb) {
            return;
        }
        self.graph.add_edge(na, nb, origin);
        sink.record(PipelineEvent::EdgeAdded {
            a,
            b,
            origin,
            x: at.0,
            y: at.1,
        });
    }

    /// Direct-contact helper for the builder's first pass.
    fn direct(&mut self, current: u32, neighbor: u32, at: (u32, u32), sink: &mut dyn EventSink) {
        if neighbor > 0 && neighbor != current {
            self.add_edge_once(current, neighbor, AdjacencyOrigin::DirectContact, at, sink);
        }
    }
}

/// Build the adjacency graph for a labeled grid.
///
/// Scans the grid twice: once over region pixels for direct contact, once
/// over interior border pixels for through-border contact. Both passes
/// walk in raster order, so edge insertion order (and the event stream)
/// is deterministic for a given labeling.
#[must_use]
pub fn build(labels: &RegionMap, region_count: u32, sink: &mut dyn EventSink) -> RegionGraph {
    let Dimensions { width, height } = labels.dimensions();
    let mut graph = UnGraph::with_capacity(region_count as usize + 1, 0);
    // Vertex 0 is reserved; isolated regions stay as degree-0 vertices.
    for id in 0..=region_count {
        graph.add_node(id);
    }
    let mut result = RegionGraph {
        graph,
        region_count,
    };

    // Pass 1: direct contact between region pixels.
    for y in 0..height {
        for x in 0..width {
            let current = labels.get(x, y);
            if current == 0 {
                continue;
            }
            if y > 0 {
                result.direct(current, labels.get(x, y - 1), (x, y), sink);
            }
            if y + 1 < height {
                result.direct(current, labels.get(x, y + 1), (x, y), sink);
            }
            if x > 0 {
                result.direct(current, labels.get(x - 1, y), (x, y), sink);
            }
            if x + 1 < width {
                result.direct(current, labels.get(x + 1, y), (x, y), sink);
            }
        }
    }

    // Pass 2: regions meeting across a single border pixel. Outer-edge
    // border pixels have no opposite side and are skipped.
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if labels.get(x, y) != 0 {
                continue;
            }
            let mut found = [0u32; 4];
            let mut count = 0;
            for neighbor in [
                labels.get(x, y - 1),
                labels.get(x, y + 1),
                labels.get(x - 1, y),
                labels.get(x + 1, y),
            ] {
                if neighbor > 0 && !found[..count].contains(&neighbor) {
                    found[count] = neighbor;
                    count += 1;
                }
            }
            for i in 0..count {
                for j in (i + 1)..count {
                    result.add_edge_once(
                        found[i],
                        found[j],
                        AdjacencyOrigin::ThroughBorder,
                        (x, y),
                        sink,
                    );
                }
            }
        }
    }

    result
}
