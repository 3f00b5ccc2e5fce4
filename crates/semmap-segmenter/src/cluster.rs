//! Euclidean connected-component clustering.
//!
//! Groups a subset of mesh vertices into clusters: two vertices are connected
//! when their positions lie within a tolerance distance of each other, and a
//! cluster is one connected component of that relation, kept only when its
//! size falls inside the configured bounds.  Connectivity (and therefore the
//! partition) is exact; the enumeration order of clusters, and of points
//! within a cluster, is unspecified.

use semmap_types::{Aabb, MeshVertex, Point3};
use tracing::warn;

use crate::spatial::Octree;

/// Maximum entries per octree leaf before it subdivides.
const LEAF_CAPACITY: usize = 16;

// ────────────────────────────────────────────────────────────────────────────
// Centroid
// ────────────────────────────────────────────────────────────────────────────

/// Incremental centroid accumulator.
///
/// Sums in f64 so the running mean stays accurate for large clusters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Centroid {
    sum: [f64; 3],
    count: usize,
}

impl Centroid {
    /// Accumulate one point.
    pub fn add(&mut self, p: Point3) {
        self.sum[0] += f64::from(p.x);
        self.sum[1] += f64::from(p.y);
        self.sum[2] += f64::from(p.z);
        self.count += 1;
    }

    /// Number of accumulated points.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The mean position, or the origin when nothing was accumulated.
    pub fn get(&self) -> Point3 {
        if self.count == 0 {
            return Point3::zero();
        }
        let n = self.count as f64;
        Point3::new(
            (self.sum[0] / n) as f32,
            (self.sum[1] / n) as f32,
            (self.sum[2] / n) as f32,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cluster
// ────────────────────────────────────────────────────────────────────────────

/// One connected group of same-label vertices, consumed within the tick that
/// produced it.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Vertex buffer indices of the members.
    pub indices: Vec<usize>,
    /// Copies of the member vertices, index-aligned with `indices`.
    pub points: Vec<MeshVertex>,
    /// Accumulated centroid of the member positions.
    pub centroid: Centroid,
}

impl Cluster {
    /// The cluster's mean position.
    pub fn centroid(&self) -> Point3 {
        self.centroid.get()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ClusteringEngine
// ────────────────────────────────────────────────────────────────────────────

/// Capability interface for the point-grouping step, injected into the
/// segmenter so the core stays testable without a real spatial backend.
pub trait ClusteringEngine {
    /// Partition `indices` (into `vertices`) into clusters.
    fn extract(&self, vertices: &[MeshVertex], indices: &[usize]) -> Vec<Cluster>;
}

/// Radius-connectivity clustering over an [`Octree`] index.
///
/// # Example
///
/// ```rust
/// use semmap_segmenter::cluster::{ClusteringEngine, EuclideanClusterer};
/// use semmap_types::{Color, MeshVertex, Point3};
///
/// let vertices: Vec<MeshVertex> = (0..5)
///     .map(|i| MeshVertex {
///         position: Point3::new(i as f32 * 0.1, 0.0, 0.0),
///         color: Color::new(0, 0, 0),
///     })
///     .collect();
///
/// let clusterer = EuclideanClusterer::new(0.15, 2, 100);
/// let clusters = clusterer.extract(&vertices, &[0, 1, 2, 3, 4]);
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].indices.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct EuclideanClusterer {
    /// Maximum spacing between two directly connected points (metres).
    tolerance: f32,
    /// Components smaller than this are discarded.
    min_size: usize,
    /// Components larger than this are discarded.
    max_size: usize,
}

impl EuclideanClusterer {
    /// Create a clusterer with the given tolerance and size bounds.
    pub fn new(tolerance: f32, min_size: usize, max_size: usize) -> Self {
        Self {
            tolerance,
            min_size,
            max_size,
        }
    }
}

impl ClusteringEngine for EuclideanClusterer {
    fn extract(&self, vertices: &[MeshVertex], indices: &[usize]) -> Vec<Cluster> {
        // Working set: (vertex index, position), dropping anything the buffer
        // cannot resolve.
        let mut members: Vec<(usize, Point3)> = Vec::with_capacity(indices.len());
        for &idx in indices {
            match vertices.get(idx) {
                Some(v) => members.push((idx, v.position)),
                None => {
                    warn!(index = idx, len = vertices.len(), "cluster index out of range");
                }
            }
        }

        let Some(bounds) =
            Aabb::from_points(members.iter().map(|(_, p)| *p))
        else {
            return Vec::new();
        };

        let mut tree = Octree::new(bounds, LEAF_CAPACITY);
        for (slot, &(_, position)) in members.iter().enumerate() {
            tree.insert(slot, position);
        }

        let mut visited = vec![false; members.len()];
        let mut clusters = Vec::new();
        let mut neighbours = Vec::new();

        for seed in 0..members.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;

            // Flood the connected component around the seed.
            let mut component = vec![seed];
            let mut cursor = 0;
            while cursor < component.len() {
                let (_, position) = members[component[cursor]];
                cursor += 1;

                neighbours.clear();
                tree.within_radius(position, self.tolerance, &mut neighbours);
                for &slot in &neighbours {
                    if !visited[slot] {
                        visited[slot] = true;
                        component.push(slot);
                    }
                }
            }

            if component.len() < self.min_size || component.len() > self.max_size {
                continue;
            }

            let mut cluster = Cluster {
                indices: Vec::with_capacity(component.len()),
                points: Vec::with_capacity(component.len()),
                centroid: Centroid::default(),
            };
            for slot in component {
                let (idx, position) = members[slot];
                cluster.indices.push(idx);
                cluster.points.push(vertices[idx]);
                cluster.centroid.add(position);
            }
            clusters.push(cluster);
        }

        clusters
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
