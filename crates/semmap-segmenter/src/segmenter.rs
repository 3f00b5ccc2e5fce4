//! [`MeshSegmenter`] – per-tick object detection and lifecycle.
//!
//! Once per processing tick the frontend hands over the current mesh vertex
//! buffer (borrowed read-only, never copied) and the frontier of newly
//! relevant vertex indices.  [`detect`][MeshSegmenter::detect] restricts the
//! frontier to the active horizon around the robot, partitions it by semantic
//! label, and clusters each label's vertices.
//! [`update_graph`][MeshSegmenter::update_graph] then merges the clusters
//! into the scene graph: archive stale objects first, match each cluster
//! against the active objects of its label, grow or create nodes, and
//! collapse duplicate detections per label.
//!
//! The caller owns tick ordering and must supply monotonically non-decreasing
//! timestamps; out-of-order timestamps corrupt the archival horizon and are
//! not detected here.
//!
//! # Example
//!
//! ```rust
//! use semmap_graph::MemoryGraph;
//! use semmap_segmenter::labels::ColorLabelMap;
//! use semmap_segmenter::{MeshSegmenter, SegmenterConfig};
//! use semmap_types::{Color, MeshVertex, Point3, SemanticLabel};
//!
//! let config = SegmenterConfig {
//!     labels: [SemanticLabel(1)].into(),
//!     min_cluster_size: 2,
//!     ..SegmenterConfig::default()
//! };
//! let mut segmenter = MeshSegmenter::new(config);
//!
//! let red = Color::new(255, 0, 0);
//! let vertices: Vec<MeshVertex> = (0..3)
//!     .map(|i| MeshVertex {
//!         position: Point3::new(i as f32 * 0.1, 0.0, 0.0),
//!         color: red,
//!     })
//!     .collect();
//! let classifier = ColorLabelMap::from_entries([(red, SemanticLabel(1))]);
//!
//! let clusters = segmenter.detect(&vertices, &classifier, &[0, 1, 2], None);
//!
//! let mut graph = MemoryGraph::new();
//! let archived = segmenter.update_graph(&mut graph, &clusters, 0);
//! assert!(archived.is_empty());
//! assert_eq!(graph.node_count(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use semmap_graph::{ObjectAttributes, SceneGraph};
use semmap_types::{BoundingBoxType, MeshVertex, NodeId, Point3, SemanticLabel};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::bounding::{BoundingBoxFitter, ShapeFitter};
use crate::cluster::{Cluster, ClusteringEngine, EuclideanClusterer};
use crate::labels::LabelClassifier;

/// Per-label partition of vertex indices.
pub type LabelIndices = BTreeMap<SemanticLabel, Vec<usize>>;

/// Per-label clustering result of one tick.
pub type LabelClusters = BTreeMap<SemanticLabel, Vec<Cluster>>;

/// Observer hook invoked by [`MeshSegmenter::detect`] with the vertex buffer,
/// the horizon-filtered active indices, and the label partition.
pub type DetectionCallback = Box<dyn Fn(&[MeshVertex], &[usize], &LabelIndices)>;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`MeshSegmenter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Semantic labels to track; clusters of any other label are discarded.
    pub labels: BTreeSet<SemanticLabel>,
    /// Maximum spacing between two connected points in one cluster (metres).
    pub cluster_tolerance: f32,
    /// Clusters with fewer vertices are discarded.
    pub min_cluster_size: usize,
    /// Clusters with more vertices are discarded.
    pub max_cluster_size: usize,
    /// Frontier vertices farther than this from the reference position are
    /// ignored for the tick (metres).
    pub active_index_horizon_m: f32,
    /// Objects unobserved for longer than this are archived (seconds).
    pub active_horizon_s: f64,
    /// Bounding-volume family fitted to detections.
    pub bounding_box_type: BoundingBoxType,
    /// Category prefix for allocated node ids.
    pub prefix: char,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            labels: BTreeSet::new(),
            cluster_tolerance: 0.25,
            min_cluster_size: 40,
            max_cluster_size: 100_000,
            active_index_horizon_m: 7.0,
            active_horizon_s: 10.0,
            bounding_box_type: BoundingBoxType::AxisAligned,
            prefix: 'O',
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MeshSegmenter
// ─────────────────────────────────────────────────────────────────────────────

/// Incremental mesh-to-object segmentation and tracking.
///
/// Owns the per-label active-object indices, observation timestamps, and the
/// pending placement-check set.  Single-threaded by design: one tick runs to
/// completion before the next starts, and nothing else mutates this state.
pub struct MeshSegmenter {
    config: SegmenterConfig,
    clusterer: Box<dyn ClusteringEngine>,
    fitter: Box<dyn BoundingBoxFitter>,
    /// Monotonic allocation counter; indices are never reused.
    next_index: u64,
    /// Per-label ids considered live.  `BTreeSet` over monotonic ids keeps
    /// match scans in creation order, stable within a tick.
    active_objects: BTreeMap<SemanticLabel, BTreeSet<NodeId>>,
    /// Last observation time per active id (nanoseconds).
    last_observed_ns: BTreeMap<NodeId, u64>,
    /// Objects whose geometry changed enough that a parent "place" should be
    /// (re)assigned downstream.
    objects_to_check_for_places: BTreeSet<NodeId>,
    callbacks: Vec<DetectionCallback>,
}

impl MeshSegmenter {
    /// Create a segmenter with the default clustering engine and bounding
    /// fitter wired from `config`.
    pub fn new(config: SegmenterConfig) -> Self {
        let clusterer = Box::new(EuclideanClusterer::new(
            config.cluster_tolerance,
            config.min_cluster_size,
            config.max_cluster_size,
        ));
        let fitter = Box::new(ShapeFitter::new(config.bounding_box_type));
        Self::with_engines(config, clusterer, fitter)
    }

    /// Create a segmenter with explicit engine implementations.
    pub fn with_engines(
        config: SegmenterConfig,
        clusterer: Box<dyn ClusteringEngine>,
        fitter: Box<dyn BoundingBoxFitter>,
    ) -> Self {
        debug!(labels = ?config.labels, "detecting objects for labels");
        let active_objects = config
            .labels
            .iter()
            .map(|&label| (label, BTreeSet::new()))
            .collect();
        Self {
            config,
            clusterer,
            fitter,
            next_index: 0,
            active_objects,
            last_observed_ns: BTreeMap::new(),
            objects_to_check_for_places: BTreeSet::new(),
            callbacks: Vec::new(),
        }
    }

    /// Register an observer invoked on every [`detect`][Self::detect] call.
    pub fn add_callback(&mut self, callback: DetectionCallback) {
        self.callbacks.push(callback);
    }

    /// Ids awaiting a downstream place assignment.
    pub fn objects_to_check_for_places(&self) -> &BTreeSet<NodeId> {
        &self.objects_to_check_for_places
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Detection
    // ─────────────────────────────────────────────────────────────────────────

    /// Cluster this tick's frontier by semantic label.
    ///
    /// Registered callbacks are invoked with the buffer, the filtered active
    /// indices, and the label partition on every call, whether or not any
    /// clusters were found.
    pub fn detect(
        &self,
        vertices: &[MeshVertex],
        classifier: &dyn LabelClassifier,
        frontier_indices: &[usize],
        position: Option<Point3>,
    ) -> LabelClusters {
        let active = self.active_indices(vertices, frontier_indices, position);

        let label_indices = if active.is_empty() {
            trace!("no active indices in mesh");
            LabelIndices::new()
        } else {
            self.label_indices(vertices, classifier, &active)
        };

        let mut label_clusters = LabelClusters::new();
        for &label in &self.config.labels {
            let Some(indices) = label_indices.get(&label) else {
                continue;
            };
            // Cheap pre-filter: fewer vertices than the minimum cluster size
            // cannot produce a cluster.
            if indices.len() < self.config.min_cluster_size {
                trace!(label = %label, count = indices.len(), "too few vertices to cluster");
                continue;
            }

            let clusters = self.clusterer.extract(vertices, indices);
            debug!(label = %label, clusters = clusters.len(), "found clusters");
            if !clusters.is_empty() {
                label_clusters.insert(label, clusters);
            }
        }

        for callback in &self.callbacks {
            callback(vertices, &active, &label_indices);
        }

        label_clusters
    }

    /// Restrict `indices` to vertices strictly within the configured horizon
    /// of `position`, preserving order.  Without a reference position the
    /// frontier is used as-is.
    fn active_indices(
        &self,
        vertices: &[MeshVertex],
        indices: &[usize],
        position: Option<Point3>,
    ) -> Vec<usize> {
        let active = match position {
            None => indices.to_vec(),
            Some(root) => {
                let mut active = Vec::with_capacity(indices.len());
                for &idx in indices {
                    let Some(vertex) = vertices.get(idx) else {
                        warn!(index = idx, len = vertices.len(), "frontier index out of range");
                        continue;
                    };
                    if vertex.position.distance(root) < self.config.active_index_horizon_m {
                        active.push(idx);
                    }
                }
                active
            }
        };
        debug!(frontier = indices.len(), used = active.len(), "active index horizon");
        active
    }

    /// Partition `indices` by semantic label, keeping only labels of interest.
    fn label_indices(
        &self,
        vertices: &[MeshVertex],
        classifier: &dyn LabelClassifier,
        indices: &[usize],
    ) -> LabelIndices {
        let mut label_indices = LabelIndices::new();
        let mut seen_labels = BTreeSet::new();
        let mut unlabeled = 0usize;

        for &idx in indices {
            let Some(vertex) = vertices.get(idx) else {
                warn!(index = idx, len = vertices.len(), "vertex index out of range");
                continue;
            };
            let Some(label) = classifier.label_for(vertex.color) else {
                unlabeled += 1;
                continue;
            };
            seen_labels.insert(label);
            if !self.config.labels.contains(&label) {
                continue;
            }
            label_indices.entry(label).or_default().push(idx);
        }

        trace!(seen = ?seen_labels, unlabeled, "seen labels");
        label_indices
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Graph update
    // ─────────────────────────────────────────────────────────────────────────

    /// Merge this tick's clusters into the scene graph.
    ///
    /// Archives stale objects first (against the previous tick's state), then
    /// per label in ascending order: match clusters against active objects,
    /// grow or create nodes, and collapse duplicate detections.  Returns the
    /// ids archived this tick.
    pub fn update_graph(
        &mut self,
        graph: &mut dyn SceneGraph,
        clusters: &LabelClusters,
        timestamp_ns: u64,
    ) -> BTreeSet<NodeId> {
        let archived = self.archive_old_objects(&*graph, timestamp_ns);

        for (&label, label_clusters) in clusters {
            if !self.config.labels.contains(&label) {
                warn!(label = %label, "clusters for unconfigured label");
                continue;
            }

            for cluster in label_clusters {
                match self.find_matching_object(&*graph, label, cluster) {
                    Some(id) => self.update_object_in_graph(graph, cluster, id, timestamp_ns),
                    None => self.add_object_to_graph(graph, cluster, label, timestamp_ns),
                }
            }

            self.resolve_duplicates(graph, label);
        }

        archived
    }

    /// Drop active ids that have left the graph or gone unobserved past the
    /// horizon.  Only the latter are reported as archived.
    pub fn archive_old_objects(
        &mut self,
        graph: &dyn SceneGraph,
        timestamp_ns: u64,
    ) -> BTreeSet<NodeId> {
        let horizon_ns = (self.config.active_horizon_s * 1e9) as u64;
        let mut archived = BTreeSet::new();
        let mut removals: Vec<(SemanticLabel, BTreeSet<NodeId>)> = Vec::new();

        for (&label, active) in &self.active_objects {
            let mut stale = BTreeSet::new();
            for &id in active {
                if !graph.has_node(id) {
                    stale.insert(id);
                }
                // Saturating: a timestamp ahead of the tick clock is a caller
                // violation and must not wrap into a huge elapsed time.
                match self.last_observed_ns.get(&id) {
                    Some(&last) if timestamp_ns.saturating_sub(last) > horizon_ns => {
                        stale.insert(id);
                        archived.insert(id);
                    }
                    Some(_) => {}
                    None => {
                        warn!(node = %id, "active object has no observation timestamp");
                        stale.insert(id);
                    }
                }
            }
            if !stale.is_empty() {
                removals.push((label, stale));
            }
        }

        for (label, stale) in removals {
            if let Some(active) = self.active_objects.get_mut(&label) {
                for id in stale {
                    trace!(node = %id, "retiring object from active tracking");
                    active.remove(&id);
                    self.last_observed_ns.remove(&id);
                }
            }
        }

        archived
    }

    /// First active object of `label` whose bounding volume contains the
    /// cluster's centroid.
    fn find_matching_object(
        &self,
        graph: &dyn SceneGraph,
        label: SemanticLabel,
        cluster: &Cluster,
    ) -> Option<NodeId> {
        let centroid = cluster.centroid();
        for &id in self.active_objects.get(&label)? {
            let Some(attrs) = graph.object(id) else {
                warn!(node = %id, "active object missing from graph");
                continue;
            };
            if attrs.bounding.contains(centroid) {
                return Some(id);
            }
        }
        None
    }

    /// Fold a matched cluster into an existing object.
    fn update_object_in_graph(
        &mut self,
        graph: &mut dyn SceneGraph,
        cluster: &Cluster,
        id: NodeId,
        timestamp_ns: u64,
    ) {
        self.last_observed_ns.insert(id, timestamp_ns);

        // Mesh association is cumulative, growth or not.
        for &idx in &cluster.indices {
            if let Err(error) = graph.insert_mesh_edge(id, idx) {
                warn!(node = %id, %error, "failed to attach mesh edge");
                break;
            }
        }

        let Some(new_volume) = self.fitter.fit(&cluster.points) else {
            warn!(node = %id, "bounding fit failed for matched cluster");
            return;
        };
        let Some(attrs) = graph.object_mut(id) else {
            warn!(node = %id, "active object missing from graph");
            return;
        };

        // Prefer the largest detection; a smaller fit is partial observation.
        if new_volume.volume() <= attrs.bounding.volume() {
            return;
        }

        attrs.position = cluster.centroid();
        attrs.bounding = new_volume;
        self.objects_to_check_for_places.insert(id);
    }

    /// Create a new tracked object from an unmatched cluster.
    fn add_object_to_graph(
        &mut self,
        graph: &mut dyn SceneGraph,
        cluster: &Cluster,
        label: SemanticLabel,
        timestamp_ns: u64,
    ) {
        if cluster.points.is_empty() {
            warn!(label = %label, timestamp_ns, "encountered empty cluster");
            return;
        }
        let Some(bounding) = self.fitter.fit(&cluster.points) else {
            warn!(label = %label, "bounding fit failed for new cluster");
            return;
        };

        let id = NodeId::new(self.config.prefix, self.next_index);
        let attrs = ObjectAttributes {
            label,
            name: id.to_string(),
            position: cluster.centroid(),
            bounding,
            color: cluster.points[0].color,
        };

        if let Err(error) = graph.insert_object(id, attrs) {
            warn!(node = %id, %error, "failed to insert object node");
            return;
        }
        self.next_index += 1;

        self.active_objects.entry(label).or_default().insert(id);
        self.last_observed_ns.insert(id, timestamp_ns);
        self.objects_to_check_for_places.insert(id);

        for &idx in &cluster.indices {
            if let Err(error) = graph.insert_mesh_edge(id, idx) {
                warn!(node = %id, %error, "failed to attach mesh edge");
                break;
            }
        }

        debug!(node = %id, label = %label, size = cluster.indices.len(), "created object");
    }

    /// Collapse pairs of active objects of `label` that contain each other's
    /// centroid: two such objects are one physical object observed twice.
    ///
    /// Scans a snapshot of the active set so removals cannot destabilize the
    /// pairwise iteration.
    fn resolve_duplicates(&mut self, graph: &mut dyn SceneGraph, label: SemanticLabel) {
        let snapshot: Vec<NodeId> = match self.active_objects.get(&label) {
            Some(active) => active.iter().copied().collect(),
            None => return,
        };
        let mut removed: BTreeSet<NodeId> = BTreeSet::new();

        for i in 0..snapshot.len() {
            let a = snapshot[i];
            if removed.contains(&a) {
                continue;
            }
            let Some(attrs) = graph.object(a) else {
                continue;
            };
            let (a_position, a_bounding) = (attrs.position, attrs.bounding);

            for &b in &snapshot[i + 1..] {
                if removed.contains(&b) {
                    continue;
                }
                let Some(attrs) = graph.object(b) else {
                    continue;
                };
                let (b_position, b_bounding) = (attrs.position, attrs.bounding);

                if !a_bounding.contains(b_position) && !b_bounding.contains(a_position) {
                    continue;
                }

                // Keep the larger detection; on a tie the earlier id survives.
                let loser = if b_bounding.volume() > a_bounding.volume() { a } else { b };
                let kept = if loser == a { b } else { a };
                debug!(keep = %kept, drop = %loser, "merging duplicate objects");
                self.remove_object(graph, label, loser);
                removed.insert(loser);
                if loser == a {
                    break;
                }
            }
        }
    }

    /// Drop an object from the graph and from all tracking state.
    fn remove_object(&mut self, graph: &mut dyn SceneGraph, label: SemanticLabel, id: NodeId) {
        if let Err(error) = graph.remove_node(id) {
            warn!(node = %id, %error, "failed to remove object node");
        }
        if let Some(active) = self.active_objects.get_mut(&label) {
            active.remove(&id);
        }
        self.last_observed_ns.remove(&id);
        self.objects_to_check_for_places.remove(&id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Placement maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop pending placement checks that have been resolved: the node gained
    /// a parent, or it no longer exists (which only happens through removal
    /// paths outside this core, hence the warning).
    pub fn prune_objects_to_check_for_places(&mut self, graph: &dyn SceneGraph) {
        let mut resolved = Vec::new();
        for &id in &self.objects_to_check_for_places {
            if !graph.has_node(id) {
                warn!(node = %id, "pending placement check for missing node");
                resolved.push(id);
                continue;
            }
            if graph.parent(id).is_some() {
                resolved.push(id);
            }
        }
        for id in resolved {
            self.objects_to_check_for_places.remove(&id);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
