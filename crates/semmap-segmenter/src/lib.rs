//! `semmap-segmenter` – incremental semantic mesh segmentation.
//!
//! Converts the growing, label-colored surface mesh produced by the
//! reconstruction frontend into persistent tracked objects in the scene
//! graph, one tick at a time: cluster the frontier vertices by semantic
//! label, match clusters against already-tracked objects, grow or create
//! nodes, collapse duplicates, and retire objects that have gone unobserved.
//!
//! # Modules
//!
//! - [`spatial`] – [`Octree`][spatial::Octree]: spatial index over indexed
//!   points, answering the radius queries the clusterer is built on.
//! - [`cluster`] – [`EuclideanClusterer`][cluster::EuclideanClusterer]:
//!   connected-component clustering under a distance tolerance with size
//!   bounds.
//! - [`labels`] – [`LabelClassifier`][labels::LabelClassifier]: vertex color
//!   → semantic label capability.
//! - [`bounding`] – [`ShapeFitter`][bounding::ShapeFitter]: fits the
//!   configured bounding-volume family to a detection's points.
//! - [`segmenter`] – [`MeshSegmenter`][segmenter::MeshSegmenter]: the
//!   per-tick detect / graph-update entry points and all object lifecycle
//!   state.

pub mod bounding;
pub mod cluster;
pub mod labels;
pub mod segmenter;
pub mod spatial;

pub use segmenter::{MeshSegmenter, SegmenterConfig};
