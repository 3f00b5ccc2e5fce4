//! `semmap-graph` – scene-graph boundary.
//!
//! The segmentation core does not own object storage: tracked objects live as
//! nodes in a scene graph maintained by the wider mapping system.  This crate
//! defines that boundary.
//!
//! # Modules
//!
//! - [`store`] – [`SceneGraph`][store::SceneGraph]: the capability interface
//!   the segmenter writes through (node insertion/removal, mesh-association
//!   edges, parent queries), plus [`ObjectAttributes`][store::ObjectAttributes].
//! - [`memory`] – [`MemoryGraph`][memory::MemoryGraph]: an in-process
//!   implementation of the interface for tests and headless pipelines.

pub mod memory;
pub mod store;

pub use memory::MemoryGraph;
pub use store::{ObjectAttributes, SceneGraph};
