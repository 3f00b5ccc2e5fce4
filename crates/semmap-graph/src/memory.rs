//! In-process scene graph for tests and headless pipelines.
//!
//! [`MemoryGraph`] implements [`SceneGraph`] with plain ordered maps so the
//! full segmentation stack can run without the real mapping backend.  It also
//! exposes inspection helpers (`node_ids`, `mesh_edges`) that the trait
//! deliberately leaves out.
//!
//! # Example
//!
//! ```rust
//! use semmap_graph::{MemoryGraph, ObjectAttributes, SceneGraph};
//! use semmap_types::{Aabb, BoundingVolume, Color, NodeId, Point3, SemanticLabel};
//!
//! let mut graph = MemoryGraph::new();
//! let id = NodeId::new('O', 0);
//! graph
//!     .insert_object(id, ObjectAttributes {
//!         label: SemanticLabel(1),
//!         name: id.to_string(),
//!         position: Point3::zero(),
//!         bounding: BoundingVolume::Box(Aabb::new(Point3::zero(), Point3::new(1.0, 1.0, 1.0))),
//!         color: Color::new(255, 0, 0),
//!     })
//!     .unwrap();
//!
//! assert!(graph.has_node(id));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use semmap_types::{NodeId, SemMapError};
use tracing::debug;

use crate::store::{ObjectAttributes, SceneGraph};

/// In-memory [`SceneGraph`] implementation.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: BTreeMap<NodeId, ObjectAttributes>,
    mesh_edges: BTreeMap<NodeId, BTreeSet<usize>>,
    parents: BTreeMap<NodeId, NodeId>,
}

impl MemoryGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of object nodes currently stored.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of all stored nodes, in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Mesh vertex indices associated with a node.  Empty for unknown nodes.
    pub fn mesh_edges(&self, id: NodeId) -> BTreeSet<usize> {
        self.mesh_edges.get(&id).cloned().unwrap_or_default()
    }
}

impl SceneGraph for MemoryGraph {
    fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn object(&self, id: NodeId) -> Option<&ObjectAttributes> {
        self.nodes.get(&id)
    }

    fn object_mut(&mut self, id: NodeId) -> Option<&mut ObjectAttributes> {
        self.nodes.get_mut(&id)
    }

    fn insert_object(
        &mut self,
        id: NodeId,
        attrs: ObjectAttributes,
    ) -> Result<(), SemMapError> {
        if self.nodes.contains_key(&id) {
            return Err(SemMapError::DuplicateNode(id));
        }
        debug!(node = %id, label = %attrs.label, "inserting object node");
        self.nodes.insert(id, attrs);
        Ok(())
    }

    fn remove_node(&mut self, id: NodeId) -> Result<(), SemMapError> {
        if self.nodes.remove(&id).is_none() {
            return Err(SemMapError::MissingNode(id));
        }
        self.mesh_edges.remove(&id);
        self.parents.remove(&id);
        Ok(())
    }

    fn insert_mesh_edge(
        &mut self,
        id: NodeId,
        vertex_index: usize,
    ) -> Result<(), SemMapError> {
        if !self.nodes.contains_key(&id) {
            return Err(SemMapError::MissingNode(id));
        }
        self.mesh_edges.entry(id).or_default().insert(vertex_index);
        Ok(())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<(), SemMapError> {
        if !self.nodes.contains_key(&id) {
            return Err(SemMapError::MissingNode(id));
        }
        self.parents.insert(id, parent);
        Ok(())
    }
}
