//! [`SceneGraph`] – the interface between the segmenter and object storage.
//!
//! The graph itself (node layers, inter-layer edges, serialization) belongs
//! to the wider mapping system; the segmentation core only needs the small
//! write/query surface defined here.  Mutating operations return
//! [`SemMapError`] so implementations can report identity violations; the
//! segmenter treats any such error as a data-integrity warning and skips the
//! offending item.

use semmap_types::{BoundingVolume, Color, NodeId, Point3, SemMapError, SemanticLabel};
use serde::{Deserialize, Serialize};

/// Attributes stored on one tracked-object node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    /// Semantic class of the object.
    pub label: SemanticLabel,
    /// Human-readable name, derived from the node id (e.g. `"O(12)"`).
    pub name: String,
    /// Centroid of the detection that produced the current bounding volume.
    pub position: Point3,
    /// Fitted bounding volume; only ever replaced by a strictly larger fit.
    pub bounding: BoundingVolume,
    /// Representative vertex color.
    pub color: Color,
}

/// Write/query capability over the scene graph's object layer.
///
/// Implementations must keep mesh-association edges and parent assignments
/// for a node alive exactly as long as the node itself.
pub trait SceneGraph {
    /// True when a node with this id exists.
    fn has_node(&self, id: NodeId) -> bool;

    /// Read access to a node's attributes.
    fn object(&self, id: NodeId) -> Option<&ObjectAttributes>;

    /// Write access to a node's attributes.
    fn object_mut(&mut self, id: NodeId) -> Option<&mut ObjectAttributes>;

    /// Insert a new object node.
    ///
    /// # Errors
    ///
    /// [`SemMapError::DuplicateNode`] when the id is already present.
    fn insert_object(&mut self, id: NodeId, attrs: ObjectAttributes)
    -> Result<(), SemMapError>;

    /// Remove a node together with its mesh edges and parent assignment.
    ///
    /// # Errors
    ///
    /// [`SemMapError::MissingNode`] when the id is not present.
    fn remove_node(&mut self, id: NodeId) -> Result<(), SemMapError>;

    /// Associate a mesh vertex with a node.  Repeated insertion of the same
    /// edge is a no-op; edges accumulate and are never pruned.
    ///
    /// # Errors
    ///
    /// [`SemMapError::MissingNode`] when the id is not present.
    fn insert_mesh_edge(&mut self, id: NodeId, vertex_index: usize)
    -> Result<(), SemMapError>;

    /// The node's assigned parent (its "place"), if any.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Assign the node's parent.
    ///
    /// # Errors
    ///
    /// [`SemMapError::MissingNode`] when the id is not present.
    fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<(), SemMapError>;
}
