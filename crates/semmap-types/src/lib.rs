use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in 3-D space (metres, map frame).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    /// Create a new point.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// An axis-aligned bounding box, defined by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Create a bounding box from its two opposite corners.
    ///
    /// The constructor normalises the corners so that `min ≤ max` per axis.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Tight bounds of a point set.  Returns `None` for an empty set.
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some(Self { min, max })
    }

    /// Return the centre point of the box.
    pub fn centre(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// True when the point lies inside or on the boundary of the box.
    pub fn contains_point(&self, p: Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Volume of the box (m³).
    pub fn volume(&self) -> f32 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y) * (self.max.z - self.min.z)
    }
}

/// The bounding-volume shape family used when fitting detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundingBoxType {
    /// Tight axis-aligned box around the detection's points.
    #[default]
    AxisAligned,
    /// Bounding sphere around the detection's points.
    Sphere,
}

/// A fitted bounding volume for one tracked object.
///
/// The shape family is a configuration choice ([`BoundingBoxType`]); consumers
/// only rely on [`contains`][BoundingVolume::contains] and
/// [`volume`][BoundingVolume::volume].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingVolume {
    Box(Aabb),
    Sphere { center: Point3, radius: f32 },
}

impl BoundingVolume {
    /// True when `p` lies inside or on the boundary of the volume.
    pub fn contains(&self, p: Point3) -> bool {
        match self {
            Self::Box(aabb) => aabb.contains_point(p),
            Self::Sphere { center, radius } => {
                p.distance_squared(*center) <= radius * radius
            }
        }
    }

    /// Enclosed volume (m³).
    pub fn volume(&self) -> f32 {
        match self {
            Self::Box(aabb) => aabb.volume(),
            Self::Sphere { radius, .. } => {
                4.0 / 3.0 * std::f32::consts::PI * radius * radius * radius
            }
        }
    }
}

/// An RGB vertex color, as written by the reconstruction frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One vertex of the reconstructed surface mesh.
///
/// The mesh vertex buffer is owned by the reconstruction frontend and only
/// grows between ticks; vertices are immutable once written and are referred
/// to everywhere else by their buffer index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: Point3,
    pub color: Color,
}

/// A semantic class label, as produced by the color classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SemanticLabel(pub u8);

impl std::fmt::Display for SemanticLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a scene-graph node.
///
/// Packs a one-character category prefix into the top byte and a monotonic
/// index into the lower 56 bits, so ids allocated under the same prefix sort
/// in creation order and are never reused.
///
/// # Example
///
/// ```rust
/// use semmap_types::NodeId;
///
/// let id = NodeId::new('O', 42);
/// assert_eq!(id.prefix(), 'O');
/// assert_eq!(id.index(), 42);
/// assert_eq!(id.to_string(), "O(42)");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    const INDEX_BITS: u32 = 56;
    const INDEX_MASK: u64 = (1 << Self::INDEX_BITS) - 1;

    /// Create an id from a category prefix and a per-category index.
    ///
    /// Indices wider than 56 bits are truncated; the monotonic counters that
    /// feed this never get anywhere near that range.
    pub fn new(prefix: char, index: u64) -> Self {
        Self(((prefix as u64) << Self::INDEX_BITS) | (index & Self::INDEX_MASK))
    }

    /// The category prefix character.
    pub fn prefix(self) -> char {
        char::from_u32((self.0 >> Self::INDEX_BITS) as u32).unwrap_or('?')
    }

    /// The per-category index.
    pub fn index(self) -> u64 {
        self.0 & Self::INDEX_MASK
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.prefix(), self.index())
    }
}

/// Errors raised at the scene-graph boundary.
///
/// The segmentation core itself never propagates these upward: a failed graph
/// operation is logged and the offending item skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemMapError {
    #[error("node {0} already exists in the scene graph")]
    DuplicateNode(NodeId),

    #[error("node {0} does not exist in the scene graph")]
    MissingNode(NodeId),
}
