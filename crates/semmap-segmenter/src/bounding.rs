//! Bounding-volume fitting.
//!
//! Fits the configured shape family ([`BoundingBoxType`]) around a
//! detection's points.  The lifecycle manager treats the fitter as an opaque
//! capability: it only ever compares volumes and tests centroid containment.

use semmap_types::{Aabb, BoundingBoxType, BoundingVolume, MeshVertex};

/// Capability interface for fitting a bounding volume to a point set.
pub trait BoundingBoxFitter {
    /// Fit a volume around `points`.  Returns `None` for an empty set.
    fn fit(&self, points: &[MeshVertex]) -> Option<BoundingVolume>;
}

/// Fits whichever shape family the segmenter was configured with.
#[derive(Debug, Clone, Copy)]
pub struct ShapeFitter {
    shape: BoundingBoxType,
}

impl ShapeFitter {
    /// Create a fitter for the given shape family.
    pub fn new(shape: BoundingBoxType) -> Self {
        Self { shape }
    }
}

impl BoundingBoxFitter for ShapeFitter {
    fn fit(&self, points: &[MeshVertex]) -> Option<BoundingVolume> {
        let aabb = Aabb::from_points(points.iter().map(|v| v.position))?;
        match self.shape {
            BoundingBoxType::AxisAligned => Some(BoundingVolume::Box(aabb)),
            BoundingBoxType::Sphere => {
                // Centre on the tight box, radius to the farthest point.
                let center = aabb.centre();
                let radius = points
                    .iter()
                    .map(|v| v.position.distance(center))
                    .fold(0.0_f32, f32::max);
                Some(BoundingVolume::Sphere { center, radius })
            }
        }
    }
}
