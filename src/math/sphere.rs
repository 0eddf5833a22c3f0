//! World-space bounding sphere

use crate::core::types::{DVec3, DMat4};
use super::frustum::Frustum;

/// Largest scale factor among the three axes of a transform.
///
/// Used to scale radii under non-uniform transforms: the sphere is grown to
/// the largest axis and never shrinks below its true extent on any axis.
pub fn max_axis_scale(transform: &DMat4) -> f64 {
    let sx = transform.x_axis.truncate().length();
    let sy = transform.y_axis.truncate().length();
    let sz = transform.z_axis.truncate().length();
    sx.max(sy).max(sz)
}

/// Bounding sphere already expressed in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Place a local sphere into world space
    pub fn from_local(center: DVec3, radius: f64, transform: &DMat4) -> Self {
        Self {
            center: transform.transform_point3(center),
            radius: radius * max_axis_scale(transform),
        }
    }

    /// Distance from the sphere surface to `point`, 0 when inside
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        (point.distance(self.center) - self.radius).max(0.0)
    }

    pub fn contains_point(&self, point: DVec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_sphere(self.center, self.radius)
    }
}
