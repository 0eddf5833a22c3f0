//! Composite tile bounding volume: optional sphere plus optional OBB
//!
//! Both sub-volumes are stored in world space and each one fully contains the
//! tile on its own. Queries combine them conservatively:
//! - distance is the *maximum* of the present sub-volume distances
//! - frustum intersection requires *every* present sub-volume to pass

use crate::core::types::{DVec3, DMat4};
use super::frustum::Frustum;
use super::obb::Obb;
use super::sphere::BoundingSphere;

/// Build an orthonormal, right-handed frame from three (possibly degenerate)
/// half-axis vectors.
///
/// A single zero-length axis is rebuilt from the cross product of the other
/// two. When two or three axes collapse, the frame is completed around the
/// remaining axis, or falls back to the identity basis.
pub fn orthonormal_frame(axes: [DVec3; 3]) -> [DVec3; 3] {
    let mut frame = axes.map(|a| a.normalize_or_zero());
    let degenerate = frame.iter().filter(|a| **a == DVec3::ZERO).count();

    if degenerate == 0 {
        return frame;
    }

    if degenerate == 1 {
        let i = frame.iter().position(|a| *a == DVec3::ZERO).unwrap_or(0);
        let rebuilt = frame[(i + 1) % 3].cross(frame[(i + 2) % 3]).normalize_or_zero();
        if rebuilt != DVec3::ZERO {
            frame[i] = rebuilt;
            return frame;
        }
    }

    // Complete the basis around the first usable axis
    match (0..3).find(|&i| frame[i] != DVec3::ZERO) {
        Some(i) => {
            let (a, _) = frame[i].any_orthonormal_pair();
            frame[(i + 1) % 3] = a;
            frame[(i + 2) % 3] = frame[i].cross(a);
            frame
        }
        None => [DVec3::X, DVec3::Y, DVec3::Z],
    }
}

/// Tile bounding volume in world space
#[derive(Clone, Debug, Default)]
pub struct BoundingVolume {
    sphere: Option<BoundingSphere>,
    obb: Option<Obb>,
}

impl BoundingVolume {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sphere from local center/radius placed by `transform`
    pub fn set_sphere_data(&mut self, x: f64, y: f64, z: f64, radius: f64, transform: &DMat4) {
        self.sphere = Some(BoundingSphere::from_local(DVec3::new(x, y, z), radius, transform));
    }

    /// Set the OBB from a 12-number box: center followed by the X, Y and Z
    /// half-axis vectors, placed by `transform`.
    pub fn set_obb_data(&mut self, data: &[f64; 12], transform: &DMat4) {
        let center = DVec3::new(data[0], data[1], data[2]);
        let axes = [
            DVec3::new(data[3], data[4], data[5]),
            DVec3::new(data[6], data[7], data[8]),
            DVec3::new(data[9], data[10], data[11]),
        ];

        let half = DVec3::new(axes[0].length(), axes[1].length(), axes[2].length());
        let [x, y, z] = orthonormal_frame(axes);

        let frame = DMat4::from_cols(
            x.extend(0.0),
            y.extend(0.0),
            z.extend(0.0),
            center.extend(1.0),
        );

        self.obb = Some(Obb::new(-half, half, *transform * frame));
    }

    pub fn sphere(&self) -> Option<&BoundingSphere> {
        self.sphere.as_ref()
    }

    pub fn obb(&self) -> Option<&Obb> {
        self.obb.as_ref()
    }

    /// True when neither a sphere nor a box is present
    pub fn is_empty(&self) -> bool {
        self.sphere.is_none() && self.obb.is_none()
    }

    /// Largest distance from `point` to any present sub-volume.
    ///
    /// Returns `f64::NEG_INFINITY` for an empty volume; check [`is_empty`](Self::is_empty).
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        let sphere_distance = self
            .sphere
            .map_or(f64::NEG_INFINITY, |s| s.distance_to_point(point));
        let obb_distance = self
            .obb
            .as_ref()
            .map_or(f64::NEG_INFINITY, |o| o.distance_to_point(point));

        sphere_distance.max(obb_distance)
    }

    /// True when every present sub-volume passes its frustum test.
    /// An empty volume never intersects.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        if let Some(sphere) = &self.sphere {
            if !sphere.intersects_frustum(frustum) {
                return false;
            }
        }

        if let Some(obb) = &self.obb {
            if !obb.intersects_frustum(frustum) {
                return false;
            }
        }

        !self.is_empty()
    }
}
