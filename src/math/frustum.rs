//! View frustum for culling

use crate::core::types::{DVec3, DVec4, DMat4};

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: DVec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.distance
    }
}

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
///
/// Plane normals point inward: a point is inside when it is in front of
/// every plane.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb/Hartmann extraction for glam projections, which map depth to [0, 1].
    /// Works for both perspective and orthographic projections.
    pub fn from_view_projection(vp: &DMat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        // Near: row2 (depth 0 at the near plane)
        let near = Self::normalize_plane(rows[2]);
        // Far: row3 - row2
        let far = Self::normalize_plane(rows[3] - rows[2]);
        // Left: row3 + row0
        let left = Self::normalize_plane(rows[3] + rows[0]);
        // Right: row3 - row0
        let right = Self::normalize_plane(rows[3] - rows[0]);
        // Top: row3 - row1
        let top = Self::normalize_plane(rows[3] - rows[1]);
        // Bottom: row3 + row1
        let bottom = Self::normalize_plane(rows[3] + rows[1]);

        Self {
            planes: [near, far, left, right, top, bottom],
        }
    }

    fn normalize_plane(plane: DVec4) -> Plane {
        let normal = plane.truncate();
        let len = normal.length();
        if len > 0.0 {
            Plane {
                normal: normal / len,
                distance: plane.w / len,
            }
        } else {
            // Zero normal: classification reduces to the sign of w
            Plane { normal, distance: plane.w }
        }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: DVec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if a convex point set intersects the frustum (conservative test)
    ///
    /// Returns false only when every point lies behind one single plane.
    /// Sets straddling a frustum edge outside the volume may still report true.
    pub fn intersects_points(&self, points: &[DVec3]) -> bool {
        for plane in &self.planes {
            if points.iter().all(|&p| plane.distance_to_point(p) < 0.0) {
                return false;
            }
        }
        true
    }

    /// Check if a sphere intersects the frustum (conservative test)
    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(center) <= -radius {
                return false;
            }
        }
        true
    }
}
