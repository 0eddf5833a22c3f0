//! Oriented bounding box
//!
//! An axis-aligned box in its own local frame placed into world space by a
//! transform. The eight world-space corners are cached for frustum tests and
//! must be refreshed with [`Obb::update`] whenever `min`, `max` or
//! `transform` change.

use crate::core::types::{DVec3, DMat4};
use super::frustum::Frustum;

/// Oriented bounding box: local min/max plus a local-to-world transform
#[derive(Clone, Debug)]
pub struct Obb {
    /// Minimum corner in local space
    pub min: DVec3,
    /// Maximum corner in local space
    pub max: DVec3,
    /// Local-to-world transform
    pub transform: DMat4,
    inverse_transform: DMat4,
    points: [DVec3; 8],
}

impl Obb {
    /// Create a box and compute its corner cache
    pub fn new(min: DVec3, max: DVec3, transform: DMat4) -> Self {
        let mut obb = Self {
            min,
            max,
            transform,
            inverse_transform: DMat4::IDENTITY,
            points: [DVec3::ZERO; 8],
        };
        obb.update();
        obb
    }

    /// Recompute the inverse transform and the world-space corner cache.
    pub fn update(&mut self) {
        self.inverse_transform = self.transform.inverse();
        self.update_points();
    }

    fn update_points(&mut self) {
        let (min, max) = (self.min, self.max);

        let mut index = 0;
        for x in [min.x, max.x] {
            for y in [min.y, max.y] {
                for z in [min.z, max.z] {
                    self.points[index] = self.transform.transform_point3(DVec3::new(x, y, z));
                    index += 1;
                }
            }
        }
    }

    /// Replace the local extents and refresh the cache
    pub fn set_bounds(&mut self, min: DVec3, max: DVec3) {
        self.min = min;
        self.max = max;
        self.update();
    }

    /// Replace the transform and refresh the cache
    pub fn set_transform(&mut self, transform: DMat4) {
        self.transform = transform;
        self.update();
    }

    pub fn inverse_transform(&self) -> &DMat4 {
        &self.inverse_transform
    }

    /// Cached world-space corners
    pub fn points(&self) -> &[DVec3; 8] {
        &self.points
    }

    /// Closest point on or in the box to `point`, in world space
    pub fn clamp_point(&self, point: DVec3) -> DVec3 {
        let local = self.inverse_transform.transform_point3(point);
        let clamped = local.max(self.min).min(self.max);
        self.transform.transform_point3(clamped)
    }

    /// Distance to the box, 0 when the point is inside or on it
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.clamp_point(point).distance(point)
    }

    /// Inclusive containment test in local space
    pub fn contains_point(&self, point: DVec3) -> bool {
        let local = self.inverse_transform.transform_point3(point);
        local.cmpge(self.min).all() && local.cmple(self.max).all()
    }

    /// Corner-based frustum test. Never reports a box that is fully outside
    /// one plane as visible; may report boxes near frustum edges as visible.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_points(&self.points)
    }
}

impl Default for Obb {
    /// Unit cube from (-1, -1, -1) to (1, 1, 1) with identity transform
    fn default() -> Self {
        Self::new(DVec3::NEG_ONE, DVec3::ONE, DMat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_box_queries() {
        let obb = Obb::default();
        assert!(obb.contains_point(DVec3::ZERO));
        assert!(!obb.contains_point(DVec3::new(2.0, 0.0, 0.0)));
        assert!((obb.distance_to_point(DVec3::new(2.0, 0.0, 0.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let obb = Obb::default();
        assert!(obb.contains_point(DVec3::new(1.0, -1.0, 1.0)));
        assert_eq!(obb.distance_to_point(DVec3::new(1.0, 0.5, 0.0)), 0.0);
    }

    #[test]
    fn test_distance_to_corner() {
        let obb = Obb::default();
        let d = obb.distance_to_point(DVec3::new(2.0, 2.0, 2.0));
        assert!((d - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_point_rotated_box() {
        // Box stretched along local X, rotated 90 degrees about Z so it lies along world Y
        let transform = DMat4::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let obb = Obb::new(DVec3::new(-4.0, -1.0, -1.0), DVec3::new(4.0, 1.0, 1.0), transform);

        assert!(obb.contains_point(DVec3::new(0.0, 3.5, 0.0)));
        assert!(!obb.contains_point(DVec3::new(3.5, 0.0, 0.0)));

        let clamped = obb.clamp_point(DVec3::new(0.0, 10.0, 0.0));
        assert!((clamped - DVec3::new(0.0, 4.0, 0.0)).length() < 1e-9);
        assert!((obb.distance_to_point(DVec3::new(3.0, 0.0, 0.0)) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_cache_follows_transform() {
        let mut obb = Obb::default();
        assert_eq!(obb.points()[0], DVec3::NEG_ONE);
        assert_eq!(obb.points()[7], DVec3::ONE);

        obb.set_transform(DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0)));
        assert_eq!(obb.points()[0], DVec3::new(9.0, -1.0, -1.0));
        assert_eq!(obb.points()[7], DVec3::new(11.0, 1.0, 1.0));
        assert!(obb.contains_point(DVec3::new(10.5, 0.0, 0.0)));

        obb.set_bounds(DVec3::ZERO, DVec3::splat(2.0));
        assert_eq!(obb.points()[0], DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(obb.points()[7], DVec3::new(12.0, 2.0, 2.0));
    }

    #[test]
    fn test_manual_mutation_requires_update() {
        let mut obb = Obb::default();
        obb.max = DVec3::splat(3.0);
        // Corner cache is stale until update()
        assert_eq!(obb.points()[7], DVec3::ONE);
        obb.update();
        assert_eq!(obb.points()[7], DVec3::splat(3.0));
    }

    #[test]
    fn test_frustum_intersection() {
        let proj = DMat4::perspective_rh(std::f64::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = DMat4::look_at_rh(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO, DVec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));

        assert!(Obb::default().intersects_frustum(&frustum));

        let far_right = Obb::new(
            DVec3::NEG_ONE,
            DVec3::ONE,
            DMat4::from_translation(DVec3::new(200.0, 0.0, 0.0)),
        );
        assert!(!far_right.intersects_frustum(&frustum));

        let behind = Obb::new(
            DVec3::NEG_ONE,
            DVec3::ONE,
            DMat4::from_translation(DVec3::new(0.0, 0.0, 20.0)),
        );
        assert!(!behind.intersects_frustum(&frustum));
    }
}
