//! Screen-space error and visibility of a tile
//!
//! Given the active camera, the render resolution, a tile's bounding volume and
//! its geometric error, computes the projected error in pixels, whether the
//! volume is inside the view frustum, and its distance to the camera. The
//! traversal engine compares the error against its target to decide between
//! refining into children or rendering the tile itself.

use crate::core::camera::Camera;
use crate::core::types::{DMat4, DVec3};
use crate::math::{BoundingVolume, Frustum};

/// Per-frame, per-tile evaluation result
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewError {
    pub in_view: bool,
    /// Screen-space error in pixels (>= 0, or +inf)
    pub error: f64,
    /// Distance from the camera to the bounding volume (>= 0, or +inf)
    pub distance_from_camera: f64,
}

impl ViewError {
    /// Result used when there is no camera: not visible, infinitely far,
    /// so the tile is neither refined nor rendered.
    pub const NO_CAMERA: ViewError = ViewError {
        in_view: false,
        error: f64::INFINITY,
        distance_from_camera: f64::INFINITY,
    };
}

/// How geometric error maps to pixels for the current projection
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorScale {
    /// World size of one pixel (orthographic)
    PixelSize(f64),
    /// World-per-pixel factor at unit distance (perspective)
    SseDenominator(f64),
}

impl ErrorScale {
    /// Derive the error scale from a projection matrix and render size.
    ///
    /// Orthographic projections are recognized by element [15] being 1.
    pub fn from_projection(projection: &DMat4, width: f64, height: f64) -> Self {
        let is_orthographic = projection.w_axis.w == 1.0;

        if is_orthographic {
            let w = 2.0 / projection.x_axis.x;
            let h = 2.0 / projection.y_axis.y;
            ErrorScale::PixelSize((h / height).max(w / width))
        } else {
            ErrorScale::SseDenominator((2.0 / projection.y_axis.y) / height)
        }
    }

    /// Screen-space error for a tile at `distance`
    pub fn error(&self, geometric_error: f64, distance: f64) -> f64 {
        match *self {
            ErrorScale::PixelSize(pixel_size) => geometric_error / pixel_size,
            // Inside the volume: always refine
            ErrorScale::SseDenominator(_) if distance == 0.0 => f64::INFINITY,
            ErrorScale::SseDenominator(denominator) => geometric_error / (distance * denominator),
        }
    }
}

/// Per-frame view snapshot for evaluating many tiles.
///
/// Builds the frustum and the error scale once; [`evaluate`](Self::evaluate)
/// is then a pure read of the tile's bounding volume.
#[derive(Clone, Copy, Debug)]
pub struct ViewErrorEvaluator {
    camera_position: DVec3,
    frustum: Frustum,
    scale: ErrorScale,
}

impl ViewErrorEvaluator {
    /// Snapshot the camera for this frame. `None` when there is no camera.
    pub fn new(camera: Option<&Camera>, width: u32, height: u32) -> Option<Self> {
        let camera = camera?;
        let projection = camera.projection_matrix();

        Some(Self {
            camera_position: camera.position,
            frustum: Frustum::from_view_projection(&(projection * camera.view_matrix())),
            scale: ErrorScale::from_projection(&projection, width as f64, height as f64),
        })
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn error_scale(&self) -> ErrorScale {
        self.scale
    }

    /// Evaluate one tile. A volume with no shape is treated like a missing
    /// camera: not visible, infinitely far.
    pub fn evaluate(&self, volume: &BoundingVolume, geometric_error: f64) -> ViewError {
        if volume.is_empty() {
            return ViewError::NO_CAMERA;
        }

        let distance = volume.distance_to_point(self.camera_position);
        let error = self.scale.error(geometric_error, distance);
        let in_view = volume.intersects_frustum(&self.frustum);

        ViewError {
            in_view,
            error,
            distance_from_camera: distance,
        }
    }
}

/// One-shot evaluation of a tile against an optional camera
pub fn calculate_view_error(
    camera: Option<&Camera>,
    width: u32,
    height: u32,
    volume: &BoundingVolume,
    geometric_error: f64,
) -> ViewError {
    match ViewErrorEvaluator::new(camera, width, height) {
        Some(evaluator) => evaluator.evaluate(volume, geometric_error),
        None => ViewError::NO_CAMERA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_volume(center: DVec3, radius: f64) -> BoundingVolume {
        let mut volume = BoundingVolume::new();
        volume.set_sphere_data(center.x, center.y, center.z, radius, &DMat4::IDENTITY);
        volume
    }

    fn box_volume(center: DVec3, half: f64) -> BoundingVolume {
        let mut volume = BoundingVolume::new();
        volume.set_obb_data(
            &[center.x, center.y, center.z, half, 0.0, 0.0, 0.0, half, 0.0, 0.0, 0.0, half],
            &DMat4::IDENTITY,
        );
        volume
    }

    #[test]
    fn test_no_camera() {
        let result = calculate_view_error(None, 1920, 1080, &sphere_volume(DVec3::ZERO, 1.0), 10.0);
        assert_eq!(result, ViewError::NO_CAMERA);
        assert!(!result.in_view);
        assert!(result.error.is_infinite());
        assert!(result.distance_from_camera.is_infinite());
    }

    #[test]
    fn test_perspective_inside_volume_is_infinite() {
        let camera = Camera::new(DVec3::ZERO, 60.0, 1.0);
        let result = calculate_view_error(Some(&camera), 800, 800, &box_volume(DVec3::ZERO, 5.0), 10.0);
        assert_eq!(result.distance_from_camera, 0.0);
        assert_eq!(result.error, f64::INFINITY);
        assert!(result.in_view);
    }

    #[test]
    fn test_perspective_error_formula() {
        let camera = Camera::new(DVec3::new(0.0, 0.0, 110.0), 90.0, 1.0);
        let volume = sphere_volume(DVec3::ZERO, 10.0);
        let result = calculate_view_error(Some(&camera), 1000, 1000, &volume, 4.0);

        // fov 90: projection[5] = 1, denominator = 2 / 1000
        assert!((result.distance_from_camera - 100.0).abs() < 1e-9);
        assert!((result.error - 4.0 / (100.0 * 0.002)).abs() < 1e-9);
        assert!(result.in_view);
    }

    #[test]
    fn test_perspective_error_decreases_with_distance() {
        let volume = box_volume(DVec3::ZERO, 1.0);
        let mut previous = f64::INFINITY;

        for z in [2.0, 5.0, 10.0, 50.0, 200.0, 5000.0] {
            let camera = Camera::new(DVec3::new(0.0, 0.0, z), 60.0, 16.0 / 9.0);
            let result = calculate_view_error(Some(&camera), 1920, 1080, &volume, 16.0);
            assert!(result.distance_from_camera > 0.0);
            assert!(result.error < previous, "error must shrink as distance grows");
            previous = result.error;
        }
    }

    #[test]
    fn test_orthographic_pixel_size() {
        // 200 x 100 world units over 400 x 200 pixels: 0.5 units per pixel
        let camera = Camera::orthographic(DVec3::new(0.0, 0.0, 50.0), 200.0, 100.0);
        let evaluator = ViewErrorEvaluator::new(Some(&camera), 400, 200).unwrap();
        match evaluator.error_scale() {
            ErrorScale::PixelSize(size) => assert!((size - 0.5).abs() < 1e-12),
            other => panic!("expected pixel size, got {other:?}"),
        }

        let result = evaluator.evaluate(&box_volume(DVec3::ZERO, 1.0), 5.0);
        assert!((result.error - 10.0).abs() < 1e-9);
        assert!(result.in_view);
    }

    #[test]
    fn test_orthographic_error_ignores_distance() {
        let scale = ErrorScale::PixelSize(0.5);
        assert_eq!(scale.error(5.0, 0.0), 10.0);
        assert_eq!(scale.error(5.0, 1.0e6), 10.0);
    }

    #[test]
    fn test_orthographic_pixel_size_takes_larger_axis() {
        let projection = DMat4::orthographic_rh(-50.0, 50.0, -50.0, 50.0, 0.1, 100.0);
        // 100 units over 100 px wide, 100 units over 400 px tall
        match ErrorScale::from_projection(&projection, 100.0, 400.0) {
            ErrorScale::PixelSize(size) => assert!((size - 1.0).abs() < 1e-12),
            other => panic!("expected pixel size, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_view() {
        let camera = Camera::default().look_at(DVec3::new(0.0, 0.0, -10.0), DVec3::Y);
        let behind = box_volume(DVec3::new(0.0, 0.0, 100.0), 1.0);
        let result = calculate_view_error(Some(&camera), 1920, 1080, &behind, 1.0);
        assert!(!result.in_view);
        assert!(result.error.is_finite());
    }

    #[test]
    fn test_empty_volume_is_not_visible() {
        let camera = Camera::new(DVec3::new(0.0, 0.0, 20.0), 60.0, 4.0 / 3.0);
        let result = calculate_view_error(Some(&camera), 800, 600, &BoundingVolume::new(), 10.0);

        assert!(!result.in_view);
        assert_eq!(result.error, f64::INFINITY);
        assert_eq!(result.distance_from_camera, f64::INFINITY);

        let ortho = Camera::orthographic(DVec3::new(0.0, 0.0, 20.0), 100.0, 75.0);
        assert_eq!(
            calculate_view_error(Some(&ortho), 800, 600, &BoundingVolume::new(), 10.0),
            ViewError::NO_CAMERA
        );
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let camera = Camera::new(DVec3::new(3.0, 4.0, 30.0), 45.0, 1.5);
        let evaluator = ViewErrorEvaluator::new(Some(&camera), 1280, 720).unwrap();
        let volume = sphere_volume(DVec3::ZERO, 2.0);

        let first = evaluator.evaluate(&volume, 8.0);
        let second = evaluator.evaluate(&volume, 8.0);
        assert_eq!(first, second);
    }
}
