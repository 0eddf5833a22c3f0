//! Camera for tile view evaluation

use crate::core::types::{DVec3, DMat4, DQuat};

/// Projection parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection with vertical field of view in radians
    Perspective {
        fov_y: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    /// Orthographic projection covering `width` x `height` world units
    Orthographic {
        width: f64,
        height: f64,
        near: f64,
        far: f64,
    },
}

impl Projection {
    /// Build the projection matrix (camera to clip space)
    pub fn matrix(&self) -> DMat4 {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                DMat4::perspective_rh(fov_y, aspect, near, far)
            }
            Projection::Orthographic { width, height, near, far } => {
                let hw = width * 0.5;
                let hh = height * 0.5;
                DMat4::orthographic_rh(-hw, hw, -hh, hh, near, far)
            }
        }
    }
}

/// Camera with world position, rotation, and projection parameters
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World position
    pub position: DVec3,
    /// Rotation as quaternion
    pub rotation: DQuat,
    /// Projection parameters
    pub projection: Projection,
}

impl Camera {
    /// Create a perspective camera
    pub fn new(position: DVec3, fov_y_degrees: f64, aspect: f64) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
            projection: Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
                aspect,
                near: 0.1,
                far: 1.0e7,
            },
        }
    }

    /// Create an orthographic camera covering `width` x `height` world units
    pub fn orthographic(position: DVec3, width: f64, height: f64) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
            projection: Projection::Orthographic {
                width,
                height,
                near: 0.1,
                far: 1.0e7,
            },
        }
    }

    /// Point the camera at a target, keeping its projection
    pub fn look_at(mut self, target: DVec3, up: DVec3) -> Self {
        let forward = (target - self.position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        self.rotation = DQuat::from_mat3(&glam::DMat3::from_cols(right, up, -forward));
        self
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> DMat4 {
        let rotation_matrix = DMat4::from_quat(self.rotation.conjugate());
        let translation_matrix = DMat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> DMat4 {
        self.projection.matrix()
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> DVec3 {
        self.rotation * -DVec3::Z
    }

    /// Get right direction (positive X in camera space)
    pub fn right(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    /// Get up direction (positive Y in camera space)
    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Update aspect ratio (call on window resize). No effect on orthographic cameras.
    pub fn set_aspect(&mut self, width: f64, height: f64) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DVec3::new(0.0, 0.0, 5.0), 60.0, 16.0 / 9.0)
    }
}
