//! Bounding volumes and culling primitives

pub mod bounding_volume;
pub mod frustum;
pub mod obb;
pub mod sphere;

pub use bounding_volume::BoundingVolume;
pub use frustum::{Plane, Frustum};
pub use obb::Obb;
pub use sphere::BoundingSphere;
