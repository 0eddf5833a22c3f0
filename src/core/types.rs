//! Core type aliases and re-exports
//!
//! Tile math runs in double precision: tileset coordinates are commonly
//! earth-centered and reach millions of meters, well past f32 precision.

pub use glam::{
    DVec3, DVec4,
    DMat3, DMat4,
    DQuat,
};

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
