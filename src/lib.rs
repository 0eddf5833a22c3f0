//! rktiles - 3D Tiles culling, level-of-detail error and tile lifecycle

pub mod core;
pub mod math;
pub mod tiles;
pub mod content;
