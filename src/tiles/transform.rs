//! Tile transform hierarchy
//!
//! Each tile's world transform is its parent's world transform times its own
//! local transform. Transforms are computed once, top-down, when a tile is
//! first discovered, before any descendant.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::types::{DMat4, DQuat, DVec3};

/// Accumulated world placement of a tile and its inverse
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileTransform {
    pub world: DMat4,
    pub inverse: DMat4,
}

impl TileTransform {
    pub fn from_world(world: DMat4) -> Self {
        Self {
            world,
            inverse: world.inverse(),
        }
    }
}

impl Default for TileTransform {
    fn default() -> Self {
        Self {
            world: DMat4::IDENTITY,
            inverse: DMat4::IDENTITY,
        }
    }
}

/// Compose a tile's world transform.
///
/// `local` is the tile's 16-number column-major transform (identity when
/// absent); `parent` is the parent's accumulated world transform (None for a
/// root tile).
pub fn build_tile_transform(local: Option<&[f64; 16]>, parent: Option<&DMat4>) -> TileTransform {
    let local = local.map_or(DMat4::IDENTITY, DMat4::from_cols_array);

    let world = match parent {
        Some(parent) => *parent * local,
        None => local,
    };

    TileTransform::from_world(world)
}

/// Up axis declared by glTF tile content
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpAxis {
    X,
    #[default]
    Y,
    Z,
}

impl FromStr for UpAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(UpAxis::X),
            "y" => Ok(UpAxis::Y),
            "z" => Ok(UpAxis::Z),
            other => Err(format!("unknown up axis \"{other}\"")),
        }
    }
}

/// Rotation that brings glTF content with the given up axis into the
/// Z-up tileset frame.
pub fn up_axis_rotation(axis: UpAxis) -> DMat4 {
    match axis {
        // X-up to Z-up: -90 degrees about Y
        UpAxis::X => DMat4::from_rotation_y(-std::f64::consts::FRAC_PI_2),
        // Y-up to Z-up: +90 degrees about X
        UpAxis::Y => DMat4::from_rotation_x(std::f64::consts::FRAC_PI_2),
        UpAxis::Z => DMat4::IDENTITY,
    }
}

/// Scale, rotation and translation of a content root node
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub scale: DVec3,
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Decomposed {
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Place loaded content under its tile: `tile_world * content_root`,
/// decomposed for the engine's scene node.
pub fn compose_content_transform(tile_world: &DMat4, content_root: &DMat4) -> Decomposed {
    let (scale, rotation, translation) = (*tile_world * *content_root).to_scale_rotation_translation();
    Decomposed { scale, rotation, translation }
}
