//! Tileset metadata and the tile arena
//!
//! `tileset.json` is parsed into serde descriptors and flattened into a
//! [`TileTree`] whose tiles are stored parents-first, so a single forward pass
//! can compose transforms top-down.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{DMat4, Result};
use crate::math::BoundingVolume;

use super::lifecycle::TileCache;
use super::transform::{UpAxis, build_tile_transform};

/// Root of a `tileset.json` document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDescriptor {
    pub asset: AssetDescriptor,
    pub geometric_error: f64,
    pub root: TileDescriptor,
}

impl TilesetDescriptor {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Declared glTF up axis, `y` when absent
    pub fn up_axis(&self) -> Result<UpAxis> {
        match &self.asset.gltf_up_axis {
            Some(axis) => axis.parse().map_err(Error::Tileset),
            None => Ok(UpAxis::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gltf_up_axis: Option<String>,
}

/// Refinement strategy for a tile's children
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Refine {
    Add,
    #[default]
    Replace,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolumeDescriptor {
    /// Center and radius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<[f64; 4]>,
    /// Center followed by the X, Y and Z half-axis vectors
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub obb: Option<[f64; 12]>,
}

impl BoundingVolumeDescriptor {
    /// World-space volume for a tile placed by `transform`
    pub fn to_volume(&self, transform: &DMat4) -> Result<BoundingVolume> {
        let mut volume = BoundingVolume::new();

        if let Some([x, y, z, radius]) = self.sphere {
            volume.set_sphere_data(x, y, z, radius, transform);
        }
        if let Some(data) = &self.obb {
            volume.set_obb_data(data, transform);
        }

        if volume.is_empty() {
            return Err(Error::Tileset(
                "boundingVolume requires a sphere or a box".to_string(),
            ));
        }
        Ok(volume)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    #[serde(alias = "url")]
    pub uri: String,
}

/// One tile as written in the tileset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDescriptor {
    /// Column-major local transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f64; 16]>,
    pub bounding_volume: BoundingVolumeDescriptor,
    pub geometric_error: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TileDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refine: Option<Refine>,
}

/// Geometric error must be a finite, non-negative number
fn check_geometric_error(value: f64, owner: &str) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::Tileset(format!("{owner} geometricError must be >= 0, got {value}")))
    }
}

/// Index of a tile in its [`TileTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// Tile node in the arena
#[derive(Debug)]
pub struct Tile {
    pub id: TileId,
    pub parent: Option<TileId>,
    pub children: Vec<TileId>,
    pub depth: u32,
    pub geometric_error: f64,
    /// Refinement, inherited from the parent when not declared
    pub refine: Refine,
    pub content_uri: Option<String>,
    pub transform: Option<[f64; 16]>,
    pub bounding_volume: BoundingVolumeDescriptor,
    pub cache: TileCache,
}

impl Tile {
    pub fn has_content(&self) -> bool {
        self.content_uri.is_some()
    }

    /// Lowercase file extension of the content URI, without query or fragment
    pub fn content_extension(&self) -> Option<String> {
        let uri = self.content_uri.as_deref()?;
        let path = &uri[..uri.find(['?', '#']).unwrap_or(uri.len())];
        let file = path.rsplit(['/', '\\']).next()?;
        let (_, extension) = file.rsplit_once('.')?;
        Some(extension.to_ascii_lowercase())
    }
}

/// Build the transform and bounding volume of `tile` from its parent's world
/// transform. The tile returns to `Unloaded` with no content.
pub fn preprocess_tile(tile: &mut Tile, parent_transform: Option<&DMat4>) -> Result<()> {
    let transform = build_tile_transform(tile.transform.as_ref(), parent_transform);
    let volume = tile.bounding_volume.to_volume(&transform.world)?;
    tile.cache = TileCache::new(transform, volume);
    Ok(())
}

/// Flattened tile hierarchy, parents stored before their children
#[derive(Debug)]
pub struct TileTree {
    tiles: Vec<Tile>,
    pub up_axis: UpAxis,
    pub geometric_error: f64,
}

impl TileTree {
    /// Flatten a tileset breadth-first
    pub fn from_descriptor(tileset: TilesetDescriptor) -> Result<Self> {
        let up_axis = tileset.up_axis()?;
        let tileset_error = check_geometric_error(tileset.geometric_error, "tileset")?;
        let mut tiles: Vec<Tile> = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back((tileset.root, None, 0));

        while let Some((descriptor, parent, depth)) = queue.pop_front() {
            let id = TileId(tiles.len());
            let inherited = parent.map_or(Refine::default(), |p: TileId| tiles[p.0].refine);

            if let Some(parent) = parent {
                tiles[parent.0].children.push(id);
            }

            let TileDescriptor {
                transform,
                bounding_volume,
                geometric_error,
                content,
                children,
                refine,
            } = descriptor;
            let geometric_error = check_geometric_error(geometric_error, &format!("tile {}", id.0))?;

            tiles.push(Tile {
                id,
                parent,
                children: Vec::new(),
                depth,
                geometric_error,
                refine: refine.unwrap_or(inherited),
                content_uri: content.map(|c| c.uri),
                transform,
                bounding_volume,
                cache: TileCache::default(),
            });

            for child in children {
                queue.push_back((child, Some(id), depth + 1));
            }
        }

        Ok(Self {
            tiles,
            up_axis,
            geometric_error: tileset_error,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_descriptor(TilesetDescriptor::from_json_str(json)?)
    }

    /// Run `preprocess` on every tile, parents before children, handing each
    /// tile its parent's world transform.
    pub fn preprocess_all<F>(&mut self, mut preprocess: F) -> Result<()>
    where
        F: FnMut(&mut Tile, Option<&DMat4>) -> Result<()>,
    {
        for index in 0..self.tiles.len() {
            let parent_world = self.tiles[index]
                .parent
                .map(|parent| self.tiles[parent.0].cache.transform.world);
            preprocess(&mut self.tiles[index], parent_world.as_ref())?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Tile {
        &self.tiles[0]
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in storage order (parents before children)
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DVec3;
    use crate::tiles::lifecycle::TileState;

    const TILESET: &str = r#"{
        "asset": { "version": "1.0", "gltfUpAxis": "Z" },
        "geometricError": 500,
        "root": {
            "transform": [2,0,0,0, 0,2,0,0, 0,0,2,0, 100,0,0,1],
            "boundingVolume": { "box": [0,0,0, 10,0,0, 0,10,0, 0,0,10] },
            "geometricError": 100,
            "refine": "ADD",
            "content": { "uri": "root.b3dm" },
            "children": [
                {
                    "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,5,0,1],
                    "boundingVolume": { "sphere": [0,0,0,5] },
                    "geometricError": 10,
                    "content": { "url": "tiles/a.GLB?v=2" },
                    "children": [
                        {
                            "boundingVolume": { "sphere": [1,0,0,1] },
                            "geometricError": 0
                        }
                    ]
                },
                {
                    "boundingVolume": { "sphere": [0,0,0,1], "box": [0,0,0, 1,0,0, 0,1,0, 0,0,1] },
                    "geometricError": 10,
                    "refine": "REPLACE"
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_and_flatten() {
        let tree = TileTree::from_json_str(TILESET).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.up_axis, UpAxis::Z);
        assert_eq!(tree.geometric_error, 500.0);

        let root = tree.root();
        assert_eq!(root.id, TileId(0));
        assert_eq!(root.children, vec![TileId(1), TileId(2)]);
        assert_eq!(root.refine, Refine::Add);
        assert_eq!(root.content_extension().as_deref(), Some("b3dm"));

        let a = tree.get(TileId(1)).unwrap();
        assert_eq!(a.parent, Some(TileId(0)));
        assert_eq!(a.refine, Refine::Add);
        assert_eq!(a.content_uri.as_deref(), Some("tiles/a.GLB?v=2"));
        assert_eq!(a.content_extension().as_deref(), Some("glb"));

        assert_eq!(tree.get(TileId(2)).unwrap().refine, Refine::Replace);

        let leaf = tree.get(TileId(3)).unwrap();
        assert_eq!(leaf.parent, Some(TileId(1)));
        assert_eq!(leaf.depth, 2);
        assert!(!leaf.has_content());
        assert!(tree.get(TileId(4)).is_none());
    }

    #[test]
    fn test_preprocess_composes_top_down() {
        let mut tree = TileTree::from_json_str(TILESET).unwrap();
        tree.preprocess_all(preprocess_tile).unwrap();

        // Root: scale 2, translate (100, 0, 0)
        let root = tree.root();
        assert_eq!(root.cache.state, TileState::Unloaded);
        let obb = root.cache.bounding_volume.obb().unwrap();
        assert!(obb.contains_point(DVec3::new(119.0, 0.0, 0.0)));
        assert!(!obb.contains_point(DVec3::new(121.0, 0.0, 0.0)));

        // Child: parent * translate (0, 5, 0) -> world (100, 10, 0), radius 5 * 2
        let child = tree.get(TileId(1)).unwrap();
        let sphere = child.cache.bounding_volume.sphere().unwrap();
        assert!((sphere.center - DVec3::new(100.0, 10.0, 0.0)).length() < 1e-9);
        assert!((sphere.radius - 10.0).abs() < 1e-9);

        // Leaf without transform inherits the child's world transform
        let leaf = tree.get(TileId(3)).unwrap();
        assert_eq!(leaf.cache.transform.world, child.cache.transform.world);
        let sphere = leaf.cache.bounding_volume.sphere().unwrap();
        assert!((sphere.center - DVec3::new(102.0, 10.0, 0.0)).length() < 1e-9);

        let both = tree.get(TileId(2)).unwrap();
        assert!(both.cache.bounding_volume.sphere().is_some());
        assert!(both.cache.bounding_volume.obb().is_some());
    }

    #[test]
    fn test_missing_volume_shape_is_rejected() {
        let json = r#"{
            "asset": { "version": "1.0" },
            "geometricError": 1,
            "root": { "boundingVolume": { "region": [0,0,1,1,0,10] }, "geometricError": 1 }
        }"#;
        let mut tree = TileTree::from_json_str(json).unwrap();
        assert_eq!(tree.up_axis, UpAxis::Y);

        let err = tree.preprocess_all(preprocess_tile).unwrap_err();
        assert!(matches!(err, Error::Tileset(_)));
    }

    #[test]
    fn test_invalid_geometric_error_is_rejected() {
        let negative_child = r#"{
            "asset": { "version": "1.0" },
            "geometricError": 10,
            "root": {
                "boundingVolume": { "sphere": [0,0,0,1] },
                "geometricError": 5,
                "children": [{ "boundingVolume": { "sphere": [0,0,0,1] }, "geometricError": -1 }]
            }
        }"#;
        assert!(matches!(TileTree::from_json_str(negative_child), Err(Error::Tileset(_))));

        let mut descriptor = TilesetDescriptor::from_json_str(TILESET).unwrap();
        descriptor.root.geometric_error = f64::NAN;
        assert!(matches!(TileTree::from_descriptor(descriptor), Err(Error::Tileset(_))));

        let mut descriptor = TilesetDescriptor::from_json_str(TILESET).unwrap();
        descriptor.geometric_error = -500.0;
        assert!(matches!(TileTree::from_descriptor(descriptor), Err(Error::Tileset(_))));

        // Zero is a valid leaf error
        assert!(TileTree::from_json_str(TILESET).is_ok());
    }

    #[test]
    fn test_bad_up_axis() {
        let json = r#"{
            "asset": { "version": "1.0", "gltfUpAxis": "W" },
            "geometricError": 1,
            "root": { "boundingVolume": { "sphere": [0,0,0,1] }, "geometricError": 1 }
        }"#;
        assert!(matches!(TileTree::from_json_str(json), Err(Error::Tileset(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(TileTree::from_json_str("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_descriptor_serializes_box_key() {
        let descriptor = BoundingVolumeDescriptor {
            sphere: None,
            obb: Some([0.0; 12]),
        };
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.starts_with(r#"{"box":"#));
    }
}
