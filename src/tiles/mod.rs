//! 3D Tiles: transform hierarchy, view error and tile lifecycle

pub mod budget;
pub mod lifecycle;
pub mod renderer;
pub mod tileset;
pub mod transform;
pub mod view_error;

pub use budget::TileBudget;
pub use lifecycle::{CancelToken, ParseOutcome, TileCache, TileState};
pub use renderer::{RenderHost, TileCallbacks, TilesRenderer};
pub use tileset::{Tile, TileId, TileTree, TilesetDescriptor};
pub use transform::{TileTransform, UpAxis, build_tile_transform};
pub use view_error::{ViewError, ViewErrorEvaluator, calculate_view_error};
