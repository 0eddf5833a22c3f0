//! Tile content: format detection, engine resources and byte accounting

pub mod accounting;
pub mod container;
pub mod format;
pub mod loader;

pub use accounting::calculate_bytes_used;
pub use container::{
    ContentContainer, ContentRoot, Geometry, GroupId, IndexData, Material, Mesh, ResourceLedger,
    Texture, VertexBuffer,
};
pub use format::{ContentFormat, working_path};
pub use loader::{ContentLoader, ContentRequest};
