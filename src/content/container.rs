//! Engine-side resources created for one tile's content
//!
//! A [`ContentContainer`] owns every mesh, material and texture a loader
//! produced for a tile together with the root node they hang under. Dropping
//! the container disposes it, so an abandoned load releases its resources
//! without any explicit cleanup path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::types::{DMat4, DQuat, DVec3};
use crate::tiles::transform::Decomposed;

/// Handle to a scene group content roots attach under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub u64);

/// Raw vertex attribute data, shareable between geometries
#[derive(Debug, Default)]
pub struct VertexBuffer {
    pub data: Vec<u8>,
}

impl VertexBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Index data of a geometry
#[derive(Clone, Debug)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn byte_len(&self) -> usize {
        match self {
            IndexData::U16(indices) => indices.len() * std::mem::size_of::<u16>(),
            IndexData::U32(indices) => indices.len() * std::mem::size_of::<u32>(),
        }
    }
}

/// Vertex buffers keyed by attribute name plus optional indices
#[derive(Debug, Default)]
pub struct Geometry {
    pub vertex_buffers: Vec<(String, Arc<VertexBuffer>)>,
    pub indices: Option<IndexData>,
}

#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub geometry: Option<Arc<Geometry>>,
}

/// GPU texture description; pixel data is owned by the engine
#[derive(Debug, Default)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub generate_mipmaps: bool,
}

#[derive(Debug, Default)]
pub struct Material {
    pub name: String,
    pub textures: Vec<Arc<Texture>>,
}

/// Root node of loaded content
#[derive(Clone, Debug, PartialEq)]
pub struct ContentRoot {
    pub scale: DVec3,
    pub rotation: DQuat,
    pub position: DVec3,
    /// Group the root is attached under; `None` while detached
    pub parent: Option<GroupId>,
    pub enabled: bool,
}

impl Default for ContentRoot {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE,
            rotation: DQuat::IDENTITY,
            position: DVec3::ZERO,
            parent: None,
            enabled: false,
        }
    }
}

impl ContentRoot {
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn set_transform(&mut self, placed: &Decomposed) {
        self.scale = placed.scale;
        self.rotation = placed.rotation;
        self.position = placed.translation;
    }
}

#[derive(Debug, Default)]
struct LedgerCounts {
    live: AtomicUsize,
    created: AtomicUsize,
    disposed: AtomicUsize,
}

/// Counts content containers created and disposed by the engine
#[derive(Clone, Debug, Default)]
pub struct ResourceLedger {
    counts: Arc<LedgerCounts>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Containers created and not yet disposed
    pub fn live_containers(&self) -> usize {
        self.counts.live.load(Ordering::Acquire)
    }

    pub fn created_containers(&self) -> usize {
        self.counts.created.load(Ordering::Acquire)
    }

    pub fn disposed_containers(&self) -> usize {
        self.counts.disposed.load(Ordering::Acquire)
    }

    fn register(&self) {
        self.counts.created.fetch_add(1, Ordering::AcqRel);
        self.counts.live.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        self.counts.disposed.fetch_add(1, Ordering::AcqRel);
        self.counts.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// All resources created for one tile's content
#[derive(Debug)]
pub struct ContentContainer {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub root: ContentRoot,
    ledger: ResourceLedger,
    disposed: bool,
}

impl ContentContainer {
    /// Create an empty container registered with `ledger`
    pub fn new(ledger: &ResourceLedger) -> Self {
        ledger.register();
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
            root: ContentRoot::default(),
            ledger: ledger.clone(),
            disposed: false,
        }
    }

    pub fn with_meshes(mut self, meshes: Vec<Mesh>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn with_materials(mut self, materials: Vec<Material>) -> Self {
        self.materials = materials;
        self
    }

    /// Attach the root under `group` and enable it
    pub fn attach(&mut self, group: GroupId) {
        self.root.parent = Some(group);
        self.root.enabled = true;
    }

    /// Detach the root from its group and disable it
    pub fn detach(&mut self) {
        self.root.parent = None;
        self.root.enabled = false;
    }

    pub fn is_attached(&self) -> bool {
        self.root.parent.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every resource. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.detach();
        self.meshes.clear();
        self.materials.clear();
        self.disposed = true;
        self.ledger.release();
    }
}

impl Drop for ContentContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_counts_drop() {
        let ledger = ResourceLedger::new();
        {
            let _a = ContentContainer::new(&ledger);
            let _b = ContentContainer::new(&ledger);
            assert_eq!(ledger.live_containers(), 2);
        }
        assert_eq!(ledger.live_containers(), 0);
        assert_eq!(ledger.created_containers(), 2);
        assert_eq!(ledger.disposed_containers(), 2);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let ledger = ResourceLedger::new();
        let mut container = ContentContainer::new(&ledger).with_meshes(vec![Mesh::default()]);

        container.dispose();
        container.dispose();
        assert!(container.is_disposed());
        assert!(container.meshes.is_empty());
        assert_eq!(ledger.live_containers(), 0);

        drop(container);
        assert_eq!(ledger.disposed_containers(), 1);
    }

    #[test]
    fn test_attach_detach() {
        let ledger = ResourceLedger::new();
        let mut container = ContentContainer::new(&ledger);
        assert!(!container.root.enabled);
        assert!(!container.is_attached());

        container.attach(GroupId(7));
        assert_eq!(container.root.parent, Some(GroupId(7)));
        assert!(container.root.enabled);

        container.detach();
        assert!(!container.is_attached());
        assert!(!container.root.enabled);
    }

    #[test]
    fn test_root_transform() {
        let ledger = ResourceLedger::new();
        let mut container = ContentContainer::new(&ledger);
        assert_eq!(container.root.matrix(), DMat4::IDENTITY);

        container.root.set_transform(&Decomposed {
            scale: DVec3::splat(2.0),
            rotation: DQuat::IDENTITY,
            translation: DVec3::new(1.0, 2.0, 3.0),
        });
        assert_eq!(
            container.root.matrix().transform_point3(DVec3::ONE),
            DVec3::new(3.0, 4.0, 5.0)
        );
    }

    #[test]
    fn test_index_byte_len() {
        assert_eq!(IndexData::U16(vec![0, 1, 2]).byte_len(), 6);
        assert_eq!(IndexData::U32(vec![0, 1, 2]).byte_len(), 12);
    }
}
