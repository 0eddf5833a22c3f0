//! Per-tile lifecycle state
//!
//! A tile moves `Unloaded -> Loading -> Resident -> Disposed`. A cancelled or
//! failed load falls back to `Unloaded`. Visibility is a separate flag that is
//! only meaningful while the tile is resident.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::content::container::ContentContainer;
use crate::core::types::DMat4;
use crate::math::BoundingVolume;

use super::transform::TileTransform;

/// Lifecycle state of a tile's content
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileState {
    /// No content; the initial state after preprocessing
    #[default]
    Unloaded,
    /// Content is being parsed
    Loading,
    /// Content is loaded and placed; may be shown or hidden
    Resident,
    /// Content was released
    Disposed,
}

impl TileState {
    pub fn is_resident(&self) -> bool {
        matches!(self, TileState::Resident)
    }
}

/// Cancellation flag shared between the traversal engine and a load.
///
/// Clones observe the same flag. Cancelling is permanent.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// How a successful parse ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Content is resident and hidden
    Resident,
    /// The token was cancelled while loading; everything allocated was released
    Cancelled,
}

/// Everything derived for a tile while it is active
#[derive(Debug, Default)]
pub struct TileCache {
    pub transform: TileTransform,
    pub bounding_volume: BoundingVolume,
    pub state: TileState,
    pub visible: bool,
    pub content: Option<ContentContainer>,
    /// Bytes registered with the budget for the current content
    pub bytes_used: u64,
}

impl TileCache {
    /// Cache for a tile placed by `transform` and bounded by `bounding_volume`
    pub fn new(transform: TileTransform, bounding_volume: BoundingVolume) -> Self {
        Self {
            transform,
            bounding_volume,
            ..Default::default()
        }
    }

    pub fn is_resident(&self) -> bool {
        self.state.is_resident() && self.content.is_some()
    }

    /// Drop any content and go back to `Unloaded`
    pub(crate) fn reset(&mut self) {
        self.content = None;
        self.visible = false;
        self.bytes_used = 0;
        self.state = TileState::Unloaded;
    }
}

/// Holds a tile in `Loading` for the span of one load.
///
/// Dropping the guard without [`commit`](Self::commit) resets the cache to
/// `Unloaded`. This covers early returns and a load future dropped mid-await.
pub(crate) struct LoadGuard<'a> {
    cache: &'a mut TileCache,
    committed: bool,
}

impl<'a> LoadGuard<'a> {
    pub(crate) fn begin(cache: &'a mut TileCache) -> Self {
        cache.state = TileState::Loading;
        Self {
            cache,
            committed: false,
        }
    }

    /// World transform of the tile being loaded
    pub(crate) fn world(&self) -> DMat4 {
        self.cache.transform.world
    }

    /// Store the content, hidden, and mark the tile resident
    pub(crate) fn commit(mut self, content: ContentContainer, bytes_used: u64) {
        self.cache.content = Some(content);
        self.cache.state = TileState::Resident;
        self.cache.visible = false;
        self.cache.bytes_used = bytes_used;
        self.committed = true;
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.cache.reset();
        }
    }
}
