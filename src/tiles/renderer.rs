//! Tile lifecycle coordinator
//!
//! [`TilesRenderer`] implements the callbacks a tile traversal engine drives:
//! preprocessing discovered tiles, parsing fetched content, toggling
//! visibility, disposing content, and reporting bytes and view error. It sits
//! between that engine and the host renderer ([`RenderHost`]) and content
//! decoders ([`ContentLoader`]).

use std::future::Future;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;

use crate::content::accounting;
use crate::content::container::{GroupId, ResourceLedger};
use crate::content::format::{ContentFormat, working_path};
use crate::content::loader::{ContentLoader, ContentRequest};
use crate::core::camera::Camera;
use crate::core::config::TilesConfig;
use crate::core::types::{DMat4, Result};

use super::budget::TileBudget;
use super::lifecycle::{CancelToken, LoadGuard, ParseOutcome, TileState};
use super::tileset::{Tile, TileId, TileTree, preprocess_tile};
use super::transform::{compose_content_transform, up_axis_rotation};
use super::view_error::{ViewError, ViewErrorEvaluator, calculate_view_error};

/// What the tiles renderer needs from the host rendering engine
pub trait RenderHost: Send + Sync {
    /// Camera used for view error; `None` when the scene has no active camera
    fn active_camera(&self) -> Option<Camera>;

    /// Render target size in pixels (width, height)
    fn render_size(&self) -> (u32, u32);

    /// Group visible tile content is attached under
    fn root_group(&self) -> GroupId;

    /// Ledger content containers register with
    fn resource_ledger(&self) -> &ResourceLedger;
}

/// Callbacks invoked by the tile traversal engine
pub trait TileCallbacks {
    /// Build a newly discovered tile's transform and bounding volume.
    /// Called parents first.
    fn preprocess_node(&self, tile: &mut Tile, parent_transform: Option<&DMat4>) -> Result<()>;

    /// Parse fetched content for `tile` and place it, hidden, under the tile.
    fn parse_tile(
        &self,
        tile: &mut Tile,
        bytes: Vec<u8>,
        extension: &str,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<ParseOutcome>> + Send;

    /// Release the tile's content
    fn dispose_tile(&self, tile: &mut Tile);

    /// Show or hide resident content
    fn set_tile_visible(&self, tile: &mut Tile, visible: bool);

    /// Approximate bytes held by the tile's content
    fn calculate_bytes_used(&self, tile: &Tile) -> u64;

    /// Screen-space error and visibility for this frame
    fn calculate_tile_view_error(&self, tile: &Tile) -> ViewError;
}

/// Tile lifecycle coordinator over a host renderer and a content loader
pub struct TilesRenderer<H: RenderHost, L: ContentLoader> {
    config: TilesConfig,
    host: H,
    loader: L,
    up_rotation: DMat4,
    budget: Mutex<TileBudget>,
}

impl<H: RenderHost, L: ContentLoader> TilesRenderer<H, L> {
    pub fn new(host: H, loader: L) -> Self {
        Self::with_config(host, loader, TilesConfig::default())
    }

    pub fn with_config(host: H, loader: L, config: TilesConfig) -> Self {
        let up_axis = config.up_axis_override.unwrap_or_default();
        Self {
            budget: Mutex::new(TileBudget::from_config(&config)),
            up_rotation: up_axis_rotation(up_axis),
            config,
            host,
            loader,
        }
    }

    pub fn config(&self) -> &TilesConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Up-axis adjustment handed to loaders
    pub fn up_rotation(&self) -> DMat4 {
        self.up_rotation
    }

    fn lock_budget(&self) -> MutexGuard<'_, TileBudget> {
        self.budget.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the resident content budget
    pub fn budget(&self) -> TileBudget {
        self.lock_budget().clone()
    }

    /// True when resident content exceeds the configured budget
    pub fn should_evict(&self) -> bool {
        self.lock_budget().should_evict()
    }

    /// Frame snapshot for evaluating many tiles against the same camera
    pub fn frame_evaluator(&self) -> Option<ViewErrorEvaluator> {
        let camera = self.host.active_camera();
        let (width, height) = self.host.render_size();
        ViewErrorEvaluator::new(camera.as_ref(), width, height)
    }

    /// Evaluate every tile of `tree` against one camera snapshot, in parallel.
    /// Without a camera every tile gets [`ViewError::NO_CAMERA`].
    pub fn evaluate_tree(&self, tree: &TileTree) -> Vec<(TileId, ViewError)> {
        let evaluator = self.frame_evaluator();

        tree.tiles()
            .par_iter()
            .map(|tile| {
                let result = evaluator.as_ref().map_or(ViewError::NO_CAMERA, |evaluator| {
                    evaluator.evaluate(&tile.cache.bounding_volume, tile.geometric_error)
                });
                (tile.id, result)
            })
            .collect()
    }

    /// Parse tileset JSON, adopt its glTF up axis and preprocess every tile
    pub fn load_root_tileset(&mut self, json: &str) -> Result<TileTree> {
        let mut tree = TileTree::from_json_str(json)?;

        let up_axis = self.config.up_axis_override.unwrap_or(tree.up_axis);
        self.up_rotation = up_axis_rotation(up_axis);

        tree.preprocess_all(|tile, parent| self.preprocess_node(tile, parent))?;

        log::info!(
            "Loaded tileset: {} tiles, geometric error {}, up axis {:?}",
            tree.len(),
            tree.geometric_error,
            up_axis
        );
        Ok(tree)
    }

    /// Read a tileset file and load it (async)
    pub async fn load_root_tileset_from_path(&mut self, path: impl AsRef<Path>) -> Result<TileTree> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        log::debug!("Read tileset {}", path.display());
        self.load_root_tileset(&json)
    }

    /// Dispose every resident tile of `tree`
    pub fn dispose(&self, tree: &mut TileTree) {
        for tile in tree.iter_mut() {
            self.dispose_tile(tile);
        }
    }
}

impl<H: RenderHost, L: ContentLoader> TileCallbacks for TilesRenderer<H, L> {
    fn preprocess_node(&self, tile: &mut Tile, parent_transform: Option<&DMat4>) -> Result<()> {
        preprocess_tile(tile, parent_transform)
    }

    async fn parse_tile(
        &self,
        tile: &mut Tile,
        bytes: Vec<u8>,
        extension: &str,
        cancel: &CancelToken,
    ) -> Result<ParseOutcome> {
        if tile.cache.content.is_some() {
            self.dispose_tile(tile);
        }

        let id = tile.id;
        let uri = tile.content_uri.as_deref().unwrap_or_default();
        let load = LoadGuard::begin(&mut tile.cache);

        if cancel.is_cancelled() {
            return Ok(ParseOutcome::Cancelled);
        }

        let format = ContentFormat::detect(&bytes, extension)
            .inspect_err(|err| log::warn!("Tile {:?}: {}", id, err))?;

        let request = ContentRequest {
            bytes,
            format,
            working_path: working_path(uri).to_string(),
            adjustment: self.up_rotation,
            ledger: self.host.resource_ledger().clone(),
        };

        let mut container = self
            .loader
            .parse(request)
            .await
            .inspect_err(|err| log::warn!("Tile {:?}: failed to parse {} content: {}", id, format, err))?;

        if cancel.is_cancelled() {
            // Dropping the container releases everything the loader created
            drop(container);
            log::debug!("Tile {:?}: load cancelled", id);
            return Ok(ParseOutcome::Cancelled);
        }

        let placed = compose_content_transform(&load.world(), &container.root.matrix());
        container.root.set_transform(&placed);
        container.detach();

        let bytes_used = accounting::calculate_bytes_used(&container, self.config.count_mipmaps);
        load.commit(container, bytes_used);

        let mut budget = self.lock_budget();
        budget.add_tile(bytes_used);
        log::debug!("Tile {:?}: resident ({} bytes, {})", id, bytes_used, format);
        if budget.should_evict() {
            log::debug!(
                "Tile budget pressure {:.2} with {} resident tiles",
                budget.pressure(),
                budget.resident_tiles()
            );
        }

        Ok(ParseOutcome::Resident)
    }

    fn dispose_tile(&self, tile: &mut Tile) {
        let Some(mut container) = tile.cache.content.take() else {
            return;
        };

        container.dispose();
        self.lock_budget().remove_tile(tile.cache.bytes_used);

        tile.cache.bytes_used = 0;
        tile.cache.visible = false;
        tile.cache.state = TileState::Disposed;
        log::trace!("Tile {:?}: disposed", tile.id);
    }

    fn set_tile_visible(&self, tile: &mut Tile, visible: bool) {
        if !tile.cache.state.is_resident() || tile.cache.visible == visible {
            return;
        }
        let Some(container) = tile.cache.content.as_mut() else {
            return;
        };

        if visible {
            container.attach(self.host.root_group());
        } else {
            container.detach();
        }
        tile.cache.visible = visible;
    }

    fn calculate_bytes_used(&self, tile: &Tile) -> u64 {
        tile.cache
            .content
            .as_ref()
            .map_or(0, |content| accounting::calculate_bytes_used(content, self.config.count_mipmaps))
    }

    fn calculate_tile_view_error(&self, tile: &Tile) -> ViewError {
        let camera = self.host.active_camera();
        let (width, height) = self.host.render_size();
        calculate_view_error(
            camera.as_ref(),
            width,
            height,
            &tile.cache.bounding_volume,
            tile.geometric_error,
        )
    }
}
