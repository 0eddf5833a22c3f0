//! Seam between the tiles renderer and the engine's content decoders

use std::future::Future;

use crate::core::types::{DMat4, Result};

use super::container::{ContentContainer, ResourceLedger};
use super::format::ContentFormat;

/// Everything a loader needs to turn one tile payload into engine resources
#[derive(Clone, Debug)]
pub struct ContentRequest {
    pub bytes: Vec<u8>,
    pub format: ContentFormat,
    /// Directory relative resources resolve against
    pub working_path: String,
    /// Up-axis correction applied to glTF content before placement
    pub adjustment: DMat4,
    /// Ledger new containers register with
    pub ledger: ResourceLedger,
}

/// Async decoder for b3dm and glTF payloads.
///
/// Implementations create a [`ContentContainer`] through
/// [`ContentContainer::new`] with the request's ledger and set its root
/// transform to the content's own placement (including `adjustment`). The
/// renderer composes the tile's world transform on top.
pub trait ContentLoader: Send + Sync {
    fn parse(&self, request: ContentRequest) -> impl Future<Output = Result<ContentContainer>> + Send;
}
